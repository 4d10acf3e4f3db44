use zone_mesh::io::{read_snapshot, write_snapshot};
use zone_mesh::prelude::*;

fn split_box() -> Vec<Zone> {
    let block = structured_box([4, 3, 2], [[0.0; 3], [3.0, 2.0, 1.0]]).unwrap();
    let patches = block.side_patches(BcType::Wall).unwrap();
    let global = Zone::build(0, block.geometry(), &patches, &ZoneBuildOptions::default()).unwrap();
    let parts: Vec<ZoneId> = (0..global.cell_count()).map(|c| usize::from(c % 3 == 2)).collect();
    split_zone(&global, &parts).unwrap().0
}

fn assert_same_topology(a: &Zone, b: &Zone) {
    assert_eq!(a.nodes(), b.nodes());
    assert_eq!(a.cell_types(), b.cell_types());
    assert_eq!(a.volume_tag(), b.volume_tag());
    assert_eq!(a.boundary_count(), b.boundary_count());
    assert_eq!(a.faces().len(), b.faces().len());
    for (fa, fb) in a.faces().iter().zip(b.faces()) {
        assert_eq!(fa.nodes, fb.nodes);
        assert_eq!((fa.left, fa.right), (fb.left, fb.right));
        assert_eq!(fa.face_type, fb.face_type);
        assert_eq!(fa.bc, fb.bc);
    }
    assert_eq!(a.topology().bc_name_ids(), b.topology().bc_name_ids());
    assert_eq!(a.topology().patch_names(), b.topology().patch_names());
    assert_eq!(a.interfaces().entries(), b.interfaces().entries());
}

#[test]
fn zones_survive_a_file_roundtrip() {
    let mut zones = split_box();
    zones[1].set_volume_tag(7);
    for zone in &zones {
        let mut file = Vec::new();
        write_snapshot(&mut file, &zone.to_snapshot()).unwrap();
        let snap = read_snapshot(file.as_slice()).unwrap();
        let back = Zone::from_snapshot(zone.id(), &snap, zone.options()).unwrap();
        assert_same_topology(zone, &back);
    }
}

#[test]
fn format_traits_match_free_functions() {
    let zones = split_box();
    let zone = &zones[0];
    let snap = zone.to_snapshot();
    let mut via_trait = Vec::new();
    SnapshotFormat.write(&mut via_trait, &snap).unwrap();
    let mut direct = Vec::new();
    write_snapshot(&mut direct, &snap).unwrap();
    assert_eq!(via_trait, direct);
    assert_eq!(SnapshotFormat.read(via_trait.as_slice()).unwrap(), snap);
}

#[test]
fn face_stored_from_the_wrong_side_is_flipped_back() {
    let zones = split_box();
    let zone = &zones[0];
    let mut snap = zone.to_snapshot();
    // Store the first boundary face from the ghost side.
    let n = snap.face_node_counts[0];
    snap.face_nodes[..n].reverse();
    snap.right_cells[0] = snap.left_cells[0];
    snap.left_cells[0] = -1;

    let back = Zone::from_snapshot(0, &snap, &ZoneBuildOptions::default()).unwrap();
    assert_eq!(back.faces()[0].nodes, zone.faces()[0].nodes);
    assert_eq!(back.faces()[0].left, zone.faces()[0].left);
    assert_eq!(back.faces()[0].right, zone.faces()[0].right);
}

#[test]
fn corrupt_snapshots_are_rejected() {
    let zones = split_box();
    let zone = &zones[1];
    let mut bytes = Vec::new();
    write_snapshot(&mut bytes, &zone.to_snapshot()).unwrap();

    let mut bad_magic = bytes.clone();
    bad_magic[0] ^= 0xff;
    assert!(read_snapshot(bad_magic.as_slice()).is_err());

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        read_snapshot(trailing.as_slice()),
        Err(MeshError::MeshIoParse(_))
    ));

    let mut snap = zone.to_snapshot();
    snap.cell_types[0] = 99;
    assert!(Zone::from_snapshot(1, &snap, &ZoneBuildOptions::default()).is_err());
}
