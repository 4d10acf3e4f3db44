use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use zone_mesh::prelude::*;
use zone_mesh::topology::builder::build_face_topology;

fn hex_box(n: usize) -> StructuredBox {
    structured_box([n + 1; 3], [[0.0; 3], [1.0; 3]]).unwrap()
}

#[test]
fn hex_box_face_counts() {
    for n in 1..=4 {
        let block = hex_box(n);
        let topo = build_face_topology(block.geometry()).unwrap();
        assert_eq!(topo.cell_count(), n * n * n);
        assert_eq!(topo.boundary_count(), 6 * n * n, "n = {n}");
        assert_eq!(topo.face_count() - topo.boundary_count(), 3 * n * n * (n - 1));
        assert_eq!(topo.total_face_nodes(), 4 * topo.face_count());
    }
}

#[test]
fn boundary_prefix_and_dense_ghosts() {
    let block = hex_box(3);
    let patches = block.side_patches(BcType::Wall).unwrap();
    let zone = Zone::build(0, block.geometry(), &patches, &ZoneBuildOptions::default()).unwrap();
    let nc = zone.cell_count();
    let nb = zone.boundary_count();
    for (i, f) in zone.faces().iter().enumerate() {
        assert!(f.left < nc);
        if i < nb {
            assert_eq!(f.right, Some(nc + i));
            assert_eq!(f.bc, BcType::Wall);
        } else {
            assert!(f.right.is_some_and(|r| r < nc));
            assert_eq!(f.bc, BcType::Interior);
        }
    }
    assert_eq!(zone.ghost_range(), nc..nc + nb);
    zone.topology().validate_invariants().unwrap();
}

#[test]
fn element_order_does_not_change_counts() {
    let block = hex_box(3);
    let reference = build_face_topology(block.geometry()).unwrap();

    let mut rng = SmallRng::seed_from_u64(7);
    let mut elements = block.geometry().elements().to_vec();
    elements.shuffle(&mut rng);
    let mut shuffled = GeometryStore::new();
    for &xyz in block.geometry().nodes() {
        shuffled.push_node(xyz);
    }
    for e in elements {
        shuffled.push_element(e.cell_type, e.nodes).unwrap();
    }
    let topo = build_face_topology(&shuffled).unwrap();
    assert_eq!(topo.face_count(), reference.face_count());
    assert_eq!(topo.boundary_count(), reference.boundary_count());

    // Every cell of a hexahedral mesh has six faces.
    let mut per_cell = vec![0usize; topo.cell_count()];
    for f in topo.faces() {
        per_cell[f.left] += 1;
        if let Some(r) = f.right {
            per_cell[r] += 1;
        }
    }
    assert!(per_cell.iter().all(|&c| c == 6));
}

#[test]
fn building_twice_is_identical() {
    let block = hex_box(2);
    let a = build_face_topology(block.geometry()).unwrap();
    let b = build_face_topology(block.geometry()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn mixed_tet_and_pyramid_share_a_triangle() {
    let mut geo = GeometryStore::new();
    for xyz in [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.5, 0.5, 1.0],
        [1.5, 0.5, 1.0],
    ] {
        geo.push_node(xyz);
    }
    geo.push_element(CellType::Pyramid, vec![0, 1, 2, 3, 4]).unwrap();
    geo.push_element(CellType::Tetrahedron, vec![1, 2, 4, 5]).unwrap();
    let topo = build_face_topology(&geo).unwrap();
    // 5 pyramid faces + 4 tet faces - 1 shared.
    assert_eq!(topo.face_count(), 8);
    assert_eq!(topo.boundary_count(), 7);
    let shared = &topo.interior_faces()[0];
    assert_eq!(shared.face_type, CellType::Triangle);
    assert_eq!((shared.left, shared.right), (0, Some(1)));
}

#[test]
fn adjacency_lists_interface_ghosts_only() {
    let block = structured_box([5, 1, 1], [[0.0; 3], [4.0, 1.0, 1.0]]).unwrap();
    let patches = block.side_patches(BcType::Wall).unwrap();
    let global = Zone::build(0, block.geometry(), &patches, &ZoneBuildOptions::default()).unwrap();
    let (zones, _) = split_zone(&global, &[0, 0, 1, 1]).unwrap();
    let adj = zones[0].cell_to_cell();
    assert_eq!(adj.len(), 2);
    assert_eq!(adj[0], vec![1]);
    // Cell 1 touches cell 0 and the interface ghost (2 cells + boundary face 1).
    let mut cell1 = adj[1].clone();
    cell1.sort_unstable();
    assert_eq!(cell1, vec![0, 3]);
    assert_eq!(zones[0].interface_to_boundary_face(), vec![1]);
}
