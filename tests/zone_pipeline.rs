use zone_mesh::algs::partition::INTERFACE_PATCH;
use zone_mesh::prelude::*;

fn global_box() -> Zone {
    let block = structured_box([5, 4, 3], [[0.0; 3], [4.0, 3.0, 2.0]]).unwrap();
    let patches = block.side_patches(BcType::Wall).unwrap();
    Zone::build(0, block.geometry(), &patches, &ZoneBuildOptions::default()).unwrap()
}

/// Four parts: quadrants in the i/j plane.
fn quadrants(zone: &Zone) -> Vec<ZoneId> {
    (0..zone.cell_count())
        .map(|c| {
            let (i, j) = (c % 4, (c / 4) % 3);
            usize::from(i >= 2) + 2 * usize::from(j >= 1)
        })
        .collect()
}

#[test]
fn split_preserves_cells_faces_and_volume() {
    let mut global = global_box();
    global.compute_geometry().unwrap();
    let global_volume: f64 = global.metrics().unwrap().cell_volumes[..global.cell_count()]
        .iter()
        .sum();

    let parts = quadrants(&global);
    let (mut zones, link) = split_zone(&global, &parts).unwrap();
    assert_eq!(zones.len(), 4);
    assert_eq!(
        zones.iter().map(Zone::cell_count).sum::<usize>(),
        global.cell_count()
    );

    let cut: usize = zones.iter().map(|z| z.interfaces().len()).sum::<usize>() / 2;
    let physical: usize = zones
        .iter()
        .map(|z| z.boundary_count() - z.interfaces().len())
        .sum();
    assert_eq!(physical, global.boundary_count());
    let interior: usize = zones
        .iter()
        .map(|z| z.faces().len() - z.boundary_count())
        .sum();
    assert_eq!(interior + cut, global.faces().len() - global.boundary_count());
    assert_eq!(link.zones().count(), 4);

    let mut volume = 0.0;
    for zone in zones.iter_mut() {
        zone.compute_geometry().unwrap();
        volume += zone.metrics().unwrap().cell_volumes[..zone.cell_count()]
            .iter()
            .sum::<f64>();
        assert!(zone.topology().patch_names().iter().any(|n| n == INTERFACE_PATCH));
        assert!(zone.global_face_ids().is_some());
    }
    assert!((volume - global_volume).abs() < 1e-9);
}

#[test]
fn exchanged_ghosts_match_neighbor_cells() {
    let global = global_box();
    let (mut zones, _) = split_zone(&global, &quadrants(&global)).unwrap();
    for zone in zones.iter_mut() {
        zone.compute_geometry().unwrap();
    }
    synchronize_interfaces(&mut zones).unwrap();
    let updated = exchange_ghost_geometry(&mut zones).unwrap();
    assert_eq!(
        updated,
        zones.iter().map(|z| z.interfaces().len()).sum::<usize>()
    );

    for zone in &zones {
        let m = zone.metrics().unwrap();
        for (local, face) in zone.interface_to_boundary_face().into_iter().enumerate() {
            let entry = zone.interfaces().entries()[local];
            let other = zones[entry.neighbor_zone].metrics().unwrap();
            let ghost = zone.cell_count() + face;
            assert_eq!(m.cell_centers[ghost], other.cell_centers[entry.neighbor_cell]);
            assert_eq!(m.cell_volumes[ghost], other.cell_volumes[entry.neighbor_cell]);
        }
    }
}

#[test]
fn global_zone_with_interfaces_cannot_be_split_again() {
    let global = global_box();
    let (zones, _) = split_zone(&global, &quadrants(&global)).unwrap();
    let parts = vec![0; zones[0].cell_count()];
    assert!(matches!(
        split_zone(&zones[0], &parts),
        Err(MeshError::FaceLinkMismatch(_))
    ));
}

#[test]
fn options_load_from_json() {
    let opts: ZoneBuildOptions =
        serde_json::from_str(r#"{ "patch_overlap": "Ignore", "degenerate_area": 1e-9 }"#).unwrap();
    assert_eq!(opts.patch_overlap, PatchOverlapHandling::Ignore);
    assert_eq!(opts.degenerate_area, 1e-9);
    let empty: ZoneBuildOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, ZoneBuildOptions::default());
}

#[test]
fn independent_zones_build_in_order() {
    let inputs: Vec<(ZoneId, GeometryStore, PatchSet)> = (0..3)
        .map(|id| {
            let block = structured_box([id + 2, 2, 1], [[0.0; 3], [1.0; 3]]).unwrap();
            let patches = block.side_patches(BcType::Symmetry).unwrap();
            (id, block.into_geometry(), patches)
        })
        .collect();
    let zones = build_zones(&inputs, &ZoneBuildOptions::default()).unwrap();
    let ids: Vec<_> = zones.iter().map(Zone::id).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(zones[2].cell_count(), 3);

    #[cfg(feature = "rayon")]
    {
        let par = build_zones_par(&inputs, &ZoneBuildOptions::default()).unwrap();
        for (a, b) in zones.iter().zip(&par) {
            assert_eq!(a.topology(), b.topology());
        }
    }
}
