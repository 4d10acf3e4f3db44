//! Split a classified zone into per-part zones joined by interfaces.
//!
//! Given a part id per cell, every part becomes a [`Zone`] with:
//! - its cells in ascending global order,
//! - nodes renumbered through the sorted set of global nodes it uses,
//! - the physical boundary faces of its cells,
//! - one `Interface` boundary face per cut face, oriented out of the local
//!   cell (node order reversed when the local cell was the global right cell),
//! - its interior faces.
//!
//! The global id of an interface is the global face id of the cut face.
//! Interfaces are registered in boundary-face order, both in the zone's
//! [`InterfaceRegistry`] and in the returned [`FaceLink`].

use crate::algs::boundary::ClassifiedTopology;
use crate::algs::face_link::FaceLink;
use crate::data::bc::BcType;
use crate::mesh_error::MeshError;
use crate::overlap::interface::InterfaceRegistry;
use crate::topology::face::Face;
use crate::topology::{CellId, FaceId, GlobalId, NodeId, ZoneId};
use crate::zone::Zone;
use std::collections::BTreeSet;

/// BC name given to cut faces.
pub const INTERFACE_PATCH: &str = "interface";

/// A local face before node renumbering.
struct LocalFace {
    global: FaceId,
    face: Face,
    name_id: usize,
    neighbor: Option<(ZoneId, CellId)>,
}

/// Split `global` into one zone per part id in `parts` (indexed by cell).
///
/// Zone ids are the part ids `0..=max(parts)`.
///
/// # Errors
/// - [`MeshError::LengthMismatch`] if `parts` does not cover every cell.
/// - [`MeshError::PartitionOutOfRange`] if a part id is not below the cell count.
/// - [`MeshError::FaceLinkMismatch`] if `global` already has interfaces.
pub fn split_zone(global: &Zone, parts: &[ZoneId]) -> Result<(Vec<Zone>, FaceLink), MeshError> {
    let topo = global.topology();
    if parts.len() != topo.cell_count() {
        return Err(MeshError::LengthMismatch {
            what: "cell partition",
            expected: topo.cell_count(),
            found: parts.len(),
        });
    }
    if topo.interface_count() > 0 {
        return Err(MeshError::FaceLinkMismatch(format!(
            "zone {} already has {} interfaces and cannot be split",
            global.id(),
            topo.interface_count()
        )));
    }
    if let Some((cell, &part)) = parts.iter().enumerate().find(|&(_, &p)| p >= parts.len()) {
        return Err(MeshError::PartitionOutOfRange {
            cell,
            part,
            limit: parts.len(),
        });
    }
    let nzones = parts.iter().max().map_or(0, |&p| p + 1);

    // Local index of every global cell inside its own part.
    let mut counts = vec![0usize; nzones];
    let local_cell: Vec<CellId> = parts
        .iter()
        .map(|&p| {
            counts[p] += 1;
            counts[p] - 1
        })
        .collect();

    let interface_name = topo.patch_names().len();
    let mut patch_names = topo.patch_names().to_vec();
    patch_names.push(INTERFACE_PATCH.to_string());

    let mut boundary: Vec<Vec<LocalFace>> = (0..nzones).map(|_| Vec::new()).collect();
    let mut interior: Vec<Vec<LocalFace>> = (0..nzones).map(|_| Vec::new()).collect();
    let mut cut = 0usize;

    for (gid, face) in topo.boundary_faces().iter().enumerate() {
        let p = parts[face.left];
        let mut f = face.clone();
        f.left = local_cell[face.left];
        f.right = None;
        boundary[p].push(LocalFace {
            global: gid,
            face: f,
            name_id: topo.bc_name_ids()[gid],
            neighbor: None,
        });
    }

    let nb = topo.boundary_count();
    let mut cut_faces: Vec<Vec<LocalFace>> = (0..nzones).map(|_| Vec::new()).collect();
    for (offset, face) in topo.interior_faces().iter().enumerate() {
        let gid = nb + offset;
        let (l, r) = match face.right {
            Some(r) => (face.left, r),
            None => continue,
        };
        let (pl, pr) = (parts[l], parts[r]);
        if pl == pr {
            let mut f = face.clone();
            f.left = local_cell[l];
            f.right = Some(local_cell[r]);
            interior[pl].push(LocalFace {
                global: gid,
                face: f,
                name_id: 0,
                neighbor: None,
            });
            continue;
        }
        cut += 1;
        let mut from_left = face.clone();
        from_left.left = local_cell[l];
        from_left.right = None;
        from_left.right_pos = None;
        from_left.bc = BcType::Interface;
        cut_faces[pl].push(LocalFace {
            global: gid,
            face: from_left,
            name_id: interface_name,
            neighbor: Some((pr, local_cell[r])),
        });

        let mut from_right = face.clone();
        from_right.nodes.reverse();
        from_right.left = local_cell[r];
        from_right.left_pos = face.right_pos.unwrap_or(0);
        from_right.right = None;
        from_right.right_pos = None;
        from_right.bc = BcType::Interface;
        cut_faces[pr].push(LocalFace {
            global: gid,
            face: from_right,
            name_id: interface_name,
            neighbor: Some((pl, local_cell[l])),
        });
    }

    let cell_types = global.cell_types();
    let mut link = FaceLink::new();
    let mut zones = Vec::with_capacity(nzones);
    for (p, ((mut bfaces, cfaces), ifaces)) in boundary
        .into_iter()
        .zip(cut_faces)
        .zip(interior)
        .enumerate()
    {
        bfaces.extend(cfaces);
        let boundary_count = bfaces.len();
        let all: Vec<LocalFace> = bfaces.into_iter().chain(ifaces).collect();

        let used: BTreeSet<NodeId> = all.iter().flat_map(|lf| lf.face.nodes.iter().copied()).collect();
        let node_map: hashbrown::HashMap<NodeId, NodeId> =
            used.iter().enumerate().map(|(local, &g)| (g, local)).collect();
        let nodes: Vec<[f64; 3]> = used.iter().map(|&g| global.nodes()[g]).collect();

        let mut registry = InterfaceRegistry::new(p);
        let mut faces = Vec::with_capacity(all.len());
        let mut name_ids = Vec::with_capacity(boundary_count);
        let mut global_ids: Vec<GlobalId> = Vec::with_capacity(all.len());
        for (i, mut lf) in all.into_iter().enumerate() {
            lf.face.nodes.iter_mut().for_each(|n| *n = node_map[&*n]);
            if let Some((zone, cell)) = lf.neighbor {
                let local = registry.register(lf.global, zone, cell)?;
                link.register(p, local, lf.global)?;
            }
            if i < boundary_count {
                name_ids.push(lf.name_id);
            }
            global_ids.push(lf.global);
            faces.push(lf.face);
        }

        let zone_cells: Vec<_> = parts
            .iter()
            .zip(cell_types)
            .filter(|(part, _)| **part == p)
            .map(|(_, &ct)| ct)
            .collect();
        let topology = ClassifiedTopology::from_parts(
            counts[p],
            faces,
            boundary_count,
            name_ids,
            patch_names.clone(),
        )?;
        log::debug!(
            "part {p}: {} cells, {} faces, {} interfaces",
            counts[p],
            topology.face_count(),
            registry.len()
        );
        let mut zone = Zone::from_parts(p, nodes, zone_cells, topology, registry, *global.options());
        zone.set_global_face_ids(global_ids);
        zone.set_volume_tag(global.volume_tag());
        zones.push(zone);
    }

    log::info!(
        "split zone {} into {nzones} zones across {cut} cut faces",
        global.id()
    );
    Ok((zones, link))
}
