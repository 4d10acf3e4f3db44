//! Ghost geometry halo exchange between zones.
//!
//! A zone packs the center and volume of the cells owning its interfaces, in
//! the send order of the group for one neighbor. The neighbor unpacks the
//! records in its receive order for that zone, writing each into the ghost
//! slot of the matching interface face. Both orders come from
//! [`synchronize_interfaces`](crate::zone::synchronize_interfaces); the
//! transport between the two calls is up to the caller.

use crate::algs::wire::{
    KIND_GHOST_GEOMETRY, WireCellGeometry, get_header, get_records, put_header, put_records,
};
use crate::mesh_error::MeshError;
use crate::topology::ZoneId;
use crate::zone::Zone;
use bytes::{Bytes, BytesMut};
use hashbrown::HashMap;

fn geometry_missing(zone: &Zone) -> MeshError {
    MeshError::InvalidGeometry(format!("zone {}: geometry not computed", zone.id()))
}

/// Boundary face of every registered interface.
fn interface_faces(zone: &Zone) -> Result<Vec<usize>, MeshError> {
    let to_face = zone.interface_to_boundary_face();
    if to_face.len() != zone.interfaces().len() {
        return Err(MeshError::LengthMismatch {
            what: "registered interfaces",
            expected: to_face.len(),
            found: zone.interfaces().len(),
        });
    }
    Ok(to_face)
}

/// Encode owner-cell geometry of the interfaces shared with `neighbor`.
pub fn pack_interface_cells(zone: &Zone, neighbor: ZoneId) -> Result<Bytes, MeshError> {
    let metrics = zone.metrics().ok_or_else(|| geometry_missing(zone))?;
    let to_face = interface_faces(zone)?;
    let faces = zone.faces();
    let records: Vec<WireCellGeometry> = zone
        .interfaces()
        .group(neighbor)?
        .send_order()
        .iter()
        .map(|&local| {
            let owner = faces[to_face[local]].left;
            WireCellGeometry::new(metrics.cell_centers[owner], metrics.cell_volumes[owner])
        })
        .collect();

    let mut buf = BytesMut::with_capacity(16 + records.len() * WireCellGeometry::SIZE);
    put_header(&mut buf, KIND_GHOST_GEOMETRY);
    put_records(&mut buf, &records);
    Ok(buf.freeze())
}

/// Write geometry received from `neighbor` into the matching ghost slots.
///
/// Returns the number of ghosts updated.
pub fn unpack_interface_ghosts(
    zone: &mut Zone,
    neighbor: ZoneId,
    mut payload: Bytes,
) -> Result<usize, MeshError> {
    get_header(&mut payload, KIND_GHOST_GEOMETRY)?;
    let records: Vec<WireCellGeometry> = get_records(&mut payload, "ghost geometry")?;
    let recv = zone.interfaces().recv_manifest(neighbor)?.to_vec();
    if records.len() != recv.len() {
        return Err(MeshError::LengthMismatch {
            what: "ghost geometry records",
            expected: recv.len(),
            found: records.len(),
        });
    }
    let to_face = interface_faces(zone)?;
    for (record, local) in records.iter().zip(recv) {
        zone.set_ghost_geometry(to_face[local], record.center(), record.volume())?;
    }
    Ok(records.len())
}

/// Exchange interface ghost geometry among `zones` in process.
///
/// Every zone must have computed geometry and the zones must be
/// synchronized. Returns the number of ghosts updated.
pub fn exchange_ghost_geometry(zones: &mut [Zone]) -> Result<usize, MeshError> {
    let index: HashMap<ZoneId, usize> =
        zones.iter().enumerate().map(|(i, z)| (z.id(), i)).collect();

    let mut outbox = Vec::new();
    for zone in zones.iter() {
        for neighbor in zone.interfaces().neighbor_zones() {
            outbox.push((zone.id(), neighbor, pack_interface_cells(zone, neighbor)?));
        }
    }

    let mut updated = 0;
    for (from, to, payload) in outbox {
        let &target = index.get(&to).ok_or(MeshError::MissingNeighborGroup {
            zone: to,
            neighbor: from,
        })?;
        updated += unpack_interface_ghosts(&mut zones[target], from, payload)?;
    }
    log::debug!("halo exchange updated {updated} interface ghosts");
    Ok(updated)
}
