//! Cell-to-cell adjacency over a finalized face list.

use crate::data::bc::BcType;
use crate::topology::face::Face;
use crate::topology::{CellId, FaceId};

/// Neighbor lists of every real cell.
///
/// Interior faces connect both sides. Interface boundary faces connect the
/// owner to its ghost, whose data is imported from the neighbor zone;
/// physical ghosts are left out. Neighbors appear in face order, interface
/// ghosts first.
pub fn cell_to_cell(faces: &[Face], cell_count: usize, boundary_count: usize) -> Vec<Vec<CellId>> {
    let mut c2c = vec![Vec::new(); cell_count];
    for face in &faces[..boundary_count] {
        if face.bc == BcType::Interface {
            if let Some(ghost) = face.right {
                c2c[face.left].push(ghost);
            }
        }
    }
    for face in &faces[boundary_count..] {
        if let Some(right) = face.right {
            c2c[face.left].push(right);
            c2c[right].push(face.left);
        }
    }
    c2c
}

/// Boundary-face index of every interface, in local interface order.
pub fn interface_to_boundary_face(faces: &[Face], boundary_count: usize) -> Vec<FaceId> {
    faces[..boundary_count]
        .iter()
        .enumerate()
        .filter(|(_, f)| f.bc.is_interface())
        .map(|(i, _)| i)
        .collect()
}
