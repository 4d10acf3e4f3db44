//! Face records and boundary-first reordering.
//!
//! Faces live in one dense array per zone and reference cells and nodes by
//! index. After reordering, boundary faces form a contiguous prefix
//! `[0, boundary_count)`, which is what makes ghost ids dense: boundary face
//! `i` owns ghost cell `cell_count + i`.

use crate::data::bc::BcType;
use crate::topology::cell_type::CellType;
use crate::topology::{CellId, NodeId};
use serde::{Deserialize, Serialize};

/// A face and its two-sided cell adjacency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// Node list in the orientation of the element that introduced the face.
    pub nodes: Vec<NodeId>,
    /// Owning cell; always a real cell.
    pub left: CellId,
    /// Neighbor cell. `None` for a boundary face before ghost assignment.
    pub right: Option<CellId>,
    /// Position of this face in the left cell's local-face layout.
    pub left_pos: u8,
    /// Position of this face in the right cell's local-face layout.
    pub right_pos: Option<u8>,
    pub face_type: CellType,
    pub bc: BcType,
}

impl Face {
    /// A freshly discovered face with only its owner known.
    pub fn owned_by(nodes: Vec<NodeId>, left: CellId, left_pos: u8, face_type: CellType) -> Self {
        Self {
            nodes,
            left,
            right: None,
            left_pos,
            right_pos: None,
            face_type,
            bc: BcType::Unclassified,
        }
    }

    /// Shared by two real cells.
    #[inline]
    pub fn is_interior(&self) -> bool {
        self.bc == BcType::Interior
    }
}

/// Stable partition order placing faces without a right cell first.
///
/// Returns `(order, boundary_count)` where `order[new] = old`.
pub fn boundary_first_order(faces: &[Face]) -> (Vec<usize>, usize) {
    let mut order = Vec::with_capacity(faces.len());
    order.extend(
        faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.right.is_none())
            .map(|(i, _)| i),
    );
    let boundary_count = order.len();
    order.extend(
        faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.right.is_some())
            .map(|(i, _)| i),
    );
    (order, boundary_count)
}

/// Gather `items` through `order` (`out[i] = items[order[i]]`).
///
/// Used for every face-indexed array so they stay aligned.
pub fn permute<T: Clone>(items: &[T], order: &[usize]) -> Vec<T> {
    order.iter().map(|&old| items[old].clone()).collect()
}

/// Set the dense ghost ids `cell_count + i` on the boundary prefix.
pub fn assign_ghost_cells(faces: &mut [Face], cell_count: usize, boundary_count: usize) {
    for (i, face) in faces.iter_mut().take(boundary_count).enumerate() {
        face.right = Some(cell_count + i);
        face.right_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(left: CellId, right: Option<CellId>) -> Face {
        let mut f = Face::owned_by(vec![left, left + 1], left, 0, CellType::Segment);
        f.right = right;
        f
    }

    #[test]
    fn boundary_first_is_stable() {
        let faces = vec![
            face(0, Some(1)),
            face(1, None),
            face(2, Some(3)),
            face(3, None),
            face(4, None),
        ];
        let (order, nb) = boundary_first_order(&faces);
        assert_eq!(order, vec![1, 3, 4, 0, 2]);
        assert_eq!(nb, 3);
        let reordered = permute(&faces, &order);
        assert_eq!(reordered[0].left, 1);
        assert_eq!(reordered[3].left, 0);
    }

    #[test]
    fn ghost_ids_follow_boundary_prefix() {
        let mut faces = vec![face(0, None), face(1, None), face(0, Some(1))];
        assign_ghost_cells(&mut faces, 2, 2);
        assert_eq!(faces[0].right, Some(2));
        assert_eq!(faces[1].right, Some(3));
        assert_eq!(faces[2].right, Some(1));
    }
}
