//! Construct deduplicated faces and face→cell adjacency from element data.
//!
//! Every element contributes its canonical local faces. A face is identified
//! by the *sorted* tuple of its node indices; the stored node list keeps the
//! orientation of the element that introduced the face. A second visit of the
//! same key records the right cell and marks the face interior. Finally the
//! faces are stably reordered so that boundary faces come first.
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), zone_mesh::mesh_error::MeshError> {
//! use zone_mesh::data::geometry::GeometryStore;
//! use zone_mesh::topology::builder::build_face_topology;
//! use zone_mesh::topology::cell_type::CellType;
//!
//! let mut geo = GeometryStore::new();
//! for x in [0.0, 1.0, 2.0] {
//!     geo.push_node([x, 0.0, 0.0]);
//! }
//! geo.push_element(CellType::Segment, vec![0, 1])?;
//! geo.push_element(CellType::Segment, vec![1, 2])?;
//!
//! let topo = build_face_topology(&geo)?;
//! assert_eq!(topo.face_count(), 3);
//! assert_eq!(topo.boundary_count(), 2);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use crate::data::geometry::GeometryStore;
use crate::mesh_error::MeshError;
use crate::topology::face::{Face, boundary_first_order, permute};
use crate::topology::{CellId, FaceId, NodeId};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Output of the topology builder.
///
/// Boundary faces occupy `[0, boundary_count)` and have no right cell yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceTopology {
    cell_count: usize,
    faces: Vec<Face>,
    boundary_count: usize,
}

impl FaceTopology {
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn boundary_count(&self) -> usize {
        self.boundary_count
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn boundary_faces(&self) -> &[Face] {
        &self.faces[..self.boundary_count]
    }

    pub fn interior_faces(&self) -> &[Face] {
        &self.faces[self.boundary_count..]
    }

    /// Sum of node counts over all faces.
    pub fn total_face_nodes(&self) -> usize {
        self.faces.iter().map(|f| f.nodes.len()).sum()
    }

    pub(crate) fn into_parts(self) -> (usize, Vec<Face>, usize) {
        (self.cell_count, self.faces, self.boundary_count)
    }
}

/// Build the face list of a zone.
///
/// # Errors
/// - [`MeshError::DegenerateFace`] if a local face repeats a node.
/// - [`MeshError::NonManifoldFace`] if a face key is visited a third time or
///   twice by the same element.
/// - [`MeshError::CellNodeCount`] if an element is shorter than its layout.
pub fn build_face_topology(geometry: &GeometryStore) -> Result<FaceTopology, MeshError> {
    let mut keys: BTreeMap<Vec<NodeId>, FaceId> = BTreeMap::new();
    let mut faces: Vec<Face> = Vec::new();

    for (cell, element) in geometry.elements().iter().enumerate() {
        for (pos, local) in element.cell_type.local_faces().iter().enumerate() {
            let nodes = local
                .nodes
                .iter()
                .map(|&p| element.nodes.get(p).copied())
                .collect::<Option<Vec<NodeId>>>()
                .ok_or_else(|| MeshError::CellNodeCount {
                    cell,
                    cell_type: element.cell_type.to_string(),
                    expected: element.cell_type.vertex_count(),
                    found: element.nodes.len(),
                })?;

            let mut key = nodes.clone();
            key.sort_unstable();
            if let Some(w) = key.windows(2).find(|w| w[0] == w[1]) {
                return Err(MeshError::DegenerateFace {
                    cell,
                    local_face: pos,
                    node: w[0],
                    nodes,
                });
            }

            match keys.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(faces.len());
                    faces.push(Face::owned_by(nodes, cell, pos as u8, local.face_type));
                }
                Entry::Occupied(slot) => {
                    let id = *slot.get();
                    attach_right(&mut faces[id], id, cell, pos as u8)?;
                }
            }
        }
    }

    let (order, boundary_count) = boundary_first_order(&faces);
    let faces = permute(&faces, &order);
    log::debug!(
        "built {} faces ({} boundary, {} interior) from {} cells",
        faces.len(),
        boundary_count,
        faces.len() - boundary_count,
        geometry.cell_count()
    );

    Ok(FaceTopology {
        cell_count: geometry.cell_count(),
        faces,
        boundary_count,
    })
}

fn attach_right(face: &mut Face, id: FaceId, cell: CellId, pos: u8) -> Result<(), MeshError> {
    if face.right.is_some() || face.left == cell {
        return Err(MeshError::NonManifoldFace {
            face: id,
            nodes: face.nodes.clone(),
            left: face.left,
            right: face.right,
            cell,
        });
    }
    face.right = Some(cell);
    face.right_pos = Some(pos);
    face.bc = crate::data::bc::BcType::Interior;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bc::BcType;
    use crate::topology::cell_type::CellType;

    fn two_triangles() -> GeometryStore {
        // 3---2
        // | / |
        // 0---1
        let mut geo = GeometryStore::new();
        for xy in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
            geo.push_node([xy[0], xy[1], 0.0]);
        }
        geo.push_element(CellType::Triangle, vec![0, 1, 2]).unwrap();
        geo.push_element(CellType::Triangle, vec![0, 2, 3]).unwrap();
        geo
    }

    #[test]
    fn shared_edge_keeps_first_orientation() {
        let topo = build_face_topology(&two_triangles()).unwrap();
        assert_eq!(topo.face_count(), 5);
        assert_eq!(topo.boundary_count(), 4);
        let shared = &topo.interior_faces()[0];
        // Introduced by triangle 0 as local edge (2,0).
        assert_eq!(shared.nodes, vec![2, 0]);
        assert_eq!((shared.left, shared.right), (0, Some(1)));
        assert_eq!((shared.left_pos, shared.right_pos), (2, Some(0)));
        assert_eq!(shared.bc, BcType::Interior);
        assert!(topo
            .boundary_faces()
            .iter()
            .all(|f| f.right.is_none() && f.bc == BcType::Unclassified));
    }

    #[test]
    fn boundary_faces_keep_discovery_order() {
        let topo = build_face_topology(&two_triangles()).unwrap();
        let nodes: Vec<_> = topo.boundary_faces().iter().map(|f| f.nodes.clone()).collect();
        assert_eq!(nodes, vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]]);
    }

    #[test]
    fn repeated_node_is_fatal() {
        let mut geo = GeometryStore::new();
        for x in [0.0, 1.0, 2.0] {
            geo.push_node([x, 0.0, 0.0]);
        }
        geo.push_element(CellType::Triangle, vec![0, 1, 1]).unwrap();
        let err = build_face_topology(&geo).unwrap_err();
        assert!(matches!(err, MeshError::DegenerateFace { cell: 0, node: 1, .. }));
        assert!(err.is_malformed_topology());
    }

    #[test]
    fn third_claimant_is_fatal() {
        let mut geo = GeometryStore::new();
        for xy in [[0.0, 0.0], [1.0, 0.0], [0.5, 1.0], [0.5, -1.0], [1.5, 0.5]] {
            geo.push_node([xy[0], xy[1], 0.0]);
        }
        geo.push_element(CellType::Triangle, vec![0, 1, 2]).unwrap();
        geo.push_element(CellType::Triangle, vec![1, 0, 3]).unwrap();
        geo.push_element(CellType::Triangle, vec![0, 1, 4]).unwrap();
        assert!(matches!(
            build_face_topology(&geo),
            Err(MeshError::NonManifoldFace { left: 0, right: Some(1), cell: 2, .. })
        ));
    }
}
