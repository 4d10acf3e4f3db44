//! Boundary classification by node-set matching against boundary patches.
//!
//! Boundary faces are the prefix `[0, boundary_count)` of the face list. A
//! face matches a patch when every face node is a member of the patch node
//! set; patches are tried in registration order and the first match wins.
//! After classification every boundary face receives its dense ghost cell
//! `cell_count + i`.

use crate::data::bc::{BcType, PatchSet};
use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::builder::FaceTopology;
use crate::topology::face::{Face, assign_ghost_cells};
use crate::topology::{CellId, FaceId};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Behavior when a boundary face lies in more than one patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatchOverlapHandling {
    /// Skip the overlap check; first match wins silently.
    Ignore,
    /// Log a warning and keep the first match.
    #[default]
    Warn,
    /// Return [`MeshError::OverlappingPatches`].
    Error,
}

/// Faces with boundary conditions and ghost cells assigned.
///
/// This is the snapshot every later phase consumes: the resolver, the
/// registry, the ghost synthesizer and the persisted format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedTopology {
    cell_count: usize,
    faces: Vec<Face>,
    boundary_count: usize,
    bc_name_ids: Vec<usize>,
    patch_names: Vec<String>,
}

impl ClassifiedTopology {
    /// Assemble a classified snapshot from a boundary-first face list.
    ///
    /// Ghost ids are (re)assigned on the boundary prefix.
    ///
    /// # Errors
    /// - [`MeshError::UnclassifiedBoundary`] for an unclassified boundary face.
    /// - [`MeshError::LengthMismatch`] if `bc_name_ids` does not cover the prefix.
    /// - [`MeshError::InvalidGeometry`] for a name id past `patch_names`.
    /// - [`MeshError::InvalidGeometry`] if the prefix is not a prefix, or a face
    ///   references a cell past `cell_count`.
    pub fn from_parts(
        cell_count: usize,
        mut faces: Vec<Face>,
        boundary_count: usize,
        bc_name_ids: Vec<usize>,
        patch_names: Vec<String>,
    ) -> Result<Self, MeshError> {
        if boundary_count > faces.len() {
            return Err(MeshError::LengthMismatch {
                what: "boundary faces",
                expected: faces.len(),
                found: boundary_count,
            });
        }
        if bc_name_ids.len() != boundary_count {
            return Err(MeshError::LengthMismatch {
                what: "bc name ids",
                expected: boundary_count,
                found: bc_name_ids.len(),
            });
        }
        if let Some((id, name)) = bc_name_ids
            .iter()
            .enumerate()
            .find(|&(_, &n)| n >= patch_names.len())
        {
            return Err(MeshError::InvalidGeometry(format!(
                "boundary face {id}: bc name id {name} out of range ({} names)",
                patch_names.len()
            )));
        }
        for (id, face) in faces.iter().enumerate() {
            if face.left >= cell_count {
                return Err(MeshError::InvalidGeometry(format!(
                    "face {id}: left cell {} out of range ({cell_count} cells)",
                    face.left
                )));
            }
            let boundary = id < boundary_count;
            if boundary && face.bc == BcType::Unclassified {
                return Err(MeshError::UnclassifiedBoundary {
                    face: id,
                    nodes: face.nodes.clone(),
                });
            }
            if boundary == face.is_interior() {
                return Err(MeshError::InvalidGeometry(format!(
                    "face {id} tagged {} lies {} the boundary prefix of {boundary_count} faces",
                    face.bc,
                    if boundary { "inside" } else { "outside" }
                )));
            }
            if !boundary && face.right.is_none_or(|r| r >= cell_count) {
                return Err(MeshError::InvalidGeometry(format!(
                    "interior face {id}: right cell {:?} is not a real cell",
                    face.right
                )));
            }
        }
        assign_ghost_cells(&mut faces, cell_count, boundary_count);
        Ok(Self {
            cell_count,
            faces,
            boundary_count,
            bc_name_ids,
            patch_names,
        })
    }

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

    /// Ghost cell ids, `[cell_count, cell_count + boundary_count)`.
    pub fn ghost_range(&self) -> Range<CellId> {
        self.cell_count..self.cell_count + self.boundary_count
    }

    /// Ghost cell owned by boundary face `face`.
    pub fn ghost_of(&self, face: FaceId) -> Option<CellId> {
        (face < self.boundary_count).then(|| self.cell_count + face)
    }

    /// BC types of the boundary prefix.
    pub fn bc_types(&self) -> Vec<BcType> {
        self.boundary_faces().iter().map(|f| f.bc).collect()
    }

    /// Patch index (BC name id) of every boundary face.
    pub fn bc_name_ids(&self) -> &[usize] {
        &self.bc_name_ids
    }

    pub fn patch_names(&self) -> &[String] {
        &self.patch_names
    }

    pub fn interface_count(&self) -> usize {
        self.boundary_faces().iter().filter(|f| f.bc.is_interface()).count()
    }

    pub fn total_face_nodes(&self) -> usize {
        self.faces.iter().map(|f| f.nodes.len()).sum()
    }
}

/// Assign a BC type and name id to every boundary face, then ghost cells.
///
/// # Errors
/// - [`MeshError::UnclassifiedBoundary`] if a boundary face matches no patch.
/// - [`MeshError::OverlappingPatches`] if it matches several and `overlap`
///   is [`PatchOverlapHandling::Error`].
pub fn classify_boundary(
    topology: FaceTopology,
    patches: &PatchSet,
    overlap: PatchOverlapHandling,
) -> Result<ClassifiedTopology, MeshError> {
    let (cell_count, mut faces, boundary_count) = topology.into_parts();
    let mut bc_name_ids = Vec::with_capacity(boundary_count);
    let mut overlapping = 0usize;

    for (id, face) in faces[..boundary_count].iter_mut().enumerate() {
        let mut matches = patches
            .iter()
            .enumerate()
            .filter(|(_, patch)| patch.contains_face(&face.nodes));
        let Some((name_id, patch)) = matches.next() else {
            return Err(MeshError::UnclassifiedBoundary {
                face: id,
                nodes: face.nodes.clone(),
            });
        };
        if overlap != PatchOverlapHandling::Ignore {
            if let Some((_, other)) = matches.next() {
                overlapping += 1;
                match overlap {
                    PatchOverlapHandling::Error => {
                        return Err(MeshError::OverlappingPatches {
                            face: id,
                            first: patch.name().to_string(),
                            second: other.name().to_string(),
                        });
                    }
                    _ => log::warn!(
                        "boundary face {id} (nodes {:?}) matches patches `{}` and `{}`; using `{}`",
                        face.nodes,
                        patch.name(),
                        other.name(),
                        patch.name()
                    ),
                }
            }
        }
        face.bc = patch.bc_type();
        bc_name_ids.push(name_id);
    }

    log::debug!(
        "classified {boundary_count} boundary faces against {} patches ({overlapping} overlapping)",
        patches.len()
    );
    ClassifiedTopology::from_parts(cell_count, faces, boundary_count, bc_name_ids, patches.names())
}

impl DebugInvariants for ClassifiedTopology {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "ClassifiedTopology");
    }

    fn validate_invariants(&self) -> Result<(), MeshError> {
        for (id, face) in self.boundary_faces().iter().enumerate() {
            if face.right != Some(self.cell_count + id) {
                return Err(MeshError::InvalidGeometry(format!(
                    "boundary face {id}: ghost {:?}, expected {}",
                    face.right,
                    self.cell_count + id
                )));
            }
            let name = self.bc_name_ids[id];
            if name >= self.patch_names.len() {
                return Err(MeshError::InvalidGeometry(format!(
                    "boundary face {id}: bc name id {name} out of range ({} names)",
                    self.patch_names.len()
                )));
            }
        }
        for (offset, face) in self.interior_faces().iter().enumerate() {
            let id = self.boundary_count + offset;
            if face.left >= self.cell_count || face.right.is_none_or(|r| r >= self.cell_count) {
                return Err(MeshError::InvalidGeometry(format!(
                    "interior face {id}: cells {} / {:?} out of range ({} cells)",
                    face.left, face.right, self.cell_count
                )));
            }
        }
        Ok(())
    }
}
