//! Boundary-condition tags and named boundary patches.

use crate::topology::NodeId;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Boundary-condition tag carried by every face.
///
/// `Interior` marks faces shared by two real cells; `Unclassified` marks
/// boundary faces that have not (yet) matched a patch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BcType {
    Interior,
    #[default]
    Unclassified,
    Wall,
    Symmetry,
    Farfield,
    Inflow,
    Outflow,
    Extrapolate,
    Periodic,
    /// Seam between two zones; ghost data comes from the neighbor zone.
    Interface,
}

impl BcType {
    /// Integer code used in persisted snapshots.
    pub fn code(self) -> i32 {
        match self {
            BcType::Unclassified => -1,
            BcType::Interior => 0,
            BcType::Extrapolate => 1,
            BcType::Wall => 2,
            BcType::Symmetry => 3,
            BcType::Farfield => 4,
            BcType::Inflow => 5,
            BcType::Outflow => 6,
            BcType::Periodic => 7,
            BcType::Interface => 8,
        }
    }

    pub fn from_code(code: i32) -> Option<BcType> {
        Some(match code {
            -1 => BcType::Unclassified,
            0 => BcType::Interior,
            1 => BcType::Extrapolate,
            2 => BcType::Wall,
            3 => BcType::Symmetry,
            4 => BcType::Farfield,
            5 => BcType::Inflow,
            6 => BcType::Outflow,
            7 => BcType::Periodic,
            8 => BcType::Interface,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_interface(self) -> bool {
        self == BcType::Interface
    }

    /// A classified, non-interface boundary condition.
    #[inline]
    pub fn is_physical(self) -> bool {
        !matches!(
            self,
            BcType::Interior | BcType::Unclassified | BcType::Interface
        )
    }
}

impl fmt::Display for BcType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A named node set with the boundary condition it imposes.
///
/// Patches are only used during classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryPatch {
    name: String,
    bc_type: BcType,
    nodes: HashSet<NodeId>,
}

impl BoundaryPatch {
    pub fn new(
        name: impl Into<String>,
        bc_type: BcType,
        nodes: impl IntoIterator<Item = NodeId>,
    ) -> Self {
        Self {
            name: name.into(),
            bc_type,
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bc_type(&self) -> BcType {
        self.bc_type
    }

    pub fn nodes(&self) -> &HashSet<NodeId> {
        &self.nodes
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// True iff every node of `face_nodes` belongs to the patch.
    pub fn contains_face(&self, face_nodes: &[NodeId]) -> bool {
        face_nodes.iter().all(|n| self.nodes.contains(n))
    }
}

/// Patches in registration order. The position of a patch is its BC name id.
#[derive(Clone, Debug, Default)]
pub struct PatchSet {
    patches: Vec<BoundaryPatch>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a patch and return its name id.
    pub fn push(&mut self, patch: BoundaryPatch) -> usize {
        self.patches.push(patch);
        self.patches.len() - 1
    }

    pub fn get(&self, name_id: usize) -> Option<&BoundaryPatch> {
        self.patches.get(name_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoundaryPatch> {
        self.patches.iter()
    }

    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.patches.iter().map(|p| p.name.clone()).collect()
    }
}

impl FromIterator<BoundaryPatch> for PatchSet {
    fn from_iter<I: IntoIterator<Item = BoundaryPatch>>(iter: I) -> Self {
        Self {
            patches: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bc_codes_roundtrip() {
        for bc in [
            BcType::Interior,
            BcType::Unclassified,
            BcType::Wall,
            BcType::Symmetry,
            BcType::Farfield,
            BcType::Inflow,
            BcType::Outflow,
            BcType::Extrapolate,
            BcType::Periodic,
            BcType::Interface,
        ] {
            assert_eq!(BcType::from_code(bc.code()), Some(bc));
        }
        assert!(BcType::Wall.is_physical());
        assert!(!BcType::Interface.is_physical());
        assert!(!BcType::Unclassified.is_physical());
    }

    #[test]
    fn patch_contains_face_requires_all_nodes() {
        let patch = BoundaryPatch::new("inlet", BcType::Inflow, [1, 2, 3]);
        assert!(patch.contains_face(&[1, 3]));
        assert!(!patch.contains_face(&[1, 4]));
    }
}
