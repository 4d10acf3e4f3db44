//! Cell type metadata and canonical local-face layouts.
//!
//! Each element type carries a fixed local-face layout: the positions (into
//! the element's node list) of every face, and the type of that face. The
//! layouts use the following vertex orderings:
//!
//! - [`CellType::Segment`]: `(0,1)`.
//! - [`CellType::Triangle`], [`CellType::Quadrilateral`]: counter-clockwise.
//! - [`CellType::Tetrahedron`]: `(0,1,2,3)` with positive volume.
//! - [`CellType::Pyramid`]: base `(0,1,2,3)` counter-clockwise seen from the apex `4`.
//! - [`CellType::Prism`]: bottom `(0,1,2)`, top `(3,4,5)`.
//! - [`CellType::Hexahedron`]: `0..=3` the bottom face and `4..=7` the top face.
//!
//! For volume cells the right-hand normal of every local face points out of
//! the element. For surface cells the in-plane edge normal `(t.y, -t.x)` does.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Common cell types for mesh elements.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum CellType {
    /// 0D vertex (face of a segment).
    Vertex,
    /// 1D segment/edge.
    Segment,
    /// 2D simplex (triangle).
    Triangle,
    /// 2D tensor-product cell (quad).
    Quadrilateral,
    /// 3D simplex (tet).
    Tetrahedron,
    /// 3D pyramid.
    Pyramid,
    /// 3D wedge/prism.
    Prism,
    /// 3D tensor-product cell (hex).
    Hexahedron,
}

impl Default for CellType {
    fn default() -> Self {
        CellType::Vertex
    }
}

/// One face of a reference element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalFace {
    /// Positions into the element's node list, in stored orientation.
    pub nodes: &'static [usize],
    /// Type of the face entity.
    pub face_type: CellType,
}

const fn lf(nodes: &'static [usize], face_type: CellType) -> LocalFace {
    LocalFace { nodes, face_type }
}

const SEGMENT_FACES: [LocalFace; 2] = [lf(&[0], CellType::Vertex), lf(&[1], CellType::Vertex)];

const TRIANGLE_FACES: [LocalFace; 3] = [
    lf(&[0, 1], CellType::Segment),
    lf(&[1, 2], CellType::Segment),
    lf(&[2, 0], CellType::Segment),
];

const QUAD_FACES: [LocalFace; 4] = [
    lf(&[0, 1], CellType::Segment),
    lf(&[1, 2], CellType::Segment),
    lf(&[2, 3], CellType::Segment),
    lf(&[3, 0], CellType::Segment),
];

const TET_FACES: [LocalFace; 4] = [
    lf(&[0, 2, 1], CellType::Triangle),
    lf(&[0, 1, 3], CellType::Triangle),
    lf(&[1, 2, 3], CellType::Triangle),
    lf(&[0, 3, 2], CellType::Triangle),
];

const PYRAMID_FACES: [LocalFace; 5] = [
    lf(&[0, 3, 2, 1], CellType::Quadrilateral),
    lf(&[0, 1, 4], CellType::Triangle),
    lf(&[1, 2, 4], CellType::Triangle),
    lf(&[2, 3, 4], CellType::Triangle),
    lf(&[3, 0, 4], CellType::Triangle),
];

const PRISM_FACES: [LocalFace; 5] = [
    lf(&[0, 2, 1], CellType::Triangle),
    lf(&[3, 4, 5], CellType::Triangle),
    lf(&[0, 1, 4, 3], CellType::Quadrilateral),
    lf(&[1, 2, 5, 4], CellType::Quadrilateral),
    lf(&[2, 0, 3, 5], CellType::Quadrilateral),
];

const HEX_FACES: [LocalFace; 6] = [
    lf(&[0, 3, 2, 1], CellType::Quadrilateral),
    lf(&[4, 5, 6, 7], CellType::Quadrilateral),
    lf(&[0, 1, 5, 4], CellType::Quadrilateral),
    lf(&[1, 2, 6, 5], CellType::Quadrilateral),
    lf(&[2, 3, 7, 6], CellType::Quadrilateral),
    lf(&[3, 0, 4, 7], CellType::Quadrilateral),
];

impl CellType {
    /// Returns the topological dimension of the cell.
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Vertex => 0,
            CellType::Segment => 1,
            CellType::Triangle | CellType::Quadrilateral => 2,
            CellType::Tetrahedron | CellType::Pyramid | CellType::Prism | CellType::Hexahedron => 3,
        }
    }

    /// Number of nodes an element of this type references.
    pub fn vertex_count(self) -> usize {
        match self {
            CellType::Vertex => 1,
            CellType::Segment => 2,
            CellType::Triangle => 3,
            CellType::Quadrilateral => 4,
            CellType::Tetrahedron => 4,
            CellType::Pyramid => 5,
            CellType::Prism => 6,
            CellType::Hexahedron => 8,
        }
    }

    /// Canonical local faces. A vertex has none.
    pub fn local_faces(self) -> &'static [LocalFace] {
        match self {
            CellType::Vertex => &[],
            CellType::Segment => &SEGMENT_FACES,
            CellType::Triangle => &TRIANGLE_FACES,
            CellType::Quadrilateral => &QUAD_FACES,
            CellType::Tetrahedron => &TET_FACES,
            CellType::Pyramid => &PYRAMID_FACES,
            CellType::Prism => &PRISM_FACES,
            CellType::Hexahedron => &HEX_FACES,
        }
    }

    /// Face type implied by the number of nodes of a face, if any.
    ///
    /// Used when faces are created from node lists alone (split interface
    /// faces, faces read back from a snapshot).
    pub fn face_type_for_nodes(node_count: usize) -> Option<CellType> {
        match node_count {
            1 => Some(CellType::Vertex),
            2 => Some(CellType::Segment),
            3 => Some(CellType::Triangle),
            4 => Some(CellType::Quadrilateral),
            _ => None,
        }
    }

    /// CGNS `ElementType_t` code used in persisted snapshots.
    pub fn code(self) -> i32 {
        match self {
            CellType::Vertex => 2,
            CellType::Segment => 3,
            CellType::Triangle => 5,
            CellType::Quadrilateral => 7,
            CellType::Tetrahedron => 10,
            CellType::Pyramid => 12,
            CellType::Prism => 14,
            CellType::Hexahedron => 17,
        }
    }

    /// Inverse of [`CellType::code`].
    pub fn from_code(code: i32) -> Option<CellType> {
        match code {
            2 => Some(CellType::Vertex),
            3 => Some(CellType::Segment),
            5 => Some(CellType::Triangle),
            7 => Some(CellType::Quadrilateral),
            10 => Some(CellType::Tetrahedron),
            12 => Some(CellType::Pyramid),
            14 => Some(CellType::Prism),
            17 => Some(CellType::Hexahedron),
            _ => None,
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
