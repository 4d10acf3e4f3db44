//! Raw per-zone geometry: node coordinates and element connectivity.
//!
//! A [`GeometryStore`] is the leaf input of the topology pipeline. It is
//! produced by a grid generator or format adapter and consumed by
//! [`build_face_topology`](crate::topology::builder::build_face_topology).

use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::{CellId, NodeId};
use serde::{Deserialize, Serialize};

/// One element (cell): its type tag and ordered node list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub cell_type: CellType,
    pub nodes: Vec<NodeId>,
}

/// Node table plus element table of a single zone.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryStore {
    nodes: Vec<[f64; 3]>,
    elements: Vec<Element>,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize, elements: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            elements: Vec::with_capacity(elements),
        }
    }

    /// Append a node and return its index.
    pub fn push_node(&mut self, xyz: [f64; 3]) -> NodeId {
        self.nodes.push(xyz);
        self.nodes.len() - 1
    }

    /// Append an element and return its cell index.
    ///
    /// # Errors
    /// [`MeshError::CellNodeCount`] if the node count does not match the
    /// type, [`MeshError::NodeOutOfRange`] if a node is not in the table.
    /// Vertices cannot be used as cells.
    pub fn push_element(
        &mut self,
        cell_type: CellType,
        nodes: impl Into<Vec<NodeId>>,
    ) -> Result<CellId, MeshError> {
        let nodes = nodes.into();
        let cell = self.elements.len();
        if cell_type == CellType::Vertex {
            return Err(MeshError::InvalidGeometry(format!(
                "cell {cell}: vertices cannot be used as cells"
            )));
        }
        if nodes.len() != cell_type.vertex_count() {
            return Err(MeshError::CellNodeCount {
                cell,
                cell_type: cell_type.to_string(),
                expected: cell_type.vertex_count(),
                found: nodes.len(),
            });
        }
        if let Some(&node) = nodes.iter().find(|&&n| n >= self.nodes.len()) {
            return Err(MeshError::NodeOutOfRange {
                cell,
                node,
                node_count: self.nodes.len(),
            });
        }
        self.elements.push(Element { cell_type, nodes });
        Ok(cell)
    }

    pub fn nodes(&self) -> &[[f64; 3]] {
        &self.nodes
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn cell_count(&self) -> usize {
        self.elements.len()
    }

    /// Element type tags in cell order.
    pub fn cell_types(&self) -> Vec<CellType> {
        self.elements.iter().map(|e| e.cell_type).collect()
    }
}
