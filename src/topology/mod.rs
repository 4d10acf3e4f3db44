//! Face topology of a zone: cell types, deduplicated faces, adjacency.
//!
//! All cross-references are dense `usize` indices into per-zone arrays.

pub mod adjacency;
pub mod builder;
pub mod cell_type;
pub mod face;

/// Partition-local node index.
pub type NodeId = usize;
/// Partition-local cell index. Ghost cells continue the range past the real cells.
pub type CellId = usize;
/// Partition-local face index.
pub type FaceId = usize;
/// Zone (partition) index.
pub type ZoneId = usize;
/// Process-wide interface id, shared by both zones of an interface.
pub type GlobalId = usize;
