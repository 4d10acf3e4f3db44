//! Zone construction algorithms.

pub mod boundary;
pub mod face_link;
pub mod halo;
pub mod meshgen;
pub mod partition;
pub mod wire;

pub use boundary::{ClassifiedTopology, PatchOverlapHandling, classify_boundary};
pub use face_link::{ChildFace, FaceLink, FaceSearch, FaceSearchTable, NodeRef, resolve_face_links};
pub use halo::{exchange_ghost_geometry, pack_interface_cells, unpack_interface_ghosts};
pub use meshgen::{BoxSide, IjkRegion, StructuredBox, structured_box};
pub use partition::split_zone;
