#![cfg_attr(docsrs, feature(doc_cfg))]
//! # zone-mesh
//!
//! zone-mesh builds the unstructured face topology a finite-volume solver
//! runs on, one zone (partition) at a time, and the maps that stitch zones
//! together across partition interfaces.
//!
//! ## Features
//! - Face deduplication from per-cell node lists, with boundary faces first
//!   and dense ghost cell ids
//! - Boundary classification against named node-set patches
//! - Non-conforming interface splitting through a pluggable face search
//! - Per-zone interface registries with reciprocal send/receive manifests
//! - Face/cell metrics, ghost geometry synthesis and halo exchange
//! - A versioned little-endian snapshot format
//! - Structured box generation and zone splitting for tests and demos
//!
//! ## Pipeline
//!
//! 1. [`Zone::build`](zone::Zone::build): faces, then boundary classification.
//! 2. Register interfaces (done by [`split_zone`](algs::partition::split_zone)).
//! 3. Optionally [`relink_zones`](zone::relink_zones) for non-conforming seams.
//! 4. [`synchronize_interfaces`](zone::synchronize_interfaces), the barrier.
//! 5. [`Zone::compute_geometry`](zone::Zone::compute_geometry), then
//!    [`exchange_ghost_geometry`](algs::halo::exchange_ghost_geometry).
//!
//! ## Determinism
//!
//! Face ids, ghost ids and interface numbering depend only on input order.
//! Building the same zone twice yields identical arrays.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! zone-mesh = "0.1"
//! # Optional features:
//! # features = ["rayon", "check-invariants"]
//! ```

pub mod algs;
pub mod data;
pub mod debug_invariants;
pub mod geometry;
pub mod io;
pub mod mesh_error;
pub mod overlap;
pub mod topology;
pub mod zone;

pub use debug_invariants::DebugInvariants;

/// A convenient prelude to import the most-used traits & types:
pub mod prelude {
    pub use crate::algs::boundary::{ClassifiedTopology, PatchOverlapHandling};
    pub use crate::algs::face_link::{ChildFace, FaceLink, FaceSearch, FaceSearchTable, NodeRef};
    pub use crate::algs::halo::exchange_ghost_geometry;
    pub use crate::algs::meshgen::{BoxSide, IjkRegion, StructuredBox, structured_box};
    pub use crate::algs::partition::split_zone;
    pub use crate::data::bc::{BcType, BoundaryPatch, PatchSet};
    pub use crate::data::geometry::GeometryStore;
    pub use crate::debug_invariants::DebugInvariants;
    pub use crate::geometry::{GhostReport, MeshMetrics};
    pub use crate::io::{MeshReader, MeshSnapshot, MeshWriter, SnapshotFormat};
    pub use crate::mesh_error::MeshError;
    pub use crate::overlap::interface::{InterfaceEntry, InterfaceRegistry};
    pub use crate::topology::cell_type::CellType;
    pub use crate::topology::face::Face;
    pub use crate::topology::{CellId, FaceId, GlobalId, NodeId, ZoneId};
    #[cfg(feature = "rayon")]
    pub use crate::zone::build_zones_par;
    pub use crate::zone::{
        Zone, ZoneBuildOptions, build_zones, relink_zones, synchronize_interfaces,
    };
}
