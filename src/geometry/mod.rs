//! Face/cell metrics and ghost cell geometry.

pub mod ghost;
pub mod metrics;

pub use ghost::{DEGENERATE_AREA, GhostReport, mirror_ghost_center, synthesize_ghosts};
pub use metrics::{MeshMetrics, compute_metrics};
