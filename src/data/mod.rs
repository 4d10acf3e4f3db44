//! Per-zone input data: geometry and boundary patches.

pub mod bc;
pub mod geometry;
