//! Interface bookkeeping between zones.
//!
//! This module re-exports the [`interface`] submodule.

pub mod interface;

pub use interface::{InterfaceEntry, InterfaceRegistry, NeighborGroup, resolve_reciprocal_all};
