//! Mesh snapshot I/O.
//!
//! This module provides trait-based readers and writers for persisting the
//! topology of one zone as a [`MeshSnapshot`].

pub mod snapshot;

use crate::mesh_error::MeshError;
use std::io::{Read, Write};

pub use snapshot::{MeshSnapshot, decode_snapshot, encode_snapshot, read_snapshot, write_snapshot};

/// Trait for mesh readers that produce a snapshot.
pub trait MeshReader {
    /// Parse a snapshot from a reader.
    fn read<R: Read>(&self, reader: R) -> Result<MeshSnapshot, MeshError>;
}

/// Trait for mesh writers that serialize a snapshot.
pub trait MeshWriter {
    /// Serialize a snapshot to a writer.
    fn write<W: Write>(&self, writer: W, snapshot: &MeshSnapshot) -> Result<(), MeshError>;
}

/// The little-endian binary snapshot format.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotFormat;

impl MeshReader for SnapshotFormat {
    fn read<R: Read>(&self, reader: R) -> Result<MeshSnapshot, MeshError> {
        read_snapshot(reader)
    }
}

impl MeshWriter for SnapshotFormat {
    fn write<W: Write>(&self, writer: W, snapshot: &MeshSnapshot) -> Result<(), MeshError> {
        write_snapshot(writer, snapshot)
    }
}
