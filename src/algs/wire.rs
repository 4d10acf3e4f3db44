//! Fixed, versioned, little-endian wire records for snapshots and halo buffers.
//!
//! All multi-byte integers in these structs are **little-endian** on the wire.
//! They are stored pre-LE with `.to_le()` and decoded with `.from_le()`;
//! floating-point values travel as their IEEE-754 bit patterns.

use crate::mesh_error::MeshError;
use bytemuck::{Pod, Zeroable};
use bytes::{Buf, BufMut};
use static_assertions::{assert_eq_align, assert_eq_size};

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

/// Leading bytes of every encoded buffer.
pub const WIRE_MAGIC: [u8; 4] = *b"ZMSH";

/// Payload kinds carried after a [`WireHdr`].
pub const KIND_SNAPSHOT: u16 = 1;
pub const KIND_GHOST_GEOMETRY: u16 = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireHdr {
    pub magic: [u8; 4],
    pub version_le: u16, // = WIRE_VERSION.to_le()
    pub kind_le: u16,
}

impl WireHdr {
    pub fn new(kind: u16) -> Self {
        Self {
            magic: WIRE_MAGIC,
            version_le: WIRE_VERSION.to_le(),
            kind_le: kind.to_le(),
        }
    }
    pub fn kind(&self) -> u16 {
        u16::from_le(self.kind_le)
    }
    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }

    /// Check magic, version and kind.
    pub fn validate(&self, kind: u16) -> Result<(), MeshError> {
        if self.magic != WIRE_MAGIC {
            return Err(MeshError::MeshIoParse(format!(
                "bad magic {:?}",
                self.magic
            )));
        }
        if self.version() != WIRE_VERSION {
            return Err(MeshError::MeshIoParse(format!(
                "unsupported wire version {} (expected {WIRE_VERSION})",
                self.version()
            )));
        }
        if self.kind() != kind {
            return Err(MeshError::MeshIoParse(format!(
                "payload kind {} where {kind} was expected",
                self.kind()
            )));
        }
        Ok(())
    }
}

/// One interface of a zone: who is across, and under which global id.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireInterface {
    pub global_id_le: u64,
    pub neighbor_cell_le: u64,
    pub neighbor_zone_le: u32,
    pub _pad: u32, // explicit, keeps 8-byte alignment
}

impl WireInterface {
    pub const SIZE: usize = 24;

    pub fn new(global_id: u64, neighbor_zone: u32, neighbor_cell: u64) -> Self {
        Self {
            global_id_le: global_id.to_le(),
            neighbor_cell_le: neighbor_cell.to_le(),
            neighbor_zone_le: neighbor_zone.to_le(),
            _pad: 0,
        }
    }
    /// `(global_id, neighbor_zone, neighbor_cell)`
    pub fn decode(&self) -> (u64, u32, u64) {
        (
            u64::from_le(self.global_id_le),
            u32::from_le(self.neighbor_zone_le),
            u64::from_le(self.neighbor_cell_le),
        )
    }
}

/// Center and volume of a cell, as shipped to the neighbor's ghost slot.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireCellGeometry {
    pub center_le: [u64; 3],
    pub volume_le: u64,
}

impl WireCellGeometry {
    pub const SIZE: usize = 32;

    pub fn new(center: [f64; 3], volume: f64) -> Self {
        Self {
            center_le: center.map(|c| c.to_bits().to_le()),
            volume_le: volume.to_bits().to_le(),
        }
    }
    pub fn center(&self) -> [f64; 3] {
        self.center_le.map(|c| f64::from_bits(u64::from_le(c)))
    }
    pub fn volume(&self) -> f64 {
        f64::from_bits(u64::from_le(self.volume_le))
    }
}

// ===== Compile-time sanity checks =========================================

assert_eq_size!(WireHdr, [u8; 8]);
assert_eq_size!(WireInterface, [u8; WireInterface::SIZE]);
assert_eq_size!(WireCellGeometry, [u8; WireCellGeometry::SIZE]);
assert_eq_align!(WireInterface, u64);

// ===== Buffer helpers ======================================================

pub fn put_header<B: BufMut>(buf: &mut B, kind: u16) {
    buf.put_slice(bytemuck::bytes_of(&WireHdr::new(kind)));
}

pub fn get_header<B: Buf>(buf: &mut B, kind: u16) -> Result<WireHdr, MeshError> {
    let hdr: WireHdr = get_pod(buf, "header")?;
    hdr.validate(kind)?;
    Ok(hdr)
}

/// Write a `u64` count followed by the raw records.
pub fn put_records<T: Pod, B: BufMut>(buf: &mut B, records: &[T]) {
    buf.put_u64_le(records.len() as u64);
    buf.put_slice(bytemuck::cast_slice(records));
}

/// Read records written by [`put_records`].
pub fn get_records<T: Pod, B: Buf>(buf: &mut B, what: &'static str) -> Result<Vec<T>, MeshError> {
    let n = get_len(buf, what)?;
    let size = std::mem::size_of::<T>();
    let bytes = n
        .checked_mul(size)
        .filter(|&b| b <= buf.remaining())
        .ok_or_else(|| truncated(what))?;
    let mut raw = vec![0u8; bytes];
    buf.copy_to_slice(&mut raw);
    Ok(raw
        .chunks_exact(size)
        .map(bytemuck::pod_read_unaligned::<T>)
        .collect())
}

pub fn get_pod<T: Pod, B: Buf>(buf: &mut B, what: &'static str) -> Result<T, MeshError> {
    let size = std::mem::size_of::<T>();
    if buf.remaining() < size {
        return Err(truncated(what));
    }
    let mut raw = vec![0u8; size];
    buf.copy_to_slice(&mut raw);
    Ok(bytemuck::pod_read_unaligned(&raw))
}

/// Read a `u64` length prefix as `usize`.
pub fn get_len<B: Buf>(buf: &mut B, what: &'static str) -> Result<usize, MeshError> {
    if buf.remaining() < 8 {
        return Err(truncated(what));
    }
    usize::try_from(buf.get_u64_le())
        .map_err(|_| MeshError::MeshIoParse(format!("{what}: length does not fit in usize")))
}

pub(crate) fn truncated(what: &str) -> MeshError {
    MeshError::MeshIoParse(format!("buffer truncated while reading {what}"))
}
