//! Binary mesh snapshot of one zone.
//!
//! Records follow in a fixed order: counts; node coordinates (x, y, z);
//! cell type codes; the volume BC tag; face type codes; per-face node counts;
//! the flattened face→node stream; left and right cells; the boundary face
//! count with per-boundary-face BC types and BC name ids; patch names; and
//! the interface block. Everything is little-endian and length-prefixed,
//! behind a [`WireHdr`](crate::algs::wire::WireHdr).
//!
//! Cells are stored signed: a negative left cell marks a face stored from
//! the wrong side. [`MeshSnapshot::normalize_orientation`] reverses such
//! faces and swaps their cells; writer and reader both apply it.

use crate::algs::wire::{
    KIND_SNAPSHOT, WireInterface, get_header, get_len, get_records, put_header, put_records,
    truncated,
};
use crate::mesh_error::MeshError;
use crate::overlap::InterfaceEntry;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::{Read, Write};

/// Raw persisted records of a zone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshSnapshot {
    pub node_count: usize,
    pub cell_count: usize,
    pub face_count: usize,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    /// [`CellType::code`](crate::topology::cell_type::CellType::code) per cell.
    pub cell_types: Vec<i32>,
    pub volume_bc: i32,
    pub face_types: Vec<i32>,
    pub face_node_counts: Vec<usize>,
    pub face_nodes: Vec<usize>,
    pub left_cells: Vec<i64>,
    pub right_cells: Vec<i64>,
    pub boundary_count: usize,
    /// [`BcType::code`](crate::data::bc::BcType::code) per boundary face.
    pub bc_types: Vec<i32>,
    pub bc_name_ids: Vec<usize>,
    pub patch_names: Vec<String>,
    pub interfaces: Vec<InterfaceEntry>,
}

impl MeshSnapshot {
    /// Check every array against the counts.
    pub fn validate(&self) -> Result<(), MeshError> {
        let stream_len = self
            .face_node_counts
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
            .ok_or_else(|| MeshError::MeshIoParse("face node counts overflow".into()))?;
        let checks: [(&'static str, usize, usize); 12] = [
            ("x", self.node_count, self.x.len()),
            ("y", self.node_count, self.y.len()),
            ("z", self.node_count, self.z.len()),
            ("cell types", self.cell_count, self.cell_types.len()),
            ("face types", self.face_count, self.face_types.len()),
            ("face node counts", self.face_count, self.face_node_counts.len()),
            (
                "face node stream",
                stream_len,
                self.face_nodes.len(),
            ),
            ("left cells", self.face_count, self.left_cells.len()),
            ("right cells", self.face_count, self.right_cells.len()),
            ("bc types", self.boundary_count, self.bc_types.len()),
            ("bc name ids", self.boundary_count, self.bc_name_ids.len()),
            (
                "boundary faces",
                self.boundary_count,
                self.boundary_count.min(self.face_count),
            ),
        ];
        for (what, expected, found) in checks {
            if expected != found {
                return Err(MeshError::LengthMismatch {
                    what,
                    expected,
                    found,
                });
            }
        }
        if let Some(&n) = self.face_nodes.iter().find(|&&n| n >= self.node_count) {
            return Err(MeshError::MeshIoParse(format!(
                "face node {n} outside a table of {} nodes",
                self.node_count
            )));
        }
        Ok(())
    }

    /// Rebuild per-face node lists from the counts and the flat stream.
    pub fn face_node_lists(&self) -> Result<Vec<Vec<usize>>, MeshError> {
        let mut out = Vec::with_capacity(self.face_node_counts.len());
        let mut pos: usize = 0;
        for &n in &self.face_node_counts {
            let nodes = pos
                .checked_add(n)
                .and_then(|end| self.face_nodes.get(pos..end))
                .ok_or_else(|| truncated("face node stream"))?;
            out.push(nodes.to_vec());
            pos += n;
        }
        Ok(out)
    }

    /// Reverse every face stored with a negative left cell and swap its cells.
    ///
    /// Returns the number of faces flipped.
    pub fn normalize_orientation(&mut self) -> Result<usize, MeshError> {
        self.validate()?;
        let mut flipped = 0;
        let mut pos = 0;
        for i in 0..self.face_count {
            let n = self.face_node_counts[i];
            if self.left_cells[i] < 0 {
                self.face_nodes[pos..pos + n].reverse();
                std::mem::swap(&mut self.left_cells[i], &mut self.right_cells[i]);
                flipped += 1;
            }
            pos += n;
        }
        if flipped > 0 {
            log::debug!("normalized orientation of {flipped} faces");
        }
        Ok(flipped)
    }
}

fn put_f64s(buf: &mut BytesMut, v: &[f64]) {
    buf.put_u64_le(v.len() as u64);
    v.iter().for_each(|&x| buf.put_f64_le(x));
}

fn put_i32s(buf: &mut BytesMut, v: &[i32]) {
    buf.put_u64_le(v.len() as u64);
    v.iter().for_each(|&x| buf.put_i32_le(x));
}

fn put_i64s(buf: &mut BytesMut, v: &[i64]) {
    buf.put_u64_le(v.len() as u64);
    v.iter().for_each(|&x| buf.put_i64_le(x));
}

fn put_usizes(buf: &mut BytesMut, v: &[usize]) {
    buf.put_u64_le(v.len() as u64);
    v.iter().for_each(|&x| buf.put_u64_le(x as u64));
}

/// Read a length prefix and make sure `elem` bytes per item are available.
fn get_array_len(buf: &mut Bytes, elem: usize, what: &'static str) -> Result<usize, MeshError> {
    let n = get_len(buf, what)?;
    match n.checked_mul(elem) {
        Some(bytes) if bytes <= buf.remaining() => Ok(n),
        _ => Err(truncated(what)),
    }
}

fn get_f64s(buf: &mut Bytes, what: &'static str) -> Result<Vec<f64>, MeshError> {
    let n = get_array_len(buf, 8, what)?;
    Ok((0..n).map(|_| buf.get_f64_le()).collect())
}

fn get_i32s(buf: &mut Bytes, what: &'static str) -> Result<Vec<i32>, MeshError> {
    let n = get_array_len(buf, 4, what)?;
    Ok((0..n).map(|_| buf.get_i32_le()).collect())
}

fn get_i64s(buf: &mut Bytes, what: &'static str) -> Result<Vec<i64>, MeshError> {
    let n = get_array_len(buf, 8, what)?;
    Ok((0..n).map(|_| buf.get_i64_le()).collect())
}

fn get_usizes(buf: &mut Bytes, what: &'static str) -> Result<Vec<usize>, MeshError> {
    let n = get_array_len(buf, 8, what)?;
    (0..n)
        .map(|_| {
            usize::try_from(buf.get_u64_le())
                .map_err(|_| MeshError::MeshIoParse(format!("{what}: value does not fit in usize")))
        })
        .collect()
}

fn get_i32(buf: &mut Bytes, what: &'static str) -> Result<i32, MeshError> {
    if buf.remaining() < 4 {
        return Err(truncated(what));
    }
    Ok(buf.get_i32_le())
}

/// Encode `snapshot` after normalizing a copy of it.
pub fn encode_snapshot(snapshot: &MeshSnapshot) -> Result<Bytes, MeshError> {
    let mut snap = snapshot.clone();
    snap.normalize_orientation()?;

    let mut buf = BytesMut::with_capacity(
        64 + 24 * snap.node_count + 8 * (snap.face_nodes.len() + 3 * snap.face_count),
    );
    put_header(&mut buf, KIND_SNAPSHOT);
    buf.put_u64_le(snap.node_count as u64);
    buf.put_u64_le(snap.cell_count as u64);
    buf.put_u64_le(snap.face_count as u64);
    put_f64s(&mut buf, &snap.x);
    put_f64s(&mut buf, &snap.y);
    put_f64s(&mut buf, &snap.z);
    put_i32s(&mut buf, &snap.cell_types);
    buf.put_i32_le(snap.volume_bc);
    put_i32s(&mut buf, &snap.face_types);
    put_usizes(&mut buf, &snap.face_node_counts);
    put_usizes(&mut buf, &snap.face_nodes);
    put_i64s(&mut buf, &snap.left_cells);
    put_i64s(&mut buf, &snap.right_cells);
    buf.put_u64_le(snap.boundary_count as u64);
    put_i32s(&mut buf, &snap.bc_types);
    put_usizes(&mut buf, &snap.bc_name_ids);
    buf.put_u64_le(snap.patch_names.len() as u64);
    for name in &snap.patch_names {
        buf.put_u64_le(name.len() as u64);
        buf.put_slice(name.as_bytes());
    }
    let records: Vec<WireInterface> = snap
        .interfaces
        .iter()
        .map(|e| WireInterface::new(e.global_id as u64, e.neighbor_zone as u32, e.neighbor_cell as u64))
        .collect();
    put_records(&mut buf, &records);
    Ok(buf.freeze())
}

/// Decode and normalize a snapshot produced by [`encode_snapshot`].
pub fn decode_snapshot(mut buf: Bytes) -> Result<MeshSnapshot, MeshError> {
    get_header(&mut buf, KIND_SNAPSHOT)?;
    let mut snap = MeshSnapshot {
        node_count: get_len(&mut buf, "node count")?,
        cell_count: get_len(&mut buf, "cell count")?,
        face_count: get_len(&mut buf, "face count")?,
        ..MeshSnapshot::default()
    };
    snap.x = get_f64s(&mut buf, "x")?;
    snap.y = get_f64s(&mut buf, "y")?;
    snap.z = get_f64s(&mut buf, "z")?;
    snap.cell_types = get_i32s(&mut buf, "cell types")?;
    snap.volume_bc = get_i32(&mut buf, "volume bc")?;
    snap.face_types = get_i32s(&mut buf, "face types")?;
    snap.face_node_counts = get_usizes(&mut buf, "face node counts")?;
    snap.face_nodes = get_usizes(&mut buf, "face node stream")?;
    snap.left_cells = get_i64s(&mut buf, "left cells")?;
    snap.right_cells = get_i64s(&mut buf, "right cells")?;
    snap.boundary_count = get_len(&mut buf, "boundary count")?;
    snap.bc_types = get_i32s(&mut buf, "bc types")?;
    snap.bc_name_ids = get_usizes(&mut buf, "bc name ids")?;
    let names = get_array_len(&mut buf, 8, "patch names")?;
    for _ in 0..names {
        let len = get_array_len(&mut buf, 1, "patch name")?;
        let raw = buf.split_to(len);
        let name = String::from_utf8(raw.to_vec())
            .map_err(|e| MeshError::MeshIoParse(format!("patch name: {e}")))?;
        snap.patch_names.push(name);
    }
    let records: Vec<WireInterface> = get_records(&mut buf, "interfaces")?;
    snap.interfaces = records
        .iter()
        .map(|r| {
            let (global_id, neighbor_zone, neighbor_cell) = r.decode();
            InterfaceEntry {
                global_id: global_id as usize,
                neighbor_zone: neighbor_zone as usize,
                neighbor_cell: neighbor_cell as usize,
            }
        })
        .collect();
    if buf.has_remaining() {
        return Err(MeshError::MeshIoParse(format!(
            "{} trailing bytes after snapshot",
            buf.remaining()
        )));
    }
    snap.normalize_orientation()?;
    Ok(snap)
}

pub fn write_snapshot<W: Write>(mut writer: W, snapshot: &MeshSnapshot) -> Result<(), MeshError> {
    let bytes = encode_snapshot(snapshot)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

pub fn read_snapshot<R: Read>(mut reader: R) -> Result<MeshSnapshot, MeshError> {
    let mut raw = Vec::new();
    reader.read_to_end(&mut raw)?;
    decode_snapshot(Bytes::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One segment cell stored with its left end face flipped.
    fn flipped_segment() -> MeshSnapshot {
        MeshSnapshot {
            node_count: 2,
            cell_count: 1,
            face_count: 2,
            x: vec![0.0, 1.0],
            y: vec![0.0; 2],
            z: vec![0.0; 2],
            cell_types: vec![3],
            volume_bc: 0,
            face_types: vec![2, 2],
            face_node_counts: vec![1, 1],
            face_nodes: vec![0, 1],
            left_cells: vec![-1, 0],
            right_cells: vec![0, 2],
            boundary_count: 2,
            bc_types: vec![2, 2],
            bc_name_ids: vec![0, 0],
            patch_names: vec!["wall".into()],
            interfaces: vec![],
        }
    }

    #[test]
    fn normalization_swaps_cells() {
        let mut s = flipped_segment();
        assert_eq!(s.normalize_orientation(), Ok(1));
        assert_eq!((s.left_cells[0], s.right_cells[0]), (0, -1));
        assert_eq!(s.normalize_orientation(), Ok(0));
    }

    #[test]
    fn normalization_reverses_face_nodes() {
        let mut s = flipped_segment();
        s.face_node_counts = vec![2, 0];
        s.face_nodes = vec![0, 1];
        s.normalize_orientation().unwrap();
        assert_eq!(s.face_node_lists().unwrap(), vec![vec![1, 0], vec![]]);
    }

    #[test]
    fn encode_decode_normalizes_once() {
        let s = flipped_segment();
        let back = decode_snapshot(encode_snapshot(&s).unwrap()).unwrap();
        let mut expected = s.clone();
        expected.normalize_orientation().unwrap();
        assert_eq!(back, expected);
    }

    #[test]
    fn oversized_face_node_count_is_a_parse_error() {
        let mut s = flipped_segment();
        s.face_node_counts[0] = usize::MAX;
        assert!(matches!(s.validate(), Err(MeshError::MeshIoParse(_))));
        assert!(matches!(s.normalize_orientation(), Err(MeshError::MeshIoParse(_))));
    }

    #[test]
    fn length_mismatch_is_reported() {
        let mut s = flipped_segment();
        s.bc_name_ids.pop();
        assert!(matches!(
            encode_snapshot(&s),
            Err(MeshError::LengthMismatch { what: "bc name ids", .. })
        ));
    }

    #[test]
    fn truncated_bytes_fail_cleanly() {
        let bytes = encode_snapshot(&flipped_segment()).unwrap();
        for cut in [0, 7, 20, bytes.len() - 1] {
            assert!(decode_snapshot(bytes.slice(..cut)).is_err());
        }
    }
}
