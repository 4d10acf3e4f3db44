//! Structured box generator producing unstructured zone input.
//!
//! Nodes are numbered `i + j*ni + k*ni*nj` for node counts `[ni, nj, nk]`.
//! A box with `nj == nk == 1` yields segments, `nk == 1` quadrilaterals
//! (counter-clockwise), anything else hexahedra with nodes
//! `(i,j,k), (i+1,j,k), (i+1,j+1,k), (i,j+1,k)` followed by the same at `k+1`.
//!
//! Boundary patches are described by [`IjkRegion`]s: inclusive, 0-based node
//! index ranges that must describe a plane of the block.

use crate::data::bc::{BcType, BoundaryPatch, PatchSet};
use crate::data::geometry::GeometryStore;
use crate::mesh_error::MeshError;
use crate::topology::NodeId;
use crate::topology::cell_type::CellType;

/// Inclusive node-index box `[ist, ied] x [jst, jed] x [kst, ked]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IjkRegion {
    pub ist: usize,
    pub ied: usize,
    pub jst: usize,
    pub jed: usize,
    pub kst: usize,
    pub ked: usize,
}

impl IjkRegion {
    pub fn new(i: [usize; 2], j: [usize; 2], k: [usize; 2]) -> Self {
        Self {
            ist: i[0],
            ied: i[1],
            jst: j[0],
            jed: j[1],
            kst: k[0],
            ked: k[1],
        }
    }

    fn invalid(&self, reason: &'static str) -> MeshError {
        MeshError::InvalidRegion {
            ist: self.ist,
            ied: self.ied,
            jst: self.jst,
            jed: self.jed,
            kst: self.kst,
            ked: self.ked,
            reason,
        }
    }

    /// Check the region against a block of `dims` nodes.
    pub fn validate(&self, dims: [usize; 3]) -> Result<(), MeshError> {
        if self.ist > self.ied || self.jst > self.jed || self.kst > self.ked {
            return Err(self.invalid("has a start past its end"));
        }
        if self.ied >= dims[0] || self.jed >= dims[1] || self.ked >= dims[2] {
            return Err(self.invalid("exceeds the block"));
        }
        if self.ist != self.ied && self.jst != self.jed && self.kst != self.ked {
            return Err(self.invalid("is not a plane"));
        }
        Ok(())
    }
}

/// Side of a structured block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxSide {
    IMin,
    IMax,
    JMin,
    JMax,
    KMin,
    KMax,
}

impl BoxSide {
    pub fn name(self) -> &'static str {
        match self {
            BoxSide::IMin => "imin",
            BoxSide::IMax => "imax",
            BoxSide::JMin => "jmin",
            BoxSide::JMax => "jmax",
            BoxSide::KMin => "kmin",
            BoxSide::KMax => "kmax",
        }
    }
}

/// A generated block: its node counts and unstructured geometry.
#[derive(Clone, Debug)]
pub struct StructuredBox {
    dims: [usize; 3],
    geometry: GeometryStore,
}

impl StructuredBox {
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn dimension(&self) -> usize {
        self.dims.iter().filter(|&&n| n > 1).count()
    }

    pub fn geometry(&self) -> &GeometryStore {
        &self.geometry
    }

    pub fn into_geometry(self) -> GeometryStore {
        self.geometry
    }

    #[inline]
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> NodeId {
        i + j * self.dims[0] + k * self.dims[0] * self.dims[1]
    }

    /// Node ids inside `region`.
    pub fn region_nodes(&self, region: &IjkRegion) -> Result<Vec<NodeId>, MeshError> {
        region.validate(self.dims)?;
        let mut nodes = Vec::new();
        for k in region.kst..=region.ked {
            for j in region.jst..=region.jed {
                for i in region.ist..=region.ied {
                    nodes.push(self.node_index(i, j, k));
                }
            }
        }
        Ok(nodes)
    }

    /// The full node plane of a block side.
    pub fn side(&self, side: BoxSide) -> IjkRegion {
        let [ni, nj, nk] = self.dims.map(|n| n.saturating_sub(1));
        match side {
            BoxSide::IMin => IjkRegion::new([0, 0], [0, nj], [0, nk]),
            BoxSide::IMax => IjkRegion::new([ni, ni], [0, nj], [0, nk]),
            BoxSide::JMin => IjkRegion::new([0, ni], [0, 0], [0, nk]),
            BoxSide::JMax => IjkRegion::new([0, ni], [nj, nj], [0, nk]),
            BoxSide::KMin => IjkRegion::new([0, ni], [0, nj], [0, 0]),
            BoxSide::KMax => IjkRegion::new([0, ni], [0, nj], [nk, nk]),
        }
    }

    /// Sides that bound cells: two per active direction.
    pub fn sides(&self) -> Vec<BoxSide> {
        let all = [
            [BoxSide::IMin, BoxSide::IMax],
            [BoxSide::JMin, BoxSide::JMax],
            [BoxSide::KMin, BoxSide::KMax],
        ];
        all[..self.dimension()].iter().flatten().copied().collect()
    }

    pub fn patch(
        &self,
        name: impl Into<String>,
        bc_type: BcType,
        region: &IjkRegion,
    ) -> Result<BoundaryPatch, MeshError> {
        Ok(BoundaryPatch::new(name, bc_type, self.region_nodes(region)?))
    }

    /// One patch per side, named after the side, all with `bc_type`.
    pub fn side_patches(&self, bc_type: BcType) -> Result<PatchSet, MeshError> {
        self.sides()
            .into_iter()
            .map(|s| self.patch(s.name(), bc_type, &self.side(s)))
            .collect()
    }
}

/// Generate a box of `dims` nodes spanning `extents = [min, max]`.
///
/// # Errors
/// [`MeshError::InvalidGeometry`] if fewer than two nodes lie along `i`,
/// directions are skipped (`nj == 1 < nk`), or an active extent is empty.
pub fn structured_box(dims: [usize; 3], extents: [[f64; 3]; 2]) -> Result<StructuredBox, MeshError> {
    let [ni, nj, nk] = dims;
    if ni < 2 || nj == 0 || nk == 0 || (nj == 1 && nk > 1) {
        return Err(MeshError::InvalidGeometry(format!(
            "structured box needs ni >= 2 and nested directions, got {dims:?}"
        )));
    }
    let [lo, hi] = extents;
    for d in 0..3 {
        if dims[d] > 1 && !(hi[d] > lo[d]) {
            return Err(MeshError::InvalidGeometry(format!(
                "empty extent along axis {d}: [{}, {}]",
                lo[d], hi[d]
            )));
        }
    }
    let step = |d: usize| {
        if dims[d] > 1 {
            (hi[d] - lo[d]) / (dims[d] - 1) as f64
        } else {
            0.0
        }
    };
    let h = [step(0), step(1), step(2)];

    let ncells = (ni - 1) * nj.saturating_sub(1).max(1) * nk.saturating_sub(1).max(1);
    let mut out = StructuredBox {
        dims,
        geometry: GeometryStore::with_capacity(ni * nj * nk, ncells),
    };
    for k in 0..nk {
        for j in 0..nj {
            for i in 0..ni {
                out.geometry.push_node([
                    lo[0] + i as f64 * h[0],
                    lo[1] + j as f64 * h[1],
                    lo[2] + k as f64 * h[2],
                ]);
            }
        }
    }

    let n = |i, j, k| i + j * ni + k * ni * nj;
    match out.dimension() {
        1 => {
            for i in 0..ni - 1 {
                out.geometry.push_element(CellType::Segment, vec![i, i + 1])?;
            }
        }
        2 => {
            for j in 0..nj - 1 {
                for i in 0..ni - 1 {
                    out.geometry.push_element(
                        CellType::Quadrilateral,
                        vec![n(i, j, 0), n(i + 1, j, 0), n(i + 1, j + 1, 0), n(i, j + 1, 0)],
                    )?;
                }
            }
        }
        _ => {
            for k in 0..nk - 1 {
                for j in 0..nj - 1 {
                    for i in 0..ni - 1 {
                        out.geometry.push_element(
                            CellType::Hexahedron,
                            vec![
                                n(i, j, k),
                                n(i + 1, j, k),
                                n(i + 1, j + 1, k),
                                n(i, j + 1, k),
                                n(i, j, k + 1),
                                n(i + 1, j, k + 1),
                                n(i + 1, j + 1, k + 1),
                                n(i, j + 1, k + 1),
                            ],
                        )?;
                    }
                }
            }
        }
    }
    log::debug!(
        "structured box {dims:?}: {} nodes, {} cells",
        out.geometry.node_count(),
        out.geometry.cell_count()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: [[f64; 3]; 2] = [[0.0; 3], [1.0; 3]];

    #[test]
    fn cell_counts_per_dimension() {
        assert_eq!(structured_box([5, 1, 1], UNIT).unwrap().geometry().cell_count(), 4);
        assert_eq!(structured_box([3, 4, 1], UNIT).unwrap().geometry().cell_count(), 6);
        assert_eq!(structured_box([3, 3, 3], UNIT).unwrap().geometry().cell_count(), 8);
        assert!(structured_box([1, 3, 3], UNIT).is_err());
        assert!(structured_box([3, 1, 3], UNIT).is_err());
    }

    #[test]
    fn region_must_be_a_plane_inside_the_block() {
        let b = structured_box([3, 3, 3], UNIT).unwrap();
        let nodes = b.region_nodes(&b.side(BoxSide::KMax)).unwrap();
        assert_eq!(nodes.len(), 9);
        assert!(nodes.iter().all(|&n| n >= 18));

        let volume = IjkRegion::new([0, 1], [0, 1], [0, 1]);
        assert!(matches!(
            b.region_nodes(&volume),
            Err(MeshError::InvalidRegion { reason: "is not a plane", .. })
        ));
        let outside = IjkRegion::new([0, 3], [0, 0], [0, 2]);
        assert!(matches!(
            b.region_nodes(&outside),
            Err(MeshError::InvalidRegion { ied: 3, .. })
        ));
    }

    #[test]
    fn sides_follow_dimension() {
        let b = structured_box([4, 3, 1], UNIT).unwrap();
        assert_eq!(b.sides().len(), 4);
        assert_eq!(b.side_patches(BcType::Wall).unwrap().len(), 4);
    }
}
