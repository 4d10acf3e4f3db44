//! Per-partition context object.
//!
//! A [`Zone`] owns everything one partition needs: its node table, the
//! classified face topology, the interface registry and, once computed, the
//! metrics with ghost geometry. Solver-facing code receives a `&Zone`; there
//! are no process-wide zone tables.
//!
//! # Example
//! ```rust
//! # fn try_main() -> Result<(), zone_mesh::mesh_error::MeshError> {
//! use zone_mesh::prelude::*;
//!
//! let block = structured_box([3, 3, 1], [[0.0; 3], [1.0; 3]])?;
//! let patches = block.side_patches(BcType::Wall)?;
//! let mut zone = Zone::build(0, block.geometry(), &patches, &ZoneBuildOptions::default())?;
//! zone.compute_geometry()?;
//! assert_eq!(zone.ghost_range(), 4..12);
//! # Ok(())
//! # }
//! # try_main().unwrap();
//! ```

use crate::algs::boundary::{ClassifiedTopology, PatchOverlapHandling, classify_boundary};
use crate::algs::face_link::{FaceLink, FaceSearch, resolve_face_links};
use crate::data::bc::{BcType, PatchSet};
use crate::data::geometry::GeometryStore;
use crate::debug_invariants::DebugInvariants;
use crate::geometry::ghost::{DEGENERATE_AREA, GhostReport, synthesize_ghosts};
use crate::geometry::metrics::{MeshMetrics, compute_metrics};
use crate::io::snapshot::MeshSnapshot;
use crate::mesh_error::MeshError;
use crate::overlap::interface::{InterfaceEntry, InterfaceRegistry, resolve_reciprocal_all};
use crate::topology::adjacency::{cell_to_cell, interface_to_boundary_face};
use crate::topology::builder::build_face_topology;
use crate::topology::cell_type::CellType;
use crate::topology::face::Face;
use crate::topology::{CellId, FaceId, GlobalId, ZoneId};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Options for building a zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneBuildOptions {
    pub patch_overlap: PatchOverlapHandling,
    /// Face area at or below which ghost synthesis uses point reflection.
    pub degenerate_area: f64,
}

impl Default for ZoneBuildOptions {
    fn default() -> Self {
        Self {
            patch_overlap: PatchOverlapHandling::default(),
            degenerate_area: DEGENERATE_AREA,
        }
    }
}

/// One partition of the mesh.
#[derive(Clone, Debug)]
pub struct Zone {
    id: ZoneId,
    nodes: Vec<[f64; 3]>,
    cell_types: Vec<CellType>,
    volume_tag: i32,
    topology: ClassifiedTopology,
    interfaces: InterfaceRegistry,
    metrics: Option<MeshMetrics>,
    ghost_report: Option<GhostReport>,
    global_face_ids: Option<Vec<GlobalId>>,
    options: ZoneBuildOptions,
}

impl Zone {
    /// Build faces and classify boundaries of a zone.
    pub fn build(
        id: ZoneId,
        geometry: &GeometryStore,
        patches: &PatchSet,
        options: &ZoneBuildOptions,
    ) -> Result<Self, MeshError> {
        let faces = build_face_topology(geometry)?;
        let topology = classify_boundary(faces, patches, options.patch_overlap)?;
        log::info!(
            "zone {id}: {} cells, {} faces ({} boundary)",
            topology.cell_count(),
            topology.face_count(),
            topology.boundary_count()
        );
        Ok(Self::from_parts(
            id,
            geometry.nodes().to_vec(),
            geometry.cell_types(),
            topology,
            InterfaceRegistry::new(id),
            *options,
        ))
    }

    pub(crate) fn from_parts(
        id: ZoneId,
        nodes: Vec<[f64; 3]>,
        cell_types: Vec<CellType>,
        topology: ClassifiedTopology,
        interfaces: InterfaceRegistry,
        options: ZoneBuildOptions,
    ) -> Self {
        topology.debug_assert_invariants();
        interfaces.debug_assert_invariants();
        Self {
            id,
            nodes,
            cell_types,
            volume_tag: 0,
            topology,
            interfaces,
            metrics: None,
            ghost_report: None,
            global_face_ids: None,
            options,
        }
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn nodes(&self) -> &[[f64; 3]] {
        &self.nodes
    }

    pub fn cell_types(&self) -> &[CellType] {
        &self.cell_types
    }

    pub fn volume_tag(&self) -> i32 {
        self.volume_tag
    }

    pub fn set_volume_tag(&mut self, tag: i32) {
        self.volume_tag = tag;
    }

    pub fn topology(&self) -> &ClassifiedTopology {
        &self.topology
    }

    /// Finalized face list: boundary prefix, then interior faces.
    pub fn faces(&self) -> &[Face] {
        self.topology.faces()
    }

    pub fn cell_count(&self) -> usize {
        self.topology.cell_count()
    }

    pub fn boundary_count(&self) -> usize {
        self.topology.boundary_count()
    }

    pub fn ghost_range(&self) -> Range<CellId> {
        self.topology.ghost_range()
    }

    pub fn interfaces(&self) -> &InterfaceRegistry {
        &self.interfaces
    }

    pub fn interfaces_mut(&mut self) -> &mut InterfaceRegistry {
        &mut self.interfaces
    }

    pub fn metrics(&self) -> Option<&MeshMetrics> {
        self.metrics.as_ref()
    }

    pub fn ghost_report(&self) -> Option<&GhostReport> {
        self.ghost_report.as_ref()
    }

    /// Ids of the faces in the mesh this zone was split from.
    pub fn global_face_ids(&self) -> Option<&[GlobalId]> {
        self.global_face_ids.as_deref()
    }

    pub(crate) fn set_global_face_ids(&mut self, ids: Vec<GlobalId>) {
        self.global_face_ids = Some(ids);
    }

    pub fn options(&self) -> &ZoneBuildOptions {
        &self.options
    }

    /// Boundary-face index of every local interface.
    pub fn interface_to_boundary_face(&self) -> Vec<FaceId> {
        interface_to_boundary_face(self.faces(), self.boundary_count())
    }

    /// Neighbor lists of every real cell, interface ghosts included.
    pub fn cell_to_cell(&self) -> Vec<Vec<CellId>> {
        cell_to_cell(self.faces(), self.cell_count(), self.boundary_count())
    }

    /// Compute face/cell metrics and synthesize ghost geometry.
    pub fn compute_geometry(&mut self) -> Result<&GhostReport, MeshError> {
        let threshold = self.options.degenerate_area;
        let mut metrics = compute_metrics(&self.nodes, &self.topology, threshold)?;
        let report = synthesize_ghosts(&self.topology, &mut metrics, threshold);
        self.metrics = Some(metrics);
        Ok(&*self.ghost_report.insert(report))
    }

    /// Overwrite the ghost geometry of boundary face `face`.
    pub fn set_ghost_geometry(
        &mut self,
        face: FaceId,
        center: [f64; 3],
        volume: f64,
    ) -> Result<(), MeshError> {
        let ghost = self.topology.ghost_of(face).ok_or_else(|| {
            MeshError::InvalidGeometry(format!(
                "zone {}: face {face} is not a boundary face",
                self.id
            ))
        })?;
        let metrics = self.metrics.as_mut().ok_or_else(|| {
            MeshError::InvalidGeometry(format!("zone {}: geometry not computed", self.id))
        })?;
        metrics.cell_centers[ghost] = center;
        metrics.cell_volumes[ghost] = volume;
        Ok(())
    }

    /// Expand non-conforming interfaces and relink the registry in place.
    ///
    /// The new interface numbering is registered into `relinked`. Metrics
    /// and global face ids are dropped because face ids change. Returns the
    /// child count of every original interface.
    pub fn apply_face_links<S: FaceSearch + ?Sized>(
        &mut self,
        link: &FaceLink,
        search: &S,
        relinked: &mut FaceLink,
    ) -> Result<Vec<usize>, MeshError> {
        if self.interfaces.len() != self.topology.interface_count() {
            return Err(MeshError::LengthMismatch {
                what: "registered interfaces",
                expected: self.topology.interface_count(),
                found: self.interfaces.len(),
            });
        }
        let linked = resolve_face_links(self.id, &self.topology, &self.nodes, link, search)?;
        let mut entries = Vec::with_capacity(linked.local_to_global.len());
        for (&global_id, origin) in linked.local_to_global.iter().zip(&linked.origins) {
            let parent = self.interfaces.entry(origin.parent).ok_or_else(|| {
                MeshError::UnregisteredInterface {
                    zone: self.id,
                    global_id,
                }
            })?;
            entries.push(InterfaceEntry {
                global_id,
                neighbor_zone: parent.neighbor_zone,
                neighbor_cell: origin.child_neighbor_cell.unwrap_or(parent.neighbor_cell),
            });
        }
        self.interfaces.reset_interfaces(entries)?;
        linked.register_into(self.id, relinked)?;

        self.nodes = linked.nodes;
        self.topology = linked.topology;
        self.metrics = None;
        self.ghost_report = None;
        self.global_face_ids = None;
        Ok(linked.child_counts)
    }

    /// Raw persisted records of this zone.
    pub fn to_snapshot(&self) -> MeshSnapshot {
        let faces = self.faces();
        MeshSnapshot {
            node_count: self.nodes.len(),
            cell_count: self.cell_count(),
            face_count: faces.len(),
            x: self.nodes.iter().map(|p| p[0]).collect(),
            y: self.nodes.iter().map(|p| p[1]).collect(),
            z: self.nodes.iter().map(|p| p[2]).collect(),
            cell_types: self.cell_types.iter().map(|c| c.code()).collect(),
            volume_bc: self.volume_tag,
            face_types: faces.iter().map(|f| f.face_type.code()).collect(),
            face_node_counts: faces.iter().map(|f| f.nodes.len()).collect(),
            face_nodes: faces.iter().flat_map(|f| f.nodes.iter().copied()).collect(),
            left_cells: faces.iter().map(|f| f.left as i64).collect(),
            right_cells: faces
                .iter()
                .map(|f| f.right.map_or(-1, |r| r as i64))
                .collect(),
            boundary_count: self.boundary_count(),
            bc_types: self.topology.bc_types().iter().map(|b| b.code()).collect(),
            bc_name_ids: self.topology.bc_name_ids().to_vec(),
            patch_names: self.topology.patch_names().to_vec(),
            interfaces: self.interfaces.entries().to_vec(),
        }
    }

    /// Rebuild a zone from persisted records.
    ///
    /// Ghost ids are reassigned and interfaces re-registered. Local face
    /// positions are not persisted and read back as 0.
    pub fn from_snapshot(
        id: ZoneId,
        snapshot: &MeshSnapshot,
        options: &ZoneBuildOptions,
    ) -> Result<Self, MeshError> {
        let mut snap = snapshot.clone();
        snap.normalize_orientation()?;

        let cell_types = snap
            .cell_types
            .iter()
            .map(|&c| {
                CellType::from_code(c)
                    .ok_or_else(|| MeshError::MeshIoParse(format!("unknown cell type code {c}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let node_lists = snap.face_node_lists()?;

        let mut faces = Vec::with_capacity(snap.face_count);
        for (i, nodes) in node_lists.into_iter().enumerate() {
            let face_type = CellType::from_code(snap.face_types[i]).ok_or_else(|| {
                MeshError::MeshIoParse(format!("face {i}: unknown face type code {}", snap.face_types[i]))
            })?;
            let left = usize::try_from(snap.left_cells[i]).map_err(|_| {
                MeshError::MeshIoParse(format!("face {i} has no left cell"))
            })?;
            let boundary = i < snap.boundary_count;
            let bc = if boundary {
                let code = snap.bc_types[i];
                BcType::from_code(code)
                    .ok_or_else(|| MeshError::MeshIoParse(format!("face {i}: unknown bc code {code}")))?
            } else {
                BcType::Interior
            };
            let right = if boundary {
                None
            } else {
                usize::try_from(snap.right_cells[i]).ok()
            };
            faces.push(Face {
                nodes,
                left,
                right,
                left_pos: 0,
                right_pos: (!boundary).then_some(0),
                face_type,
                bc,
            });
        }

        let topology = ClassifiedTopology::from_parts(
            snap.cell_count,
            faces,
            snap.boundary_count,
            snap.bc_name_ids.clone(),
            snap.patch_names.clone(),
        )?;
        let interfaces = InterfaceRegistry::from_entries(id, snap.interfaces.iter().copied())?;
        let nodes = (0..snap.node_count)
            .map(|n| [snap.x[n], snap.y[n], snap.z[n]])
            .collect();
        let mut zone = Self::from_parts(id, nodes, cell_types, topology, interfaces, *options);
        zone.volume_tag = snap.volume_bc;
        Ok(zone)
    }
}

/// Group every registry and resolve all reciprocal receive orders.
///
/// This is the synchronisation point after which halo buffers can be
/// exchanged.
pub fn synchronize_interfaces(zones: &mut [Zone]) -> Result<(), MeshError> {
    let mut registries: Vec<InterfaceRegistry> = zones
        .iter_mut()
        .map(|z| {
            z.interfaces.group_by_neighbor();
            std::mem::take(&mut z.interfaces)
        })
        .collect();
    let result = resolve_reciprocal_all(&mut registries);
    for (zone, registry) in zones.iter_mut().zip(registries) {
        zone.interfaces = registry;
    }
    result
}

/// Expand non-conforming interfaces of every zone; returns the new link.
pub fn relink_zones<S: FaceSearch + ?Sized>(
    zones: &mut [Zone],
    link: &FaceLink,
    search: &S,
) -> Result<FaceLink, MeshError> {
    let mut relinked = FaceLink::new();
    for zone in zones.iter_mut() {
        zone.apply_face_links(link, search, &mut relinked)?;
    }
    Ok(relinked)
}

/// Build independent zones one after another.
pub fn build_zones(
    inputs: &[(ZoneId, GeometryStore, PatchSet)],
    options: &ZoneBuildOptions,
) -> Result<Vec<Zone>, MeshError> {
    inputs
        .iter()
        .map(|(id, geo, patches)| Zone::build(*id, geo, patches, options))
        .collect()
}

/// Build independent zones in parallel.
#[cfg(feature = "rayon")]
pub fn build_zones_par(
    inputs: &[(ZoneId, GeometryStore, PatchSet)],
    options: &ZoneBuildOptions,
) -> Result<Vec<Zone>, MeshError> {
    use rayon::prelude::*;
    inputs
        .par_iter()
        .map(|(id, geo, patches)| Zone::build(*id, geo, patches, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algs::meshgen::structured_box;

    #[test]
    fn options_default_and_serde() {
        let opts = ZoneBuildOptions::default();
        assert_eq!(opts.patch_overlap, PatchOverlapHandling::Warn);
        assert_eq!(opts.degenerate_area, DEGENERATE_AREA);
        let json = serde_json::to_string(&opts).unwrap();
        let back: ZoneBuildOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, opts);
        let partial: ZoneBuildOptions = serde_json::from_str(r#"{"patch_overlap":"Error"}"#).unwrap();
        assert_eq!(partial.patch_overlap, PatchOverlapHandling::Error);
        assert_eq!(partial.degenerate_area, DEGENERATE_AREA);
    }

    #[test]
    fn ghosts_require_geometry() {
        let block = structured_box([3, 1, 1], [[0.0; 3], [1.0; 3]]).unwrap();
        let patches = block.side_patches(BcType::Wall).unwrap();
        let mut zone = Zone::build(0, block.geometry(), &patches, &ZoneBuildOptions::default()).unwrap();
        assert!(zone.set_ghost_geometry(0, [0.0; 3], 1.0).is_err());
        zone.compute_geometry().unwrap();
        zone.set_ghost_geometry(0, [9.0; 3], 2.0).unwrap();
        let m = zone.metrics().unwrap();
        assert_eq!(m.cell_centers[2], [9.0; 3]);
        assert!(zone.set_ghost_geometry(2, [0.0; 3], 1.0).is_err());
    }
}
