//! Linking interface faces across zones, including non-conforming seams.
//!
//! A [`FaceLink`] records, for every zone, the global id of each local
//! interface (in boundary-face order) and, for every global id, the (at most
//! two) zones that share it. A [`FaceSearch`] collaborator reports, per
//! global interface id, the child faces that cover it on the other side.
//!
//! [`resolve_face_links`] rewrites one zone: each interface face with
//! children is replaced by one face per child, all owned by the original
//! cell and inheriting its boundary condition; faces without children and
//! all other faces are kept. Ghost ids of the new boundary prefix are
//! reassigned densely.

use crate::algs::boundary::ClassifiedTopology;
use crate::data::bc::BcType;
use crate::mesh_error::MeshError;
use crate::topology::cell_type::CellType;
use crate::topology::face::Face;
use crate::topology::{CellId, GlobalId, NodeId, ZoneId};
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// Where a child face takes each of its nodes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// Position in the coarse face's node list.
    Relative(usize),
    /// Node contributed by the other side, by its global node id.
    Absolute(usize),
}

/// One finer face covering a coarse interface face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildFace {
    /// Global interface id of the child.
    pub id: GlobalId,
    /// Cell owning the child on the other side, in that zone's numbering.
    pub neighbor_cell: CellId,
    pub nodes: Vec<NodeRef>,
}

/// Geometric face search, computed outside this crate.
pub trait FaceSearch {
    /// Child faces covering global interface `global_id`; empty if conforming.
    fn children(&self, global_id: GlobalId) -> &[ChildFace];

    /// Coordinates of an absolute node.
    fn node_coordinates(&self, global_node: usize) -> Option<[f64; 3]>;
}

/// In-memory [`FaceSearch`].
#[derive(Clone, Debug, Default)]
pub struct FaceSearchTable {
    children: HashMap<GlobalId, Vec<ChildFace>>,
    nodes: HashMap<usize, [f64; 3]>,
}

impl FaceSearchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_children(&mut self, global_id: GlobalId, children: Vec<ChildFace>) {
        self.children.insert(global_id, children);
    }

    pub fn insert_node(&mut self, global_node: usize, xyz: [f64; 3]) {
        self.nodes.insert(global_node, xyz);
    }
}

impl FaceSearch for FaceSearchTable {
    fn children(&self, global_id: GlobalId) -> &[ChildFace] {
        self.children.get(&global_id).map_or(&[], Vec::as_slice)
    }

    fn node_coordinates(&self, global_node: usize) -> Option<[f64; 3]> {
        self.nodes.get(&global_node).copied()
    }
}

/// Cross-zone interface map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaceLink {
    local_to_global: BTreeMap<ZoneId, Vec<GlobalId>>,
    global_to_zone: HashMap<GlobalId, Vec<(ZoneId, usize)>>,
}

impl FaceLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that local interface `local` of `zone` has id `global_id`.
    ///
    /// Locals must be registered densely per zone. Repeating a registration
    /// is a no-op; a third zone claiming the same global id is ignored with
    /// a warning.
    pub fn register(
        &mut self,
        zone: ZoneId,
        local: usize,
        global_id: GlobalId,
    ) -> Result<(), MeshError> {
        let l2g = self.local_to_global.entry(zone).or_default();
        match l2g.get(local) {
            Some(&g) if g == global_id => return Ok(()),
            Some(&g) => {
                return Err(MeshError::FaceLinkMismatch(format!(
                    "zone {zone} local interface {local} is already linked to global {g}, not {global_id}"
                )));
            }
            None if local != l2g.len() => {
                return Err(MeshError::FaceLinkMismatch(format!(
                    "zone {zone}: local interface {local} registered out of order (next is {})",
                    l2g.len()
                )));
            }
            None => l2g.push(global_id),
        }
        let sides = self.global_to_zone.entry(global_id).or_default();
        if sides.len() < 2 {
            sides.push((zone, local));
        } else {
            log::warn!(
                "global interface {global_id} already shared by {sides:?}; ignoring zone {zone} local {local}"
            );
        }
        Ok(())
    }

    /// Global ids of `zone`'s interfaces, in local order.
    pub fn local_to_global(&self, zone: ZoneId) -> Option<&[GlobalId]> {
        self.local_to_global.get(&zone).map(Vec::as_slice)
    }

    /// `(zone, local)` sides of a global interface.
    pub fn sides(&self, global_id: GlobalId) -> &[(ZoneId, usize)] {
        self.global_to_zone.get(&global_id).map_or(&[], Vec::as_slice)
    }

    /// The side of `global_id` that is not `zone`.
    pub fn other_side(&self, zone: ZoneId, global_id: GlobalId) -> Option<(ZoneId, usize)> {
        self.sides(global_id).iter().copied().find(|&(z, _)| z != zone)
    }

    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.local_to_global.keys().copied()
    }
}

/// Provenance of an interface after linking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterfaceOrigin {
    /// Local index of the interface it came from.
    pub parent: usize,
    /// Set when the interface is a child face.
    pub child_neighbor_cell: Option<CellId>,
}

/// A zone after non-conforming interfaces were expanded.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkedTopology {
    pub topology: ClassifiedTopology,
    /// Node table including merged absolute nodes.
    pub nodes: Vec<[f64; 3]>,
    /// Global id of every interface, in the new local order.
    pub local_to_global: Vec<GlobalId>,
    pub origins: Vec<InterfaceOrigin>,
    /// Children per original interface (0 if kept).
    pub child_counts: Vec<usize>,
    pub merged_nodes: usize,
}

impl LinkedTopology {
    /// Register this zone's new interface numbering into `link`.
    pub fn register_into(&self, zone: ZoneId, link: &mut FaceLink) -> Result<(), MeshError> {
        for (local, &g) in self.local_to_global.iter().enumerate() {
            link.register(zone, local, g)?;
        }
        Ok(())
    }
}

/// Expand the interface faces of `zone` according to `search`.
///
/// # Errors
/// - [`MeshError::UnclassifiedBoundary`] for an unclassified boundary face.
/// - [`MeshError::LengthMismatch`] if `link` lists a different number of
///   interfaces for `zone` than the topology has.
/// - [`MeshError::FaceLinkMismatch`] for a relative slot outside the coarse
///   face, an absolute node without coordinates, or an unsupported child
///   node count.
pub fn resolve_face_links<S: FaceSearch + ?Sized>(
    zone: ZoneId,
    topology: &ClassifiedTopology,
    nodes: &[[f64; 3]],
    link: &FaceLink,
    search: &S,
) -> Result<LinkedTopology, MeshError> {
    let l2g = link.local_to_global(zone).unwrap_or(&[]);
    let interface_count = topology.interface_count();
    if l2g.len() != interface_count {
        return Err(MeshError::LengthMismatch {
            what: "interface local-to-global list",
            expected: interface_count,
            found: l2g.len(),
        });
    }

    let boundary_count = topology.boundary_count();
    let mut nodes = nodes.to_vec();
    let mut merged: HashMap<usize, NodeId> = HashMap::new();
    let mut faces = Vec::with_capacity(topology.face_count());
    let mut bc_name_ids = Vec::with_capacity(boundary_count);
    let mut local_to_global = Vec::with_capacity(interface_count);
    let mut origins = Vec::with_capacity(interface_count);
    let mut child_counts = Vec::with_capacity(interface_count);

    let mut local = 0usize;
    for (id, face) in topology.boundary_faces().iter().enumerate() {
        let name_id = topology.bc_name_ids()[id];
        match face.bc {
            BcType::Unclassified => {
                return Err(MeshError::UnclassifiedBoundary {
                    face: id,
                    nodes: face.nodes.clone(),
                });
            }
            BcType::Interface => {
                let gid = l2g[local];
                let children = search.children(gid);
                child_counts.push(children.len());
                if children.is_empty() {
                    faces.push(face.clone());
                    bc_name_ids.push(name_id);
                    local_to_global.push(gid);
                    origins.push(InterfaceOrigin {
                        parent: local,
                        child_neighbor_cell: None,
                    });
                }
                for child in children {
                    let child_nodes =
                        child_node_list(face, child, gid, &mut nodes, &mut merged, search)?;
                    let face_type = CellType::face_type_for_nodes(child_nodes.len()).ok_or_else(
                        || {
                            MeshError::FaceLinkMismatch(format!(
                                "child {} of interface {gid} has {} nodes",
                                child.id,
                                child_nodes.len()
                            ))
                        },
                    )?;
                    faces.push(Face {
                        nodes: child_nodes,
                        left: face.left,
                        right: None,
                        left_pos: face.left_pos,
                        right_pos: None,
                        face_type,
                        bc: face.bc,
                    });
                    bc_name_ids.push(name_id);
                    local_to_global.push(child.id);
                    origins.push(InterfaceOrigin {
                        parent: local,
                        child_neighbor_cell: Some(child.neighbor_cell),
                    });
                }
                local += 1;
            }
            _ => {
                faces.push(face.clone());
                bc_name_ids.push(name_id);
            }
        }
    }
    let new_boundary_count = faces.len();
    faces.extend(topology.interior_faces().iter().cloned());

    log::info!(
        "zone {zone}: original number of interfaces = {interface_count} new number of interfaces = {}",
        local_to_global.len()
    );
    log::debug!(
        "zone {zone}: boundary faces {boundary_count} -> {new_boundary_count}, {} nodes merged",
        merged.len()
    );

    let topology = ClassifiedTopology::from_parts(
        topology.cell_count(),
        faces,
        new_boundary_count,
        bc_name_ids,
        topology.patch_names().to_vec(),
    )?;
    Ok(LinkedTopology {
        topology,
        nodes,
        local_to_global,
        origins,
        child_counts,
        merged_nodes: merged.len(),
    })
}

fn child_node_list<S: FaceSearch + ?Sized>(
    coarse: &Face,
    child: &ChildFace,
    gid: GlobalId,
    nodes: &mut Vec<[f64; 3]>,
    merged: &mut HashMap<usize, NodeId>,
    search: &S,
) -> Result<Vec<NodeId>, MeshError> {
    child
        .nodes
        .iter()
        .map(|r| match *r {
            NodeRef::Relative(slot) => coarse.nodes.get(slot).copied().ok_or_else(|| {
                MeshError::FaceLinkMismatch(format!(
                    "child {} of interface {gid}: relative slot {slot} outside a {}-node face",
                    child.id,
                    coarse.nodes.len()
                ))
            }),
            NodeRef::Absolute(global_node) => {
                if let Some(&n) = merged.get(&global_node) {
                    return Ok(n);
                }
                let xyz = search.node_coordinates(global_node).ok_or_else(|| {
                    MeshError::FaceLinkMismatch(format!(
                        "child {} of interface {gid}: absolute node {global_node} has no coordinates",
                        child.id
                    ))
                })?;
                nodes.push(xyz);
                let n = nodes.len() - 1;
                merged.insert(global_node, n);
                Ok(n)
            }
        })
        .collect()
}
