//! Per-zone registry of interfaces shared with neighbor zones.
//!
//! Each zone numbers its interfaces densely in registration order (the
//! *local* index) and keeps a bidirectional map to the process-wide *global*
//! interface id that both sides of the seam agree on. For halo exchange the
//! interfaces are grouped by neighbor zone: the group's send order is the
//! local registration order, and its receive order is the neighbor's send
//! order expressed in this zone's local indices.
//!
//! Reciprocal resolution needs both sides grouped first, so
//! [`resolve_reciprocal_all`] acts as the synchronisation barrier of a set
//! of zones.

use crate::debug_invariants::DebugInvariants;
use crate::mesh_error::MeshError;
use crate::topology::{CellId, GlobalId, ZoneId};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One registered interface, indexed by its local index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InterfaceEntry {
    pub global_id: GlobalId,
    pub neighbor_zone: ZoneId,
    /// Cell across the interface, in the neighbor zone's numbering.
    pub neighbor_cell: CellId,
}

/// All interfaces shared with one neighbor zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighborGroup {
    neighbor: ZoneId,
    global_ids: Vec<GlobalId>,
    send: Vec<usize>,
    neighbor_cells: Vec<CellId>,
    recv: Option<Vec<usize>>,
}

impl NeighborGroup {
    fn new(neighbor: ZoneId) -> Self {
        Self {
            neighbor,
            global_ids: Vec::new(),
            send: Vec::new(),
            neighbor_cells: Vec::new(),
            recv: None,
        }
    }

    pub fn neighbor(&self) -> ZoneId {
        self.neighbor
    }

    pub fn len(&self) -> usize {
        self.send.len()
    }

    pub fn is_empty(&self) -> bool {
        self.send.is_empty()
    }

    /// Global ids in send order.
    pub fn global_ids(&self) -> &[GlobalId] {
        &self.global_ids
    }

    /// Local interface indices in send order.
    pub fn send_order(&self) -> &[usize] {
        &self.send
    }

    pub fn neighbor_cells(&self) -> &[CellId] {
        &self.neighbor_cells
    }

    /// Local interface indices in the order the neighbor sends, once resolved.
    pub fn receive_order(&self) -> Option<&[usize]> {
        self.recv.as_deref()
    }
}

/// Bidirectional global↔local interface map of one zone.
#[derive(Clone, Debug, Default)]
pub struct InterfaceRegistry {
    zone: ZoneId,
    entries: Vec<InterfaceEntry>,
    global_to_local: HashMap<GlobalId, usize>,
    groups: Option<Vec<NeighborGroup>>,
}

impl InterfaceRegistry {
    pub fn new(zone: ZoneId) -> Self {
        Self {
            zone,
            ..Self::default()
        }
    }

    /// Registry populated from `entries` in order.
    pub fn from_entries(
        zone: ZoneId,
        entries: impl IntoIterator<Item = InterfaceEntry>,
    ) -> Result<Self, MeshError> {
        let mut registry = Self::new(zone);
        for e in entries {
            registry.register(e.global_id, e.neighbor_zone, e.neighbor_cell)?;
        }
        Ok(registry)
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[InterfaceEntry] {
        &self.entries
    }

    pub fn entry(&self, local: usize) -> Option<&InterfaceEntry> {
        self.entries.get(local)
    }

    /// Append an interface and return its local index.
    ///
    /// Invalidates any neighbor grouping.
    ///
    /// # Errors
    /// [`MeshError::DuplicateInterface`] if `global_id` is already registered.
    pub fn register(
        &mut self,
        global_id: GlobalId,
        neighbor_zone: ZoneId,
        neighbor_cell: CellId,
    ) -> Result<usize, MeshError> {
        let local = self.entries.len();
        match self.global_to_local.entry(global_id) {
            hashbrown::hash_map::Entry::Occupied(e) => Err(MeshError::DuplicateInterface {
                zone: self.zone,
                global_id,
                local: *e.get(),
            }),
            hashbrown::hash_map::Entry::Vacant(e) => {
                e.insert(local);
                self.entries.push(InterfaceEntry {
                    global_id,
                    neighbor_zone,
                    neighbor_cell,
                });
                self.groups = None;
                Ok(local)
            }
        }
    }

    pub fn contains(&self, global_id: GlobalId) -> bool {
        self.global_to_local.contains_key(&global_id)
    }

    /// # Errors
    /// [`MeshError::UnregisteredInterface`] if `global_id` is unknown.
    pub fn local_index_of(&self, global_id: GlobalId) -> Result<usize, MeshError> {
        self.global_to_local
            .get(&global_id)
            .copied()
            .ok_or(MeshError::UnregisteredInterface {
                zone: self.zone,
                global_id,
            })
    }

    pub fn global_id_of(&self, local: usize) -> Option<GlobalId> {
        self.entries.get(local).map(|e| e.global_id)
    }

    /// Distinct neighbor zones, ascending.
    pub fn neighbor_zones(&self) -> Vec<ZoneId> {
        let mut zones: Vec<_> = self.entries.iter().map(|e| e.neighbor_zone).collect();
        zones.sort_unstable();
        zones.dedup();
        zones
    }

    /// Replace every interface in place, e.g. after faces were relinked.
    ///
    /// On error the registry is left unchanged.
    pub fn reset_interfaces(
        &mut self,
        entries: impl IntoIterator<Item = InterfaceEntry>,
    ) -> Result<(), MeshError> {
        let fresh = Self::from_entries(self.zone, entries)?;
        log::debug!(
            "zone {}: interfaces reset ({} -> {})",
            self.zone,
            self.entries.len(),
            fresh.entries.len()
        );
        *self = fresh;
        Ok(())
    }

    /// Split the interface list into one group per neighbor zone.
    ///
    /// Groups are ordered by neighbor id; within a group the local
    /// registration order is kept. Previously recorded receive orders are
    /// discarded.
    pub fn group_by_neighbor(&mut self) -> &[NeighborGroup] {
        let mut by_zone: BTreeMap<ZoneId, NeighborGroup> = BTreeMap::new();
        for (local, e) in self.entries.iter().enumerate() {
            let group = by_zone
                .entry(e.neighbor_zone)
                .or_insert_with(|| NeighborGroup::new(e.neighbor_zone));
            group.global_ids.push(e.global_id);
            group.send.push(local);
            group.neighbor_cells.push(e.neighbor_cell);
        }
        self.groups.insert(by_zone.into_values().collect())
    }

    /// # Errors
    /// [`MeshError::InterfaceGroupsNotBuilt`] before [`Self::group_by_neighbor`].
    pub fn groups(&self) -> Result<&[NeighborGroup], MeshError> {
        self.groups
            .as_deref()
            .ok_or(MeshError::InterfaceGroupsNotBuilt { zone: self.zone })
    }

    pub fn group(&self, neighbor: ZoneId) -> Result<&NeighborGroup, MeshError> {
        self.groups()?
            .iter()
            .find(|g| g.neighbor == neighbor)
            .ok_or(MeshError::MissingNeighborGroup {
                zone: self.zone,
                neighbor,
            })
    }

    fn group_mut(&mut self, neighbor: ZoneId) -> Result<&mut NeighborGroup, MeshError> {
        let zone = self.zone;
        self.groups
            .as_mut()
            .ok_or(MeshError::InterfaceGroupsNotBuilt { zone })?
            .iter_mut()
            .find(|g| g.neighbor == neighbor)
            .ok_or(MeshError::MissingNeighborGroup { zone, neighbor })
    }

    /// Global ids sent to `neighbor`, in send order.
    pub fn send_manifest(&self, neighbor: ZoneId) -> Result<&[GlobalId], MeshError> {
        Ok(self.group(neighbor)?.global_ids())
    }

    /// Local indices filled by data from `neighbor`, in the neighbor's send order.
    pub fn recv_manifest(&self, neighbor: ZoneId) -> Result<&[usize], MeshError> {
        self.group(neighbor)?
            .receive_order()
            .ok_or_else(|| MeshError::ReceiveOrder {
                zone: self.zone,
                neighbor,
                reason: "receive order not resolved yet".into(),
            })
    }

    /// Record `locals` as the receive order of the group for `neighbor`.
    ///
    /// `locals` must be a permutation of the group's send indices.
    pub fn record_receive_order(
        &mut self,
        neighbor: ZoneId,
        locals: Vec<usize>,
    ) -> Result<(), MeshError> {
        let zone = self.zone;
        let group = self.group_mut(neighbor)?;
        if locals.len() != group.send.len() {
            return Err(MeshError::ReceiveOrder {
                zone,
                neighbor,
                reason: format!(
                    "{} indices for a group of {} interfaces",
                    locals.len(),
                    group.send.len()
                ),
            });
        }
        let mut sorted = locals.clone();
        sorted.sort_unstable();
        // `send` is ascending by construction.
        if sorted != group.send {
            return Err(MeshError::ReceiveOrder {
                zone,
                neighbor,
                reason: "indices are not the interfaces shared with this neighbor".into(),
            });
        }
        group.recv = Some(locals);
        Ok(())
    }

    /// Translate the neighbor's send manifest into local indices and record
    /// it as the receive order.
    pub fn resolve_reciprocal(
        &mut self,
        neighbor: ZoneId,
        global_ids: &[GlobalId],
    ) -> Result<(), MeshError> {
        let locals = global_ids
            .iter()
            .map(|&g| self.local_index_of(g))
            .collect::<Result<Vec<_>, _>>()?;
        self.record_receive_order(neighbor, locals)
    }
}

/// Resolve every reciprocal receive order among `registries`.
///
/// All registries must have been grouped; this is the barrier after which
/// halo buffers can be packed and unpacked on both sides in matching order.
pub fn resolve_reciprocal_all(registries: &mut [InterfaceRegistry]) -> Result<(), MeshError> {
    let index: HashMap<ZoneId, usize> = registries
        .iter()
        .enumerate()
        .map(|(i, r)| (r.zone, i))
        .collect();

    let mut pending = Vec::new();
    for registry in registries.iter() {
        for group in registry.groups()? {
            let other = index
                .get(&group.neighbor)
                .map(|&j| &registries[j])
                .ok_or(MeshError::MissingNeighborGroup {
                    zone: group.neighbor,
                    neighbor: registry.zone,
                })?;
            let manifest = other.send_manifest(registry.zone)?.to_vec();
            pending.push((registry.zone, group.neighbor, manifest));
        }
    }

    let pairs = pending.len();
    for (zone, neighbor, manifest) in pending {
        registries[index[&zone]].resolve_reciprocal(neighbor, &manifest)?;
    }
    log::debug!(
        "resolved {pairs} reciprocal interface groups across {} zones",
        registries.len()
    );
    Ok(())
}

impl DebugInvariants for InterfaceRegistry {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "InterfaceRegistry");
    }

    /// The global/local maps are mutual inverses and every group covers
    /// exactly the interfaces of its neighbor.
    fn validate_invariants(&self) -> Result<(), MeshError> {
        if self.global_to_local.len() != self.entries.len() {
            return Err(MeshError::LengthMismatch {
                what: "interface global ids",
                expected: self.entries.len(),
                found: self.global_to_local.len(),
            });
        }
        for (local, e) in self.entries.iter().enumerate() {
            if self.global_to_local.get(&e.global_id) != Some(&local) {
                return Err(MeshError::UnregisteredInterface {
                    zone: self.zone,
                    global_id: e.global_id,
                });
            }
        }
        if let Some(groups) = &self.groups {
            let grouped: usize = groups.iter().map(NeighborGroup::len).sum();
            if grouped != self.entries.len() {
                return Err(MeshError::LengthMismatch {
                    what: "grouped interfaces",
                    expected: self.entries.len(),
                    found: grouped,
                });
            }
            for group in groups {
                if let Some(&bad) = group
                    .send
                    .iter()
                    .find(|&&l| self.entries[l].neighbor_zone != group.neighbor)
                {
                    return Err(MeshError::MissingNeighborGroup {
                        zone: self.zone,
                        neighbor: self.entries[bad].neighbor_zone,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_dense_and_rejects_duplicates() {
        let mut r = InterfaceRegistry::new(0);
        assert_eq!(r.register(40, 1, 7), Ok(0));
        assert_eq!(r.register(12, 2, 3), Ok(1));
        assert_eq!(
            r.register(40, 2, 9),
            Err(MeshError::DuplicateInterface { zone: 0, global_id: 40, local: 0 })
        );
        assert_eq!(r.local_index_of(12), Ok(1));
        assert_eq!(r.global_id_of(0), Some(40));
        assert_eq!(
            r.local_index_of(5),
            Err(MeshError::UnregisteredInterface { zone: 0, global_id: 5 })
        );
    }

    #[test]
    fn groups_keep_registration_order() {
        let mut r = InterfaceRegistry::new(0);
        for (g, n) in [(5, 2), (3, 1), (9, 2), (1, 1)] {
            r.register(g, n, 0).unwrap();
        }
        let groups = r.group_by_neighbor();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].neighbor(), 1);
        assert_eq!(groups[0].global_ids(), &[3, 1]);
        assert_eq!(groups[0].send_order(), &[1, 3]);
        assert_eq!(groups[1].global_ids(), &[5, 9]);
    }

    #[test]
    fn reciprocal_requires_groups() {
        let mut r = InterfaceRegistry::new(3);
        r.register(1, 0, 0).unwrap();
        assert_eq!(
            r.resolve_reciprocal(0, &[1]),
            Err(MeshError::InterfaceGroupsNotBuilt { zone: 3 })
        );
        r.group_by_neighbor();
        assert_eq!(
            r.resolve_reciprocal(4, &[1]),
            Err(MeshError::MissingNeighborGroup { zone: 3, neighbor: 4 })
        );
        r.resolve_reciprocal(0, &[1]).unwrap();
        assert_eq!(r.recv_manifest(0).unwrap(), &[0]);
    }

    #[test]
    fn receive_order_must_match_group() {
        let mut r = InterfaceRegistry::new(0);
        r.register(1, 1, 0).unwrap();
        r.register(2, 2, 0).unwrap();
        r.group_by_neighbor();
        assert!(matches!(
            r.record_receive_order(1, vec![1]),
            Err(MeshError::ReceiveOrder { .. })
        ));
        assert!(matches!(
            r.record_receive_order(1, vec![0, 1]),
            Err(MeshError::ReceiveOrder { .. })
        ));
    }

    #[test]
    fn reset_replaces_in_place() {
        let mut r = InterfaceRegistry::new(0);
        r.register(1, 1, 0).unwrap();
        r.group_by_neighbor();
        r.reset_interfaces([
            InterfaceEntry { global_id: 10, neighbor_zone: 1, neighbor_cell: 4 },
            InterfaceEntry { global_id: 11, neighbor_zone: 1, neighbor_cell: 5 },
        ])
        .unwrap();
        assert_eq!(r.len(), 2);
        assert!(!r.contains(1));
        r.validate_invariants().unwrap();
        assert!(r.groups().is_err());
    }
}
