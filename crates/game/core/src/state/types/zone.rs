//! Zone instances anchored to the grid.
//!
//! Instances are created and ticked exclusively through [`crate::zone`];
//! this module owns the storage: the instance table, the per-tile index used
//! for the overcrowding cap, and the void-tile map left behind by unstable
//! resonance.

use std::collections::{BTreeMap, BTreeSet};

use arrayvec::ArrayVec;

use crate::config::CoreConfig;
use crate::env::ZoneId;

use super::{Position, UnitId};

/// Unique identifier for a zone instance (not its authored definition).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneInstanceId(pub u32);

impl std::fmt::Display for ZoneInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone#{}", self.0)
    }
}

/// Where a zone instance is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneLifecycle {
    /// Ticking and applying effects.
    Active,
    /// Duration reached zero; the host may fade it out. No further effects.
    Fading,
    /// Fully removed; kept one sweep for host notification, then dropped.
    Spent,
}

/// A zone instance on the grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneInstance {
    pub id: ZoneInstanceId,
    pub definition: ZoneId,
    pub position: Position,
    /// Turns left before deactivation. Ignored when the definition is
    /// permanent.
    pub remaining: u32,
    pub owner: UnitId,
    pub stacks: u32,
    pub lifecycle: ZoneLifecycle,

    /// Units the steady tick reached this turn.
    pub affected_this_tick: BTreeSet<UnitId>,
    /// Units the steady tick reached last turn; the difference drives
    /// granted-status removal for units that left.
    pub affected_last_tick: BTreeSet<UnitId>,
}

impl ZoneInstance {
    pub fn new(
        id: ZoneInstanceId,
        definition: ZoneId,
        position: Position,
        remaining: u32,
        owner: UnitId,
    ) -> Self {
        Self {
            id,
            definition,
            position,
            remaining,
            owner,
            stacks: 1,
            lifecycle: ZoneLifecycle::Active,
            affected_this_tick: BTreeSet::new(),
            affected_last_tick: BTreeSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == ZoneLifecycle::Active
    }
}

type TileSlots = ArrayVec<ZoneInstanceId, { CoreConfig::MAX_ZONES_PER_TILE }>;

/// All zone instances plus the indexes the engine maintains over them.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZonesState {
    instances: BTreeMap<ZoneInstanceId, ZoneInstance>,
    by_tile: BTreeMap<Position, TileSlots>,
    /// Tiles rejecting new zones after unstable resonance, with the number of
    /// turns left in the void window.
    void_tiles: BTreeMap<Position, u32>,
    next_id: u32,
}

impl ZonesState {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Allocates the next instance id (monotonically increasing, never
    /// reused).
    pub fn allocate_id(&mut self) -> ZoneInstanceId {
        let id = ZoneInstanceId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn get(&self, id: ZoneInstanceId) -> Option<&ZoneInstance> {
        self.instances.get(&id)
    }

    pub fn get_mut(&mut self, id: ZoneInstanceId) -> Option<&mut ZoneInstance> {
        self.instances.get_mut(&id)
    }

    /// Inserts an instance and indexes it under its tile. Returns false
    /// (without inserting) when the tile's slots are full; the caller decides
    /// what overflow means.
    pub fn insert(&mut self, instance: ZoneInstance) -> bool {
        let slots = self.by_tile.entry(instance.position).or_default();
        if slots.try_push(instance.id).is_err() {
            return false;
        }
        self.instances.insert(instance.id, instance);
        true
    }

    /// Removes an instance and de-indexes it.
    pub fn remove(&mut self, id: ZoneInstanceId) -> Option<ZoneInstance> {
        let instance = self.instances.remove(&id)?;
        if let Some(slots) = self.by_tile.get_mut(&instance.position) {
            slots.retain(|slot| *slot != id);
            if slots.is_empty() {
                self.by_tile.remove(&instance.position);
            }
        }
        Some(instance)
    }

    /// Releases an instance's tile slot while keeping the instance itself,
    /// so a deactivating zone stops claiming capacity.
    pub fn deindex(&mut self, id: ZoneInstanceId) {
        let Some(instance) = self.instances.get(&id) else {
            return;
        };
        let position = instance.position;
        if let Some(slots) = self.by_tile.get_mut(&position) {
            slots.retain(|slot| *slot != id);
            if slots.is_empty() {
                self.by_tile.remove(&position);
            }
        }
    }

    /// Moves an instance's tile index entry. The caller has already checked
    /// capacity at the destination.
    pub fn reindex(&mut self, id: ZoneInstanceId, to: Position) {
        let Some(instance) = self.instances.get_mut(&id) else {
            return;
        };
        let from = instance.position;
        instance.position = to;
        if let Some(slots) = self.by_tile.get_mut(&from) {
            slots.retain(|slot| *slot != id);
            if slots.is_empty() {
                self.by_tile.remove(&from);
            }
        }
        let slots = self.by_tile.entry(to).or_default();
        // Capacity was validated by the caller; a full tile here would mean
        // the index and the instance table diverged.
        let _ = slots.try_push(id);
    }

    /// Instance ids anchored to the given tile, in placement order.
    pub fn at_tile(&self, position: Position) -> &[ZoneInstanceId] {
        self.by_tile
            .get(&position)
            .map(|slots| slots.as_slice())
            .unwrap_or(&[])
    }

    pub fn tile_count(&self, position: Position) -> usize {
        self.at_tile(position).len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneInstance> {
        self.instances.values()
    }

    /// Instance ids in deterministic (ascending) order.
    pub fn ids(&self) -> Vec<ZoneInstanceId> {
        self.instances.keys().copied().collect()
    }

    // ========================================================================
    // Void tiles
    // ========================================================================

    pub fn mark_void(&mut self, position: Position, turns: u32) {
        self.void_tiles.insert(position, turns);
    }

    pub fn is_void(&self, position: Position) -> bool {
        self.void_tiles.contains_key(&position)
    }

    /// Counts down the void windows at turn end, clearing expired ones.
    pub fn tick_void_tiles(&mut self) {
        self.void_tiles.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    /// Drops every `Spent` instance. Called once per turn after the host has
    /// had a chance to observe removals.
    pub fn sweep_spent(&mut self) {
        let spent: Vec<ZoneInstanceId> = self
            .instances
            .values()
            .filter(|z| z.lifecycle == ZoneLifecycle::Spent)
            .map(|z| z.id)
            .collect();
        for id in spent {
            self.remove(id);
        }
    }
}
