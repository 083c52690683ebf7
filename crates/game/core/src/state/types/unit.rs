//! Unit state and the host-populated unit collection.
//!
//! The core never spawns or destroys units: the host inserts them before the
//! match starts and they stay in the collection for its whole lifetime. Death
//! is `hp == 0`, never removal, so identifiers stay valid for link mirroring
//! and zone bookkeeping.

use std::collections::BTreeMap;

use crate::env::AbilityId;

use super::{Position, ResourceMeter, StatusEffects, Team, UnitId};

/// Complete state of one unit on the grid.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitState {
    pub id: UnitId,
    pub team: Team,
    pub position: Position,

    pub hp: ResourceMeter,
    /// Aura pool consumed by ability casts.
    pub aura: ResourceMeter,
    /// Aura granted to this unit at every turn start, on top of the shared
    /// base gain.
    pub aura_regen: u32,

    /// Multiplier applied on a critical hit before additive crit-damage
    /// contributions from status effects.
    pub crit_multiplier: f32,

    /// Active status effects (buffs, debuffs, crowd control, marks).
    pub status_effects: StatusEffects,

    /// Turn number at which each ability becomes usable again. Entries at or
    /// below the current turn are ready.
    pub cooldowns: BTreeMap<AbilityId, u32>,
}

impl UnitState {
    pub fn new(id: UnitId, team: Team, position: Position, hp: u32, aura: u32) -> Self {
        Self {
            id,
            team,
            position,
            hp: ResourceMeter::full(hp),
            aura: ResourceMeter::full(aura),
            aura_regen: 0,
            crit_multiplier: 1.5,
            status_effects: StatusEffects::empty(),
            cooldowns: BTreeMap::new(),
        }
    }

    pub fn with_aura_regen(mut self, aura_regen: u32) -> Self {
        self.aura_regen = aura_regen;
        self
    }

    pub fn with_crit_multiplier(mut self, crit_multiplier: f32) -> Self {
        self.crit_multiplier = crit_multiplier;
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp.current > 0
    }

    /// Applies damage, clamping at zero.
    pub fn apply_damage(&mut self, amount: u32) {
        self.hp.spend(amount);
    }

    /// Applies healing, clamping at the maximum.
    pub fn apply_heal(&mut self, amount: u32) {
        self.hp.gain(amount);
    }

    /// Checks whether an ability is off cooldown at the given turn.
    pub fn ability_ready(&self, ability: AbilityId, current_turn: u32) -> bool {
        self.cooldowns
            .get(&ability)
            .is_none_or(|&until| until <= current_turn)
    }

    /// Puts an ability on cooldown until the given turn.
    pub fn set_cooldown(&mut self, ability: AbilityId, until: u32) {
        self.cooldowns.insert(ability, until);
    }

    /// Clears every cooldown (Branded mark synergy).
    pub fn reset_cooldowns(&mut self) {
        self.cooldowns.clear();
    }
}

/// All units in the match, keyed by id for deterministic iteration order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitsState {
    units: BTreeMap<UnitId, UnitState>,
}

impl UnitsState {
    pub fn empty() -> Self {
        Self {
            units: BTreeMap::new(),
        }
    }

    /// Host-facing entry point: registers a unit before the match starts.
    /// Replaces any previous unit with the same id.
    pub fn insert(&mut self, unit: UnitState) {
        self.units.insert(unit.id, unit);
    }

    pub fn get(&self, id: UnitId) -> Option<&UnitState> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnitState> {
        self.units.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut UnitState> {
        self.units.values_mut()
    }

    /// Ids in deterministic (ascending) order. Collect this before mutating
    /// units inside a loop.
    pub fn ids(&self) -> Vec<UnitId> {
        self.units.keys().copied().collect()
    }

    /// Living units on the given team.
    pub fn living_on(&self, team: Team) -> impl Iterator<Item = &UnitState> {
        self.units
            .values()
            .filter(move |u| u.team == team && u.is_alive())
    }

    /// The living unit standing on `position`, if any.
    pub fn living_at(&self, position: Position) -> Option<&UnitState> {
        self.units
            .values()
            .find(|u| u.is_alive() && u.position == position)
    }

    /// True if any living unit occupies `position`.
    pub fn is_occupied(&self, position: Position) -> bool {
        self.living_at(position).is_some()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
