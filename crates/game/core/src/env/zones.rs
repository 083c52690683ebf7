//! Authored zone definitions.

use super::statuses::StatusKind;

/// Unique identifier for an authored zone type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneId(pub u16);

impl ZoneId {
    /// Reserved id for the transient damaging zone spawned by unstable
    /// resonance. Registries must provide a definition under this id.
    pub const RESONANCE: Self = Self(u16::MAX);
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zonedef#{}", self.0)
    }
}

/// Which units a zone affects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllegianceFilter {
    #[default]
    Any,
    /// Only units on the owner's team.
    AllyOnly,
    /// Only units opposing the owner.
    EnemyOnly,
}

/// How placing the same zone type on an occupied tile behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneMerge {
    /// The new placement refreshes the existing instance's duration.
    #[default]
    Refresh,
    /// The new placement adds a stack (and refreshes duration) up to `max`.
    Stack { max: u32 },
    /// Same-type placements coexist as separate instances.
    Separate,
}

/// Turn-end behavior a zone type performs once per turn, after all steady
/// ticks. Each zone type declares at most one; declaring one replaces the
/// generic periodic tick entirely.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneTurnEnd {
    /// Damages every contained unit passing the allegiance filter.
    Pulse { damage: u32 },
    /// Throws each occupant to a random free neighboring tile.
    Scatter,
    /// Grants each occupant `effect` with probability `chance`.
    Blessing { chance: f32, effect: StatusKind },
}

/// Immutable authored definition of a zone type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneDefinition {
    pub id: ZoneId,

    /// Containment radius in Manhattan tiles.
    pub radius: u32,

    /// Default lifetime in turns.
    pub duration: u32,

    /// Permanent zones never count down.
    #[cfg_attr(feature = "serde", serde(default))]
    pub permanent: bool,

    #[cfg_attr(feature = "serde", serde(default))]
    pub allegiance: AllegianceFilter,

    /// Damage applied by every steady tick to each contained unit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_damage: u32,
    /// Healing applied by every steady tick to each contained unit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_heal: u32,

    /// Statuses refreshed to the zone's remaining duration on every steady
    /// tick, and removed when a unit leaves.
    #[cfg_attr(feature = "serde", serde(default))]
    pub grants: Vec<StatusKind>,

    /// Effect applied once when a position change brings a unit inside,
    /// using the effect's own default duration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub entry_effect: Option<StatusKind>,

    /// Once-per-turn behavior replacing the generic steady tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub turn_end: Option<ZoneTurnEnd>,

    /// Same-type placement policy.
    #[cfg_attr(feature = "serde", serde(default))]
    pub merge: ZoneMerge,

    /// Extra cast range granted to units casting from inside the zone.
    #[cfg_attr(feature = "serde", serde(default))]
    pub range_bonus: u32,
}

impl ZoneDefinition {
    pub fn new(id: ZoneId, radius: u32, duration: u32) -> Self {
        Self {
            id,
            radius,
            duration,
            permanent: false,
            allegiance: AllegianceFilter::Any,
            tick_damage: 0,
            tick_heal: 0,
            grants: Vec::new(),
            entry_effect: None,
            turn_end: None,
            merge: ZoneMerge::Refresh,
            range_bonus: 0,
        }
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn with_allegiance(mut self, allegiance: AllegianceFilter) -> Self {
        self.allegiance = allegiance;
        self
    }

    pub fn with_tick_damage(mut self, tick_damage: u32) -> Self {
        self.tick_damage = tick_damage;
        self
    }

    pub fn with_tick_heal(mut self, tick_heal: u32) -> Self {
        self.tick_heal = tick_heal;
        self
    }

    pub fn with_grant(mut self, kind: StatusKind) -> Self {
        self.grants.push(kind);
        self
    }

    pub fn with_entry_effect(mut self, kind: StatusKind) -> Self {
        self.entry_effect = Some(kind);
        self
    }

    pub fn with_turn_end(mut self, behavior: ZoneTurnEnd) -> Self {
        self.turn_end = Some(behavior);
        self
    }

    pub fn with_merge(mut self, merge: ZoneMerge) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_range_bonus(mut self, range_bonus: u32) -> Self {
        self.range_bonus = range_bonus;
        self
    }
}

/// Read-only lookup of authored zone definitions.
pub trait ZoneOracle: Send + Sync {
    fn zone(&self, id: ZoneId) -> Option<&ZoneDefinition>;
}
