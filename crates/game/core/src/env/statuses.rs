//! Authored status-effect definitions.
//!
//! A status effect is identified by a closed [`StatusKind`] tag rather than a
//! free-form string; data files name variants through the strum string forms
//! and the registry resolves them back to definitions. Behavior that used to
//! hinge on name literals (mark synergies, the nearsight range offset, the
//! tether link) hangs off dedicated tags instead.

use bitflags::bitflags;

/// Closed set of status-effect families the rules know about.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StatusKind {
    // ========================================================================
    // Crowd Control (restricts actions)
    // ========================================================================
    /// Cannot act or move.
    Stunned,

    /// Cannot act or move; thematically distinct from Stunned so zones and
    /// abilities can target it separately.
    Frozen,

    /// Cannot move; acting is unaffected.
    Rooted,

    // ========================================================================
    // Buffs
    // ========================================================================
    /// Absorbs incoming damage up to the definition's shield capacity.
    Shielded,

    /// HP recovery at every turn end.
    Regenerating,

    /// Reduces the damage-taken multiplier below 1.
    Warded,

    /// Flat damage reduction on incoming hits.
    Dampened,

    /// Additive critical-hit chance.
    Keen,

    /// Additive critical-damage bonus.
    Deadly,

    /// Additive dodge chance.
    Evasive,

    /// Accuracy multiplier above 1.
    Focused,

    /// Ability-range multiplier above 1.
    Farsighted,

    /// Armor multiplier above 1 (scales incoming damage down).
    Armored,

    // ========================================================================
    // Debuffs
    // ========================================================================
    /// HP loss at every turn end.
    Poisoned,

    /// Fire damage at every turn end.
    Burning,

    /// Raises the damage-taken multiplier above 1.
    Exposed,

    /// Flat offset subtracted from effective ability range.
    Nearsighted,

    // ========================================================================
    // Marks & Links
    // ========================================================================
    /// Consumed by a matching ability for bonus damage.
    Marked,

    /// Consumed by a matching ability to reset the attacker's cooldowns.
    Branded,

    /// Pair bond: removal mirrors onto the linked unit.
    Tethered,
}

/// How re-application behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stacking {
    /// One instance at a time; re-application refreshes its duration.
    Unique,
    /// Up to `max_stacks` instances; at the cap, re-application refreshes the
    /// soonest-to-expire instance instead of adding one.
    Stackable { max_stacks: u32 },
}

impl Default for Stacking {
    fn default() -> Self {
        Stacking::Unique
    }
}

bitflags! {
    /// Events that consume (remove) an instance of the effect.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct RemovalTriggers: u8 {
        /// Removed after the carrier takes a damaging hit.
        const ON_HIT = 1 << 0;
        /// Removed after the carrier deals a damaging hit.
        const ON_DEAL_HIT = 1 << 1;
        /// Removed after the carrier lands a critical hit.
        const ON_CRIT = 1 << 2;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RemovalTriggers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RemovalTriggers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RemovalTriggers::from_bits_truncate(u8::deserialize(
            deserializer,
        )?))
    }
}

/// Attributes status effects can modify.
///
/// Dodge chance, critical chance, and critical damage aggregate additively;
/// every other attribute aggregates as a multiplicative product with base 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    Accuracy,
    Dodge,
    CritChance,
    CritDamage,
    Armor,
    DamageTaken,
    AbilityRange,
}

impl Attribute {
    /// True for attributes whose contributions sum instead of multiplying.
    pub fn is_additive(self) -> bool {
        matches!(
            self,
            Attribute::Dodge | Attribute::CritChance | Attribute::CritDamage
        )
    }
}

/// One attribute contribution carried by a status effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifier {
    pub attribute: Attribute,
    /// Additive term for additive attributes, multiplicative factor
    /// otherwise.
    pub value: f32,
}

/// Immutable authored definition of a status effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectDefinition {
    pub kind: StatusKind,

    #[cfg_attr(feature = "serde", serde(default))]
    pub stacking: Stacking,

    /// Default duration in turns when the applier does not override it.
    #[cfg_attr(feature = "serde", serde(default = "default_duration"))]
    pub duration: u32,

    /// Permanent instances never count down.
    #[cfg_attr(feature = "serde", serde(default))]
    pub permanent: bool,

    /// Attribute contributions while the effect is active.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<StatModifier>,

    /// Damage applied by every turn-end tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_damage: u32,
    /// Healing applied by every turn-end tick.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tick_heal: u32,

    /// One-shot damage applied when the effect lands.
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_apply_damage: u32,
    /// One-shot healing applied when the effect lands.
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_apply_heal: u32,

    /// Damage absorbed before it reaches HP (Shielded family).
    #[cfg_attr(feature = "serde", serde(default))]
    pub shield: u32,

    /// Flat reduction subtracted from incoming damage (Dampened family).
    #[cfg_attr(feature = "serde", serde(default))]
    pub flat_reduction: u32,

    /// Events that consume an instance.
    #[cfg_attr(feature = "serde", serde(default))]
    pub removal: RemovalTriggers,

    /// Removal mirrors onto the unit linked through the tether table.
    #[cfg_attr(feature = "serde", serde(default))]
    pub linked: bool,
}

fn default_duration() -> u32 {
    1
}

impl StatusEffectDefinition {
    /// A definition with no modifiers and a one-turn duration.
    pub fn new(kind: StatusKind) -> Self {
        Self {
            kind,
            stacking: Stacking::Unique,
            duration: 1,
            permanent: false,
            modifiers: Vec::new(),
            tick_damage: 0,
            tick_heal: 0,
            on_apply_damage: 0,
            on_apply_heal: 0,
            shield: 0,
            flat_reduction: 0,
            removal: RemovalTriggers::empty(),
            linked: false,
        }
    }

    pub fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.stacking = stacking;
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    pub fn with_modifier(mut self, attribute: Attribute, value: f32) -> Self {
        self.modifiers.push(StatModifier { attribute, value });
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

    pub fn with_on_apply(mut self, damage: u32, heal: u32) -> Self {
        self.on_apply_damage = damage;
        self.on_apply_heal = heal;
        self
    }

    pub fn with_shield(mut self, shield: u32) -> Self {
        self.shield = shield;
        self
    }

    pub fn with_flat_reduction(mut self, flat_reduction: u32) -> Self {
        self.flat_reduction = flat_reduction;
        self
    }

    pub fn with_removal(mut self, removal: RemovalTriggers) -> Self {
        self.removal = removal;
        self
    }

    pub fn linked(mut self) -> Self {
        self.linked = true;
        self
    }

    /// Stack cap for this definition (1 for unique effects).
    pub fn max_stacks(&self) -> u32 {
        match self.stacking {
            Stacking::Unique => 1,
            Stacking::Stackable { max_stacks } => max_stacks.max(1),
        }
    }
}

/// Read-only lookup of authored status-effect definitions.
pub trait StatusOracle: Send + Sync {
    fn status(&self, kind: StatusKind) -> Option<&StatusEffectDefinition>;
}
