//! Authored ability definitions.

use bitflags::bitflags;

use super::statuses::StatusKind;
use super::zones::ZoneId;

/// Unique identifier for an authored ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityId(pub u16);

impl std::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ability#{}", self.0)
    }
}

bitflags! {
    /// Which targets an ability accepts.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TargetFlags: u8 {
        /// The caster itself.
        const SELF = 1 << 0;
        /// A living unit on the caster's team.
        const ALLY = 1 << 1;
        /// A living unit on the opposing team.
        const ENEMY = 1 << 2;
        /// An empty or occupied tile; the effect resolves at the position.
        const GROUND = 1 << 3;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TargetFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TargetFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(TargetFlags::from_bits_truncate(u8::deserialize(
            deserializer,
        )?))
    }
}

/// How the caster or target is displaced when the ability resolves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MovementKind {
    #[default]
    None,
    /// Caster dashes to the nearest free tile adjacent to the target.
    DashToAdjacent,
    /// Caster teleports onto the targeted tile.
    TeleportToTarget,
    /// Target is pulled to the nearest free tile adjacent to the caster.
    PullTarget,
    /// Target is pushed away from the caster by the given distance.
    PushTarget { distance: u32 },
}

/// Alternate, stronger variant unlocked by an overload condition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OverloadSpec {
    pub damage_multiplier: f32,
    pub heal_multiplier: f32,
}

/// One status application authored on an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusApplication {
    pub kind: StatusKind,
    /// Overrides the definition's default duration when set.
    pub duration: Option<u32>,
}

/// Mark-consuming synergies, selected by ability identity. Exactly one of
/// these two special cases applies to any given ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkSynergy {
    /// If the target carries `mark` and the hit dealt damage, add `bonus`
    /// flat damage and consume the mark.
    BonusDamage { mark: StatusKind, bonus: u32 },
    /// If the target carries `mark` and the hit dealt damage, reset every
    /// cooldown of the caster and consume the mark.
    CooldownReset { mark: StatusKind },
}

/// Hard-coded multi-target bindings that bypass the generic status list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityBinding {
    /// Applies `effect` to both the primary and the secondary target and
    /// registers them in the tether table so removal mirrors.
    TetherPair {
        effect: StatusKind,
        duration: Option<u32>,
    },
}

/// A second resolution of the damage/status steps with its own multiplier.
/// Push displacement and zone creation never repeat on the second hit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecondHit {
    pub damage_multiplier: f32,
}

/// Immutable authored definition of an ability.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,

    pub targeting: TargetFlags,

    /// Base cast range in Manhattan tiles.
    pub range: u32,

    /// Area radius around the target position. Zero means single target.
    #[cfg_attr(feature = "serde", serde(default))]
    pub area: u32,

    /// Aura debited from the caster.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cost: u32,

    /// Turns before the ability is usable again.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u32,

    #[cfg_attr(feature = "serde", serde(default))]
    pub damage: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub heal: u32,

    #[cfg_attr(feature = "serde", serde(default))]
    pub movement: MovementKind,

    #[cfg_attr(feature = "serde", serde(default))]
    pub overload: Option<OverloadSpec>,

    /// Generic status applications, skipped when `binding` is set.
    #[cfg_attr(feature = "serde", serde(default))]
    pub statuses: Vec<StatusApplication>,

    /// Zone created at the target position on the first hit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub zone: Option<ZoneId>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub second_hit: Option<SecondHit>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub mark_synergy: Option<MarkSynergy>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub binding: Option<AbilityBinding>,
}

impl AbilityDefinition {
    /// A ground-targeted no-op ability; chain `with_*` to flesh it out.
    pub fn new(id: AbilityId, targeting: TargetFlags, range: u32) -> Self {
        Self {
            id,
            targeting,
            range,
            area: 0,
            cost: 0,
            cooldown: 0,
            damage: 0,
            heal: 0,
            movement: MovementKind::None,
            overload: None,
            statuses: Vec::new(),
            zone: None,
            second_hit: None,
            mark_synergy: None,
            binding: None,
        }
    }

    pub fn with_area(mut self, area: u32) -> Self {
        self.area = area;
        self
    }

    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_damage(mut self, damage: u32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_heal(mut self, heal: u32) -> Self {
        self.heal = heal;
        self
    }

    pub fn with_movement(mut self, movement: MovementKind) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_overload(mut self, damage_multiplier: f32, heal_multiplier: f32) -> Self {
        self.overload = Some(OverloadSpec {
            damage_multiplier,
            heal_multiplier,
        });
        self
    }

    pub fn with_status(mut self, kind: StatusKind, duration: Option<u32>) -> Self {
        self.statuses.push(StatusApplication { kind, duration });
        self
    }

    pub fn with_zone(mut self, zone: ZoneId) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_second_hit(mut self, damage_multiplier: f32) -> Self {
        self.second_hit = Some(SecondHit { damage_multiplier });
        self
    }

    pub fn with_mark_synergy(mut self, synergy: MarkSynergy) -> Self {
        self.mark_synergy = Some(synergy);
        self
    }

    pub fn with_binding(mut self, binding: AbilityBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    /// True when the ability resolves at a position rather than a unit.
    pub fn is_ground_targeted(&self) -> bool {
        self.targeting.contains(TargetFlags::GROUND)
    }
}

/// Read-only lookup of authored ability definitions.
pub trait AbilityOracle: Send + Sync {
    fn ability(&self, id: AbilityId) -> Option<&AbilityDefinition>;
}
