//! Ability resolution pipeline.
//!
//! [`execute`] validates a cast completely before mutating anything, then
//! runs the ordered effect steps to completion: debit, cooldown, movement,
//! combat effects, status application, zone creation, and the optional
//! second strike. A rejected cast returns a typed failure and leaves no
//! partial state.

mod ledger;
mod movement;
mod pipeline;

pub use ledger::{AuraCommand, AuraLedger, DeferredLedger, LocalLedger};
pub use movement::MoveRecord;
pub use pipeline::execute;

use crate::combat::DamageOutcome;
use crate::env::{AbilityId, OracleError};
use crate::state::{Position, UnitId, ZoneInstanceId};
use crate::turn::TurnError;
use crate::zone::ZonePlacement;

/// One ability cast as submitted by a player or an AI agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityUse {
    pub ability: AbilityId,
    pub source: UnitId,
    /// Target tile for ground-targeted abilities; ignored when a target
    /// unit is given.
    pub target_position: Position,
    pub target_unit: Option<UnitId>,
    /// Cast the overload variant (callers gate the unlock condition).
    pub overload: bool,
    /// Zone the caster claims a range bonus from; verified against the
    /// caster's position.
    pub zone: Option<ZoneInstanceId>,
    /// Second unit for paired-binding abilities.
    pub second_target: Option<UnitId>,
}

impl AbilityUse {
    /// A unit-targeted cast with no extras.
    pub fn on_unit(ability: AbilityId, source: UnitId, target: UnitId) -> Self {
        Self {
            ability,
            source,
            target_position: Position::ORIGIN,
            target_unit: Some(target),
            overload: false,
            zone: None,
            second_target: None,
        }
    }

    /// A ground-targeted cast with no extras.
    pub fn on_ground(ability: AbilityId, source: UnitId, target_position: Position) -> Self {
        Self {
            ability,
            source,
            target_position,
            target_unit: None,
            overload: false,
            zone: None,
            second_target: None,
        }
    }

    pub fn overloaded(mut self) -> Self {
        self.overload = true;
        self
    }

    pub fn from_zone(mut self, zone: ZoneInstanceId) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn with_second_target(mut self, second: UnitId) -> Self {
        self.second_target = Some(second);
        self
    }
}

/// Typed failures of the validation step. Nothing has been mutated when one
/// of these comes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityError {
    #[error("source unit not found")]
    SourceNotFound,

    #[error("source unit is dead")]
    SourceDead,

    #[error("source unit cannot act")]
    CannotAct,

    #[error("cast not permitted: {0}")]
    NotPermitted(#[from] TurnError),

    #[error("insufficient aura")]
    InsufficientAura,

    #[error("ability is on cooldown")]
    OnCooldown,

    #[error("invalid target")]
    InvalidTarget,

    #[error("target unit not found")]
    TargetNotFound,

    #[error("target is out of range")]
    OutOfRange,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// One resolved strike against one unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StrikeRecord {
    pub target: UnitId,
    pub result: DamageOutcome,
}

/// One resolved heal on one unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealRecord {
    pub target: UnitId,
    pub amount: u32,
}

/// Everything a successful cast did, for host presentation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AbilityOutcome {
    pub strikes: Vec<StrikeRecord>,
    pub heals: Vec<HealRecord>,
    pub displacement: Option<MoveRecord>,
    pub zone: Option<ZonePlacement>,
}
