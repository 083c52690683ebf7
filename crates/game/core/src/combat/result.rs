//! Combat result types.

use crate::env::StatusKind;

/// Outcome class of a damage resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    /// The accuracy roll failed.
    Miss,
    /// The target's dodge roll succeeded.
    Dodged,
    /// Connected without a critical.
    Hit,
    /// Connected and the critical roll succeeded.
    Critical,
}

impl AttackOutcome {
    pub fn connected(self) -> bool {
        matches!(self, AttackOutcome::Hit | AttackOutcome::Critical)
    }
}

/// Result of one damage resolution.
///
/// The resolver never mutates: the kinds listed here are consumed by the
/// caller through the status engine, so tether mirroring happens in one
/// place.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    pub outcome: AttackOutcome,
    /// Final damage, already rounded. Zero on miss or dodge.
    pub amount: u32,
    /// Status kinds to consume on the target (remove-on-hit, spent marks).
    pub consumed_target: Vec<StatusKind>,
    /// Status kinds to consume on the source (remove-on-deal-hit,
    /// remove-on-crit).
    pub consumed_source: Vec<StatusKind>,
    /// Brand synergy: clear every cooldown of the source.
    pub reset_source_cooldowns: bool,
}

impl DamageOutcome {
    /// An outcome that dealt nothing and consumes nothing.
    pub fn whiff(outcome: AttackOutcome) -> Self {
        Self {
            outcome,
            amount: 0,
            consumed_target: Vec::new(),
            consumed_source: Vec::new(),
            reset_source_cooldowns: false,
        }
    }
}

/// Result of one healing resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealOutcome {
    pub amount: u32,
}
