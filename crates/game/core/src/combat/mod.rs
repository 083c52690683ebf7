//! Damage and healing resolution.
//!
//! One resolver, one rounding rule: every amount is computed in `f32` and
//! rounded half-up to an integer exactly once, at the end. Zone ticks and
//! turn-end periodics author integer amounts directly, so no second
//! calculation path exists anywhere in the rules.

mod damage;
mod healing;
mod result;

pub use damage::{resolve_damage, resolve_strike};
pub use healing::resolve_healing;
pub use result::{AttackOutcome, DamageOutcome, HealOutcome};

/// Round half-up truncation to integer. Inputs are never negative.
pub(crate) fn round_half_up(value: f32) -> u32 {
    (value.max(0.0) + 0.5).floor() as u32
}
