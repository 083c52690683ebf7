//! Healing resolution.

use crate::env::AbilityDefinition;

use super::result::HealOutcome;
use super::round_half_up;

/// Resolve a healing application.
///
/// Base heal scaled by the overload heal multiplier when the variant is both
/// requested and supported. No roll is involved; healing always lands.
pub fn resolve_healing(ability: &AbilityDefinition, is_overload: bool) -> HealOutcome {
    let multiplier = match (is_overload, ability.overload) {
        (true, Some(spec)) => spec.heal_multiplier,
        _ => 1.0,
    };
    HealOutcome {
        amount: round_half_up(ability.heal as f32 * multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{AbilityId, TargetFlags};

    #[test]
    fn overload_scales_healing() {
        let ability = AbilityDefinition::new(AbilityId(3), TargetFlags::ALLY, 4)
            .with_heal(7)
            .with_overload(1.0, 1.5);

        assert_eq!(resolve_healing(&ability, false).amount, 7);
        // 7 × 1.5 = 10.5 rounds half-up to 11.
        assert_eq!(resolve_healing(&ability, true).amount, 11);
    }
}
