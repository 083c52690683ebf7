//! Damage resolution.

use crate::env::{
    AbilityDefinition, Attribute, CoreEnv, MarkSynergy, OracleError, RemovalTriggers, StatusKind,
    compute_seed,
};
use crate::state::{GameState, UnitId};
use crate::status;

use super::result::{AttackOutcome, DamageOutcome};
use super::round_half_up;

/// Roll contexts distinguishing the independent draws within one resolution.
/// Successive strikes of a multi-hit ability stride past the zone contexts
/// so every draw in a command stays independent.
const CTX_HIT: u32 = 0;
const CTX_DODGE: u32 = 1;
const CTX_CRIT: u32 = 2;
const CTX_STRIKE_STRIDE: u32 = 8;

/// Resolve a damage application from `source` to `target`.
///
/// # Pipeline
///
/// ```text
/// a. accuracy roll    hit = base_hit_chance × accuracy(source)
/// b. dodge roll       dodge = clamp01(dodge(target))
/// c. base             damage = ability.damage × overload multiplier
/// d. armor            if armor(target) > 1: damage -= damage × (armor − 1)/2, floor 1
/// e. taken multiplier damage ×= damage_taken(target), consume on-hit sources
/// f. flat reduction   damage -= Σ flat_reduction(target), floor 0, consume
/// g. shields          absorb in instance order, consume absorbers
/// h. critical roll    chance = Σ crit_chance(source);
///                     damage ×= crit_multiplier(source) + Σ crit_damage(source)
/// i. on-crit consumption on the source
/// j. outer multiplier (second-hit factor)
/// k. mark synergy     flat bonus or cooldown reset, selected by ability
/// ```
///
/// The amount is carried as `f32` and rounded half-up once at the end.
/// The resolver reads state but never mutates it; consumption is reported in
/// the returned [`DamageOutcome`] and applied by the caller.
pub fn resolve_damage(
    state: &GameState,
    env: &CoreEnv<'_>,
    ability: &AbilityDefinition,
    source: UnitId,
    target: UnitId,
    is_overload: bool,
    multiplier: f32,
) -> Result<DamageOutcome, OracleError> {
    resolve_strike(state, env, ability, source, target, is_overload, multiplier, 0)
}

/// [`resolve_damage`] with an explicit strike index, used by multi-hit
/// abilities so the second strike rolls independently of the first.
#[allow(clippy::too_many_arguments)]
pub fn resolve_strike(
    state: &GameState,
    env: &CoreEnv<'_>,
    ability: &AbilityDefinition,
    source: UnitId,
    target: UnitId,
    is_overload: bool,
    multiplier: f32,
    strike: u32,
) -> Result<DamageOutcome, OracleError> {
    let config = env.config()?.rules();
    let rng = env.rng()?;
    let nonce = state.turn.nonce;
    let ctx = |base: u32| base + strike * CTX_STRIKE_STRIDE;

    // a. Accuracy roll.
    let accuracy = status::stat_modifier(state, env, source, Attribute::Accuracy)?;
    let hit_chance = config.base_hit_chance * accuracy;
    let hit_seed = compute_seed(config.game_seed, nonce, source.0, ctx(CTX_HIT));
    if !rng.chance(hit_seed, hit_chance) {
        return Ok(DamageOutcome::whiff(AttackOutcome::Miss));
    }

    // b. Dodge roll.
    let dodge_chance = status::stat_modifier(state, env, target, Attribute::Dodge)?.clamp(0.0, 1.0);
    let dodge_seed = compute_seed(config.game_seed, nonce, target.0, ctx(CTX_DODGE));
    if dodge_chance > 0.0 && rng.chance(dodge_seed, dodge_chance) {
        return Ok(DamageOutcome::whiff(AttackOutcome::Dodged));
    }

    let mut consumed_target: Vec<StatusKind> = Vec::new();
    let mut consumed_source: Vec<StatusKind> = Vec::new();

    // c. Base damage with the overload multiplier when supported.
    let overload_multiplier = match (is_overload, ability.overload) {
        (true, Some(spec)) => spec.damage_multiplier,
        _ => 1.0,
    };
    let mut damage = ability.damage as f32 * overload_multiplier;

    // d. Armor reduction.
    let armor = status::stat_modifier(state, env, target, Attribute::Armor)?;
    if armor > 1.0 {
        let reduction = damage * ((armor - 1.0) / 2.0);
        damage = (damage - reduction).max(1.0);
    }

    // e. Percentage damage-taken multiplier, consuming flagged contributors.
    let taken = status::stat_modifier(state, env, target, Attribute::DamageTaken)?;
    damage *= taken;
    collect_consumed(
        state,
        env,
        target,
        RemovalTriggers::ON_HIT,
        |def| def.modifiers.iter().any(|m| m.attribute == Attribute::DamageTaken),
        &mut consumed_target,
    )?;

    // f. Flat damage reduction, consuming flagged contributors.
    let flat = flat_reduction(state, env, target)?;
    damage = (damage - flat as f32).max(0.0);
    collect_consumed(
        state,
        env,
        target,
        RemovalTriggers::ON_HIT,
        |def| def.flat_reduction > 0,
        &mut consumed_target,
    )?;

    // g. Shield absorption in instance order.
    damage = absorb_shields(state, env, target, damage, &mut consumed_target)?;

    // h. Critical roll: additive chance, multiplier plus additive bonus.
    let crit_chance = status::stat_modifier(state, env, source, Attribute::CritChance)?;
    let crit_seed = compute_seed(config.game_seed, nonce, source.0, ctx(CTX_CRIT));
    let critical = crit_chance > 0.0 && rng.chance(crit_seed, crit_chance);
    if critical {
        let crit_bonus = status::stat_modifier(state, env, source, Attribute::CritDamage)?;
        let base_multiplier = state
            .units
            .get(source)
            .map(|u| u.crit_multiplier)
            .unwrap_or(1.0);
        damage *= base_multiplier + crit_bonus;

        // i. Attacker remove-on-crit effects are spent by the crit itself.
        collect_consumed(
            state,
            env,
            source,
            RemovalTriggers::ON_CRIT,
            |_| true,
            &mut consumed_source,
        )?;
    }

    // j. Outer multiplier (second hits).
    damage *= multiplier;

    let mut amount = round_half_up(damage);

    // k. Ability-identity mark synergy, only when the hit dealt damage.
    let mut reset_source_cooldowns = false;
    if amount > 0 {
        if let Some(synergy) = ability.mark_synergy {
            let target_has = |kind: StatusKind| {
                state
                    .units
                    .get(target)
                    .is_some_and(|u| u.status_effects.has(kind))
            };
            match synergy {
                MarkSynergy::BonusDamage { mark, bonus } if target_has(mark) => {
                    amount += bonus;
                    consumed_target.push(mark);
                }
                MarkSynergy::CooldownReset { mark } if target_has(mark) => {
                    reset_source_cooldowns = true;
                    consumed_target.push(mark);
                }
                _ => {}
            }
        }
    }

    // A damaging hit also spends the attacker's remove-on-deal-hit effects.
    if amount > 0 {
        collect_consumed(
            state,
            env,
            source,
            RemovalTriggers::ON_DEAL_HIT,
            |_| true,
            &mut consumed_source,
        )?;
    }

    Ok(DamageOutcome {
        outcome: if critical {
            AttackOutcome::Critical
        } else {
            AttackOutcome::Hit
        },
        amount,
        consumed_target,
        consumed_source,
        reset_source_cooldowns,
    })
}

/// Sum of flat damage reduction across the target's instances.
fn flat_reduction(
    state: &GameState,
    env: &CoreEnv<'_>,
    target: UnitId,
) -> Result<u32, OracleError> {
    let mut total = 0u32;
    if let Some(unit) = state.units.get(target) {
        for instance in unit.status_effects.iter() {
            total += env.status_def(instance.kind)?.flat_reduction;
        }
    }
    Ok(total)
}

/// Shields absorb in instance order; every flagged instance that absorbed a
/// nonzero amount is consumed.
fn absorb_shields(
    state: &GameState,
    env: &CoreEnv<'_>,
    target: UnitId,
    mut damage: f32,
    consumed: &mut Vec<StatusKind>,
) -> Result<f32, OracleError> {
    let Some(unit) = state.units.get(target) else {
        return Ok(damage);
    };
    for instance in unit.status_effects.iter() {
        if damage <= 0.0 {
            break;
        }
        let def = env.status_def(instance.kind)?;
        if def.shield == 0 {
            continue;
        }
        let absorbed = damage.min(def.shield as f32);
        damage -= absorbed;
        if absorbed > 0.0 && def.removal.contains(RemovalTriggers::ON_HIT) {
            consumed.push(instance.kind);
        }
    }
    Ok(damage.max(0.0))
}

/// Collects the kinds on `unit` whose definitions carry `trigger` and match
/// `filter`, appending each instance once.
fn collect_consumed(
    state: &GameState,
    env: &CoreEnv<'_>,
    unit: UnitId,
    trigger: RemovalTriggers,
    filter: impl Fn(&crate::env::StatusEffectDefinition) -> bool,
    out: &mut Vec<StatusKind>,
) -> Result<(), OracleError> {
    let Some(unit) = state.units.get(unit) else {
        return Ok(());
    };
    for instance in unit.status_effects.iter() {
        let def = env.status_def(instance.kind)?;
        if def.removal.contains(trigger) && filter(def) {
            out.push(instance.kind);
        }
    }
    Ok(())
}
