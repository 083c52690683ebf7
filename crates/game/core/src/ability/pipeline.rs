//! Ability execution orchestration.
//!
//! Execution flow:
//! 1. Validate everything (no mutation happens before every check passes)
//! 2. Debit the aura cost through the ledger strategy
//! 3. Apply the cooldown
//! 4. Resolve the movement component
//! 5. Apply combat effects (area fan-out or single resolved target)
//! 6. Apply the status list (or the hard-coded binding)
//! 7. Create the configured zone (first strike only)
//! 8. Repeat 5–6 for the second strike with its multiplier

use tracing::{debug, error, warn};

use crate::combat;
use crate::env::{AbilityBinding, AbilityDefinition, CoreEnv, TargetFlags};
use crate::state::{GameState, Position, Team, UnitId};
use crate::status;
use crate::turn;
use crate::zone;

use super::movement::resolve_movement;
use super::{AbilityError, AbilityOutcome, AbilityUse, AuraLedger, HealRecord, StrikeRecord};

/// Executes one ability cast. See the module docs for the step order.
pub fn execute(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    ledger: &mut dyn AuraLedger,
    use_: &AbilityUse,
) -> Result<AbilityOutcome, AbilityError> {
    let def = env
        .ability_def(use_.ability)
        .inspect_err(|err| error!(%err, "ability cast aborted"))?;

    // ------------------------------------------------------------------
    // 1. Validation: completes in full before any mutation.
    // ------------------------------------------------------------------
    let source = state
        .units
        .get(use_.source)
        .ok_or(AbilityError::SourceNotFound)?;
    if !source.is_alive() {
        return Err(AbilityError::SourceDead);
    }
    let source_team = source.team;
    let source_position = source.position;

    if !status::can_act(state, use_.source) {
        return Err(AbilityError::CannotAct);
    }
    turn::may_cast(state, env, use_.source)?;

    if source.aura.current < def.cost {
        return Err(AbilityError::InsufficientAura);
    }
    if !source.ability_ready(use_.ability, state.turn.number) {
        return Err(AbilityError::OnCooldown);
    }

    let (target_position, target_unit) = resolve_target(state, env, def, use_)?;

    if let Some(AbilityBinding::TetherPair { .. }) = def.binding {
        let valid_pair = use_
            .second_target
            .and_then(|id| state.units.get(id))
            .is_some_and(|u| u.is_alive());
        if !valid_pair {
            return Err(AbilityError::InvalidTarget);
        }
    }

    let range_base = def.range + zone_range_bonus(state, env, use_, source_position)?;
    let effective_range = status::effective_range(state, env, use_.source, range_base)?;
    if source_position.manhattan(target_position) > effective_range {
        return Err(AbilityError::OutOfRange);
    }

    // ------------------------------------------------------------------
    // 2. Debit. 3. Cooldown. From here on the cast runs to completion.
    // ------------------------------------------------------------------
    ledger.debit(state, use_.source, def.cost)?;

    if def.cooldown > 0 {
        let until = state.turn.number + def.cooldown;
        if let Some(unit) = state.units.get_mut(use_.source) {
            unit.set_cooldown(use_.ability, until);
        }
    }

    let mut outcome = AbilityOutcome::default();

    // ------------------------------------------------------------------
    // 4. Movement, then re-resolve the effective target for ground casts.
    // ------------------------------------------------------------------
    outcome.displacement = resolve_movement(
        state,
        env,
        def.movement,
        use_.source,
        target_position,
        target_unit,
    )?;

    let effective_target = if def.is_ground_targeted() && def.area == 0 {
        state
            .units
            .living_at(target_position)
            .filter(|u| u.id != use_.source)
            .map(|u| u.id)
            .or(target_unit)
    } else {
        target_unit
    };

    // ------------------------------------------------------------------
    // 5 + 6. Combat effects and statuses, first strike.
    // ------------------------------------------------------------------
    let affected = affected_units(state, env, def, use_.source, source_team, target_position, effective_target)?;
    apply_strike_round(state, env, def, use_, &affected, 1.0, 0, true, &mut outcome)?;

    // ------------------------------------------------------------------
    // 7. Zone creation, first strike only.
    // ------------------------------------------------------------------
    if let Some(zone_id) = def.zone {
        match zone::create(state, env, zone_id, target_position, use_.source) {
            Ok(placement) => outcome.zone = Some(placement),
            Err(err) => warn!(%zone_id, %err, "zone creation skipped"),
        }
    }

    // ------------------------------------------------------------------
    // 8. Second strike: same targets, secondary multiplier, no push/zone.
    // ------------------------------------------------------------------
    if let Some(second) = def.second_hit {
        apply_strike_round(
            state,
            env,
            def,
            use_,
            &affected,
            second.damage_multiplier,
            1,
            false,
            &mut outcome,
        )?;
    }

    turn::record_cast(state, use_.source);
    debug!(ability = %use_.ability, source = %use_.source, "ability resolved");
    Ok(outcome)
}

/// Resolves the declared target into a position and an optional unit,
/// enforcing the targeting flags.
fn resolve_target(
    state: &GameState,
    env: &CoreEnv<'_>,
    def: &AbilityDefinition,
    use_: &AbilityUse,
) -> Result<(Position, Option<UnitId>), AbilityError> {
    let source_team = state
        .units
        .get(use_.source)
        .map(|u| u.team)
        .ok_or(AbilityError::SourceNotFound)?;

    if let Some(target_id) = use_.target_unit {
        let target = state
            .units
            .get(target_id)
            .ok_or(AbilityError::TargetNotFound)?;
        if !target.is_alive() {
            return Err(AbilityError::InvalidTarget);
        }
        if !class_allowed(def.targeting, use_.source, source_team, target_id, target.team) {
            return Err(AbilityError::InvalidTarget);
        }
        Ok((target.position, Some(target_id)))
    } else {
        if !def.targeting.contains(TargetFlags::GROUND) {
            return Err(AbilityError::InvalidTarget);
        }
        if !env.grid()?.contains(use_.target_position) {
            return Err(AbilityError::InvalidTarget);
        }
        Ok((use_.target_position, None))
    }
}

/// Whether a unit falls in a target class the ability accepts.
fn class_allowed(
    flags: TargetFlags,
    source: UnitId,
    source_team: Team,
    unit: UnitId,
    unit_team: Team,
) -> bool {
    if unit == source {
        flags.contains(TargetFlags::SELF)
    } else if unit_team == source_team {
        flags.contains(TargetFlags::ALLY)
    } else {
        flags.contains(TargetFlags::ENEMY)
    }
}

/// Range bonus from a zone the caster stands in, zero when the claim does
/// not hold up.
fn zone_range_bonus(
    state: &GameState,
    env: &CoreEnv<'_>,
    use_: &AbilityUse,
    source_position: Position,
) -> Result<u32, AbilityError> {
    let Some(zone_id) = use_.zone else {
        return Ok(0);
    };
    let Some(instance) = state.zones.get(zone_id) else {
        debug!(%zone_id, "claimed zone does not exist, bonus ignored");
        return Ok(0);
    };
    if !instance.is_active() {
        return Ok(0);
    }
    let def = env.zone_def(instance.definition)?;
    if source_position.manhattan(instance.position) > def.radius {
        debug!(%zone_id, "caster outside claimed zone, bonus ignored");
        return Ok(0);
    }
    Ok(def.range_bonus)
}

/// Units the combat/status steps touch: the area fan-out for ground-target
/// area casts, otherwise the single resolved target.
fn affected_units(
    state: &GameState,
    env: &CoreEnv<'_>,
    def: &AbilityDefinition,
    source: UnitId,
    source_team: Team,
    target_position: Position,
    effective_target: Option<UnitId>,
) -> Result<Vec<UnitId>, AbilityError> {
    if def.area > 0 && def.is_ground_targeted() {
        let cells = env.grid()?.positions_within(target_position, def.area);
        Ok(state
            .units
            .iter()
            .filter(|u| {
                u.is_alive()
                    && cells.contains(&u.position)
                    && class_allowed(def.targeting, source, source_team, u.id, u.team)
            })
            .map(|u| u.id)
            .collect())
    } else {
        Ok(effective_target.into_iter().collect())
    }
}

/// One round of steps 5–6 over the affected set.
#[allow(clippy::too_many_arguments)]
fn apply_strike_round(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    def: &AbilityDefinition,
    use_: &AbilityUse,
    affected: &[UnitId],
    multiplier: f32,
    strike: u32,
    first_strike: bool,
    outcome: &mut AbilityOutcome,
) -> Result<(), AbilityError> {
    // 5. Combat effects.
    for &target in affected {
        if def.damage > 0 {
            let result = combat::resolve_strike(
                state,
                env,
                def,
                use_.source,
                target,
                use_.overload,
                multiplier,
                strike,
            )?;

            if let Some(unit) = state.units.get_mut(target) {
                unit.apply_damage(result.amount);
            }
            for &kind in &result.consumed_target {
                status::remove(state, env, target, kind)?;
            }
            for &kind in &result.consumed_source {
                status::remove(state, env, use_.source, kind)?;
            }
            if result.reset_source_cooldowns {
                if let Some(unit) = state.units.get_mut(use_.source) {
                    unit.reset_cooldowns();
                }
            }
            outcome.strikes.push(StrikeRecord { target, result });
        }

        if first_strike && def.heal > 0 {
            let heal = combat::resolve_healing(def, use_.overload);
            if let Some(unit) = state.units.get_mut(target) {
                unit.apply_heal(heal.amount);
            }
            outcome.heals.push(HealRecord {
                target,
                amount: heal.amount,
            });
        }
    }

    // 6. Status application: the hard-coded binding bypasses the generic
    // list and registers the tether relation.
    match def.binding {
        Some(AbilityBinding::TetherPair { effect, duration }) if first_strike => {
            if let (Some(first), Some(second)) = (use_.target_unit, use_.second_target) {
                status::apply(state, env, first, effect, duration, Some(use_.source))?;
                status::apply(state, env, second, effect, duration, Some(use_.source))?;
                state.links.link(first, second);
            }
        }
        Some(_) => {}
        None => {
            for &target in affected {
                for application in &def.statuses {
                    status::apply(
                        state,
                        env,
                        target,
                        application.kind,
                        application.duration,
                        Some(use_.source),
                    )?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::LocalLedger;
    use crate::env::{
        AbilityDefinition, AbilityId, MovementKind, StatusEffectDefinition, StatusKind,
        ZoneDefinition, ZoneId,
    };
    use crate::phase::TurnPhase;
    use crate::state::{PhaseState, UnitState};
    use crate::testutil::{Fixture, duel_state};
    use crate::zone::ZonePlacement;

    /// Fixture in Sun's first casting window with one authored strike.
    fn cast_ready() -> (Fixture, GameState) {
        let mut fx = Fixture::new();
        fx.abilities.0 = vec![
            AbilityDefinition::new(AbilityId(1), TargetFlags::ENEMY, 6)
                .with_cost(2)
                .with_damage(10),
        ];
        let mut state = duel_state();
        state.phase = PhaseState::enter(TurnPhase::AuraSun1);
        (fx, state)
    }

    fn cast(state: &mut GameState, fx: &Fixture, use_: &AbilityUse) -> Result<AbilityOutcome, AbilityError> {
        execute(state, &fx.env(), &mut LocalLedger, use_)
    }

    #[test]
    fn successful_cast_debits_cools_down_and_damages() {
        let (mut fx, mut state) = cast_ready();
        fx.abilities.0[0].cooldown = 2;

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        let outcome = cast(&mut state, &fx, &use_).unwrap();

        assert_eq!(outcome.strikes.len(), 1);
        assert_eq!(outcome.strikes[0].result.amount, 10);
        assert_eq!(state.unit(UnitId(2)).unwrap().hp.current, 10);
        assert_eq!(state.unit(UnitId(1)).unwrap().aura.current, 3);
        assert!(!state.unit(UnitId(1)).unwrap().ability_ready(AbilityId(1), state.turn.number));
        assert!(state.turn.cast_this_phase.contains(&UnitId(1)));
    }

    #[test]
    fn rejected_cast_mutates_nothing() {
        let (fx, mut state) = cast_ready();
        state.units.get_mut(UnitId(1)).unwrap().aura.current = 1;

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        assert_eq!(cast(&mut state, &fx, &use_), Err(AbilityError::InsufficientAura));

        assert_eq!(state.unit(UnitId(2)).unwrap().hp.current, 20);
        assert_eq!(state.unit(UnitId(1)).unwrap().aura.current, 1);
        assert!(state.turn.cast_this_phase.is_empty());
    }

    #[test]
    fn out_of_range_cast_is_rejected() {
        let (mut fx, mut state) = cast_ready();
        fx.abilities.0[0].range = 2;

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        assert_eq!(cast(&mut state, &fx, &use_), Err(AbilityError::OutOfRange));
    }

    #[test]
    fn out_of_phase_cast_is_rejected() {
        let (fx, mut state) = cast_ready();
        state.phase = PhaseState::enter(TurnPhase::Movement);

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        assert!(matches!(
            cast(&mut state, &fx, &use_),
            Err(AbilityError::NotPermitted(_))
        ));
    }

    #[test]
    fn cooldown_blocks_until_turns_pass() {
        let (mut fx, mut state) = cast_ready();
        fx.abilities.0[0].cooldown = 2;
        fx.config.casts_per_phase = 2;
        state.turn.number = 1;

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        cast(&mut state, &fx, &use_).unwrap();

        state.turn.cast_this_phase.clear();
        assert_eq!(cast(&mut state, &fx, &use_), Err(AbilityError::OnCooldown));

        // Two turns later the ability is ready again.
        state.turn.number = 3;
        state.turn.cast_this_phase.clear();
        state.turn.casts_this_phase = 0;
        cast(&mut state, &fx, &use_).unwrap();
    }

    #[test]
    fn ground_area_cast_hits_enemies_in_radius_only() {
        let (mut fx, mut state) = cast_ready();
        fx.abilities.0[0].targeting = TargetFlags::ENEMY | TargetFlags::GROUND;
        fx.abilities.0[0].area = 1;
        state
            .units
            .insert(UnitState::new(UnitId(3), Team::Moon, Position::new(5, 2), 20, 5));
        state
            .units
            .insert(UnitState::new(UnitId(4), Team::Sun, Position::new(5, 0), 20, 5));

        let use_ = AbilityUse::on_ground(AbilityId(1), UnitId(1), Position::new(5, 1));
        let outcome = cast(&mut state, &fx, &use_).unwrap();

        // Moon units at distance ≤ 1 are hit; the Sun bystander is not.
        assert_eq!(outcome.strikes.len(), 2);
        assert_eq!(state.unit(UnitId(2)).unwrap().hp.current, 10);
        assert_eq!(state.unit(UnitId(3)).unwrap().hp.current, 10);
        assert_eq!(state.unit(UnitId(4)).unwrap().hp.current, 20);
    }

    #[test]
    fn status_list_lands_on_struck_target() {
        let (mut fx, mut state) = cast_ready();
        fx.statuses.0 = vec![StatusEffectDefinition::new(StatusKind::Exposed).with_duration(2)];
        fx.abilities.0[0].statuses = vec![crate::env::StatusApplication {
            kind: StatusKind::Exposed,
            duration: None,
        }];

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        cast(&mut state, &fx, &use_).unwrap();
        assert!(state.unit(UnitId(2)).unwrap().status_effects.has(StatusKind::Exposed));
    }

    #[test]
    fn tether_binding_links_both_targets() {
        let (mut fx, mut state) = cast_ready();
        fx.statuses.0 = vec![StatusEffectDefinition::new(StatusKind::Tethered)
            .with_duration(3)
            .linked()];
        fx.abilities.0[0].damage = 0;
        fx.abilities.0[0].binding = Some(AbilityBinding::TetherPair {
            effect: StatusKind::Tethered,
            duration: None,
        });
        state
            .units
            .insert(UnitState::new(UnitId(3), Team::Moon, Position::new(6, 1), 20, 5));

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2)).with_second_target(UnitId(3));
        cast(&mut state, &fx, &use_).unwrap();

        assert!(state.unit(UnitId(2)).unwrap().status_effects.has(StatusKind::Tethered));
        assert!(state.unit(UnitId(3)).unwrap().status_effects.has(StatusKind::Tethered));
        assert_eq!(state.links.partner(UnitId(2)), Some(UnitId(3)));
    }

    #[test]
    fn zone_created_on_first_strike_only() {
        let (mut fx, mut state) = cast_ready();
        fx.zones.0 = vec![ZoneDefinition::new(ZoneId(7), 1, 3)];
        fx.abilities.0[0].targeting = TargetFlags::ENEMY | TargetFlags::GROUND;
        fx.abilities.0[0].zone = Some(ZoneId(7));
        fx.abilities.0[0].second_hit = Some(crate::env::SecondHit {
            damage_multiplier: 0.5,
        });

        let use_ = AbilityUse::on_ground(AbilityId(1), UnitId(1), Position::new(5, 1));
        let outcome = cast(&mut state, &fx, &use_).unwrap();

        assert!(matches!(outcome.zone, Some(ZonePlacement::Created(_))));
        assert_eq!(state.zones.iter().count(), 1);
        // Second strike resolved against the same target with its own
        // multiplier: 10 then 5.
        assert_eq!(outcome.strikes.len(), 2);
        assert_eq!(outcome.strikes[0].result.amount, 10);
        assert_eq!(outcome.strikes[1].result.amount, 5);
        assert_eq!(state.unit(UnitId(2)).unwrap().hp.current, 5);
    }

    #[test]
    fn dash_cast_repositions_caster_before_damage() {
        let (mut fx, mut state) = cast_ready();
        fx.abilities.0[0].movement = MovementKind::DashToAdjacent;

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        let outcome = cast(&mut state, &fx, &use_).unwrap();

        let displacement = outcome.displacement.expect("dash should land");
        assert_eq!(displacement.unit, UnitId(1));
        assert_eq!(displacement.to, Position::new(4, 1));
        assert_eq!(state.unit(UnitId(2)).unwrap().hp.current, 10);
    }

    #[test]
    fn zone_range_bonus_extends_reach() {
        let (mut fx, mut state) = cast_ready();
        fx.abilities.0[0].range = 2;
        fx.zones.0 = vec![ZoneDefinition::new(ZoneId(9), 1, 5).with_range_bonus(2)];
        let placement = zone::create(
            &mut state,
            &fx.env(),
            ZoneId(9),
            Position::new(1, 1),
            UnitId(1),
        )
        .unwrap();
        let ZonePlacement::Created(zone_instance) = placement else {
            panic!("expected creation");
        };

        let unaided = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        assert_eq!(cast(&mut state, &fx, &unaided), Err(AbilityError::OutOfRange));

        let aided = unaided.from_zone(zone_instance);
        cast(&mut state, &fx, &aided).unwrap();
        assert_eq!(state.unit(UnitId(2)).unwrap().hp.current, 10);
    }
}
