//! Zone effect application: steady ticks, entry effects, turn-end behaviors.

use std::collections::BTreeSet;

use tracing::debug;

use crate::env::{CoreEnv, OracleError, StatusKind, ZoneTurnEnd, compute_seed};
use crate::state::{GameState, Position, UnitId, ZoneInstanceId};
use crate::status;

use super::passes_filter;

/// Roll contexts for zone behaviors, disjoint from the combat contexts.
const CTX_SCATTER: u32 = 3;
const CTX_BLESSING: u32 = 4;

/// Steady-state tick: applies periodic damage/heal and refreshes granted
/// statuses for every unit contained in every active zone.
///
/// Containment is Manhattan distance within the radius. Granted statuses are
/// refreshed to the zone's current remaining duration; units that left since
/// the previous tick have them explicitly removed. Zones declaring a
/// turn-end behavior skip this tick entirely.
///
/// Fired on every movement/aura phase entry.
pub fn apply_zone_effects(state: &mut GameState, env: &CoreEnv<'_>) -> Result<(), OracleError> {
    for id in state.zones.ids() {
        let Some(zone) = state.zones.get(id) else {
            continue;
        };
        if !zone.is_active() {
            continue;
        }

        let def = env.zone_def(zone.definition)?;
        if def.turn_end.is_some() {
            continue;
        }

        let owner_team = match state.units.get(zone.owner) {
            Some(owner) => owner.team,
            None => continue,
        };
        let center = zone.position;
        let radius = def.radius;
        let grant_duration = if def.permanent {
            def.duration
        } else {
            zone.remaining
        };
        let owner = zone.owner;
        let previous = zone.affected_this_tick.clone();

        // Resolve containment before touching any unit.
        let contained: BTreeSet<UnitId> = state
            .units
            .iter()
            .filter(|u| {
                u.is_alive()
                    && u.position.manhattan(center) <= radius
                    && passes_filter(def.allegiance, owner_team, u.team)
            })
            .map(|u| u.id)
            .collect();

        let tick_damage = def.tick_damage;
        let tick_heal = def.tick_heal;
        let grants = def.grants.clone();

        for &unit_id in &contained {
            if let Some(unit) = state.units.get_mut(unit_id) {
                if tick_damage > 0 {
                    unit.apply_damage(tick_damage);
                }
                if tick_heal > 0 {
                    unit.apply_heal(tick_heal);
                }
            }
            for &kind in &grants {
                status::apply(state, env, unit_id, kind, Some(grant_duration), Some(owner))?;
            }
        }

        // Units that left since the last tick lose the granted effects.
        for &unit_id in previous.difference(&contained) {
            for &kind in &grants {
                status::remove(state, env, unit_id, kind)?;
            }
        }

        if let Some(zone) = state.zones.get_mut(id) {
            zone.affected_last_tick = previous;
            zone.affected_this_tick = contained;
        }
    }
    Ok(())
}

/// Entry-only effects: fired when a position change brings a unit inside a
/// zone it was previously outside of.
///
/// Unlike the steady tick, the applied effect uses its own default duration,
/// not the zone's remaining duration.
pub fn on_unit_moved(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    unit_id: UnitId,
    from: Position,
    to: Position,
) -> Result<(), OracleError> {
    let unit_team = match state.units.get(unit_id) {
        Some(unit) => unit.team,
        None => return Ok(()),
    };

    let mut entries: Vec<(StatusKind, UnitId)> = Vec::new();
    for zone in state.zones.iter() {
        if !zone.is_active() {
            continue;
        }
        let def = env.zone_def(zone.definition)?;
        let Some(effect) = def.entry_effect else {
            continue;
        };
        let was_in = from.manhattan(zone.position) <= def.radius;
        let now_in = to.manhattan(zone.position) <= def.radius;
        if was_in || !now_in {
            continue;
        }
        let owner_team = match state.units.get(zone.owner) {
            Some(owner) => owner.team,
            None => continue,
        };
        if passes_filter(def.allegiance, owner_team, unit_team) {
            entries.push((effect, zone.owner));
        }
    }

    for (effect, owner) in entries {
        debug!(%unit_id, %effect, "zone entry effect");
        status::apply(state, env, unit_id, effect, None, Some(owner))?;
    }
    Ok(())
}

/// Turn-end behaviors: evaluated once per turn after all steady ticks, for
/// zones that declare one. Each zone type performs exactly its declared
/// behavior; none of them also run the generic tick.
pub fn apply_turn_end_effects(state: &mut GameState, env: &CoreEnv<'_>) -> Result<(), OracleError> {
    let game_seed = env.config()?.rules().game_seed;
    let nonce = state.turn.nonce;

    for id in state.zones.ids() {
        let Some(zone) = state.zones.get(id) else {
            continue;
        };
        if !zone.is_active() {
            continue;
        }
        let def = env.zone_def(zone.definition)?;
        let Some(behavior) = def.turn_end else {
            continue;
        };
        let owner_team = match state.units.get(zone.owner) {
            Some(owner) => owner.team,
            None => continue,
        };
        let center = zone.position;
        let radius = def.radius;
        let allegiance = def.allegiance;

        let occupants: Vec<UnitId> = state
            .units
            .iter()
            .filter(|u| {
                u.is_alive()
                    && u.position.manhattan(center) <= radius
                    && passes_filter(allegiance, owner_team, u.team)
            })
            .map(|u| u.id)
            .collect();

        match behavior {
            ZoneTurnEnd::Pulse { damage } => {
                for unit_id in occupants {
                    if let Some(unit) = state.units.get_mut(unit_id) {
                        unit.apply_damage(damage);
                    }
                }
            }
            ZoneTurnEnd::Scatter => {
                for unit_id in occupants {
                    scatter_unit(state, env, id, unit_id, game_seed, nonce)?;
                }
            }
            ZoneTurnEnd::Blessing { chance, effect } => {
                let rng = env.rng()?;
                for unit_id in occupants {
                    let seed = compute_seed(game_seed, nonce, unit_id.0, CTX_BLESSING);
                    if rng.chance(seed, chance) {
                        status::apply(state, env, unit_id, effect, None, None)?;
                    }
                }
            }
        }
    }
    Ok(())
}

/// Throws one occupant to a random free neighboring tile, firing entry
/// effects for any zone the displacement lands them in.
fn scatter_unit(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    zone_id: ZoneInstanceId,
    unit_id: UnitId,
    game_seed: u64,
    nonce: u64,
) -> Result<(), OracleError> {
    let grid = env.grid()?;
    let rng = env.rng()?;

    let Some(from) = state.units.get(unit_id).map(|u| u.position) else {
        return Ok(());
    };
    let candidates: Vec<Position> = grid
        .neighbors(from, false)
        .into_iter()
        .filter(|&p| grid.is_passable(p) && !state.units.is_occupied(p))
        .collect();
    if candidates.is_empty() {
        return Ok(());
    }

    let seed = compute_seed(game_seed, nonce, unit_id.0, CTX_SCATTER);
    let to = candidates[rng.pick(seed, candidates.len())];
    if let Some(unit) = state.units.get_mut(unit_id) {
        unit.position = to;
    }
    debug!(%unit_id, %zone_id, %from, %to, "scattered by zone");
    on_unit_moved(state, env, unit_id, from, to)?;
    Ok(())
}
