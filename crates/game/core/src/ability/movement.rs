//! Ability movement resolution.
//!
//! Destinations are computed deterministically: candidate tiles are scanned
//! in a fixed order and the nearest valid, unoccupied one to the relevant
//! anchor wins, ties broken by first-found in scan order. If no candidate
//! qualifies the displacement is skipped; by the time movement resolves the
//! pipeline has already mutated state and runs to completion.

use crate::env::{CoreEnv, MovementKind, OracleError};
use crate::state::{GameState, Position, UnitId};
use crate::zone;

/// A displacement applied by an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    pub unit: UnitId,
    pub from: Position,
    pub to: Position,
}

/// Resolves and applies the ability's movement component.
///
/// Returns the displacement that happened, if any. Entry-only zone effects
/// fire for the displaced unit.
pub fn resolve_movement(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    kind: MovementKind,
    source: UnitId,
    target_position: Position,
    target_unit: Option<UnitId>,
) -> Result<Option<MoveRecord>, OracleError> {
    let record = match kind {
        MovementKind::None => None,

        MovementKind::DashToAdjacent => {
            let anchor = unit_position(state, source);
            let candidates = env.grid()?.neighbors(target_position, true);
            pick_destination(state, env, &candidates, anchor)?
                .and_then(|to| displace(state, source, to))
        }

        MovementKind::TeleportToTarget => {
            let grid = env.grid()?;
            if grid.is_passable(target_position) && !state.units.is_occupied(target_position) {
                displace(state, source, target_position)
            } else {
                None
            }
        }

        MovementKind::PullTarget => {
            let Some(target) = target_unit else {
                return Ok(None);
            };
            let caster_position = unit_position(state, source);
            let Some(caster_position) = caster_position else {
                return Ok(None);
            };
            let anchor = unit_position(state, target);
            let candidates = env.grid()?.neighbors(caster_position, true);
            pick_destination(state, env, &candidates, anchor)?
                .and_then(|to| displace(state, target, to))
        }

        MovementKind::PushTarget { distance } => {
            let Some(target) = target_unit else {
                return Ok(None);
            };
            push_destination(state, env, source, target, distance)?
                .and_then(|to| displace(state, target, to))
        }
    };

    if let Some(record) = record {
        zone::on_unit_moved(state, env, record.unit, record.from, record.to)?;
    }
    Ok(record)
}

fn unit_position(state: &GameState, unit: UnitId) -> Option<Position> {
    state.units.get(unit).map(|u| u.position)
}

/// Nearest valid, unoccupied candidate to the anchor; ties break by scan
/// order. `None` when every candidate is blocked.
fn pick_destination(
    state: &GameState,
    env: &CoreEnv<'_>,
    candidates: &[Position],
    anchor: Option<Position>,
) -> Result<Option<Position>, OracleError> {
    let grid = env.grid()?;
    let mut best: Option<(u32, Position)> = None;
    for (index, &candidate) in candidates.iter().enumerate() {
        if !grid.is_passable(candidate) || state.units.is_occupied(candidate) {
            continue;
        }
        let distance = anchor.map(|a| a.manhattan(candidate)).unwrap_or(index as u32);
        match best {
            Some((best_distance, _)) if best_distance <= distance => {}
            _ => best = Some((distance, candidate)),
        }
    }
    Ok(best.map(|(_, position)| position))
}

/// Push destination: step outward from the caster along the sign direction,
/// farthest tile first, falling back toward the target until a free tile
/// appears.
fn push_destination(
    state: &GameState,
    env: &CoreEnv<'_>,
    source: UnitId,
    target: UnitId,
    distance: u32,
) -> Result<Option<Position>, OracleError> {
    let grid = env.grid()?;
    let (Some(source_position), Some(target_position)) =
        (unit_position(state, source), unit_position(state, target))
    else {
        return Ok(None);
    };

    let dx = (target_position.x - source_position.x).signum();
    let dy = (target_position.y - source_position.y).signum();
    if dx == 0 && dy == 0 {
        return Ok(None);
    }

    for step in (1..=distance as i32).rev() {
        let candidate = target_position.offset(dx * step, dy * step);
        if grid.is_passable(candidate) && !state.units.is_occupied(candidate) {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

fn displace(state: &mut GameState, unit: UnitId, to: Position) -> Option<MoveRecord> {
    let moved = state.units.get_mut(unit)?;
    let from = moved.position;
    if from == to {
        return None;
    }
    moved.position = to;
    Some(MoveRecord { unit, from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Fixture, duel_state};

    #[test]
    fn dash_lands_adjacent_to_target_nearest_caster() {
        let fx = Fixture::new();
        let mut state = duel_state();

        // Caster #1 at (1,1), target tile (4,1): nearest free neighbor
        // toward the caster is (3,1).
        let record = resolve_movement(
            &mut state,
            &fx.env(),
            MovementKind::DashToAdjacent,
            UnitId(1),
            Position::new(4, 1),
            None,
        )
        .unwrap()
        .expect("dash should move");
        assert_eq!(record.to, Position::new(3, 1));
        assert_eq!(state.unit(UnitId(1)).unwrap().position, Position::new(3, 1));
    }

    #[test]
    fn teleport_requires_free_tile() {
        let fx = Fixture::new();
        let mut state = duel_state();

        // Target tile occupied by #2: teleport is skipped, not an error.
        let record = resolve_movement(
            &mut state,
            &fx.env(),
            MovementKind::TeleportToTarget,
            UnitId(1),
            Position::new(5, 1),
            None,
        )
        .unwrap();
        assert!(record.is_none());
        assert_eq!(state.unit(UnitId(1)).unwrap().position, Position::new(1, 1));

        let record = resolve_movement(
            &mut state,
            &fx.env(),
            MovementKind::TeleportToTarget,
            UnitId(1),
            Position::new(7, 7),
            None,
        )
        .unwrap();
        assert_eq!(record.unwrap().to, Position::new(7, 7));
    }

    #[test]
    fn pull_brings_target_beside_caster() {
        let fx = Fixture::new();
        let mut state = duel_state();

        let record = resolve_movement(
            &mut state,
            &fx.env(),
            MovementKind::PullTarget,
            UnitId(1),
            Position::new(5, 1),
            Some(UnitId(2)),
        )
        .unwrap()
        .expect("pull should move");
        // Nearest free neighbor of the caster to the target's old tile.
        assert_eq!(record.unit, UnitId(2));
        assert_eq!(record.to, Position::new(2, 1));
    }

    #[test]
    fn push_throws_target_away_from_caster() {
        let fx = Fixture::new();
        let mut state = duel_state();

        let record = resolve_movement(
            &mut state,
            &fx.env(),
            MovementKind::PushTarget { distance: 2 },
            UnitId(1),
            Position::new(5, 1),
            Some(UnitId(2)),
        )
        .unwrap()
        .expect("push should move");
        assert_eq!(record.to, Position::new(7, 1));
    }

    #[test]
    fn push_falls_back_when_far_tile_blocked() {
        let fx = Fixture::new();
        let mut state = duel_state();
        // Occupy the two-step tile; push falls back to one step.
        state.units.get_mut(UnitId(1)).unwrap().position = Position::new(4, 1);
        state
            .units
            .insert(crate::state::UnitState::new(
                UnitId(3),
                crate::state::Team::Sun,
                Position::new(7, 1),
                20,
                5,
            ));

        let record = resolve_movement(
            &mut state,
            &fx.env(),
            MovementKind::PushTarget { distance: 2 },
            UnitId(1),
            Position::new(5, 1),
            Some(UnitId(2)),
        )
        .unwrap()
        .expect("push should move");
        assert_eq!(record.to, Position::new(6, 1));
    }
}
