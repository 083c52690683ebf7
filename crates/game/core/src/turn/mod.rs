//! Per-turn orchestration: turn-start resets, queued movement, and cast
//! gating.
//!
//! The orchestrator owns the transient per-turn bookkeeping in
//! [`TurnState`]: who queued a move where, who has acted, and how much of
//! each team's allotment is spent. The phase machine drives it through the
//! turn-boundary hooks.

use tracing::debug;

use crate::env::{CoreEnv, OracleError};
use crate::phase::TurnPhase;
use crate::state::{GameState, Position, Team, UnitId};
use crate::status;
use crate::zone;

/// Errors surfaced by move queueing and cast gating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TurnError {
    #[error("unit not found")]
    UnitNotFound,

    #[error("unit is dead")]
    UnitDead,

    #[error("action not allowed in the current phase")]
    OutOfPhase,

    #[error("unit has already acted this turn")]
    AlreadyActed,

    #[error("unit has already cast this phase")]
    AlreadyCast,

    #[error("team's per-phase cast quota is spent")]
    QuotaExhausted,

    #[error("team's move allotment for this turn is spent")]
    MoveLimitReached,

    #[error("moves are being executed, queueing is closed")]
    MovementInProgress,

    #[error("unit cannot move right now")]
    CannotMove,

    #[error("destination is not a valid tile")]
    InvalidDestination,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// A move executed during a flush, for host animation hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutedMove {
    pub unit: UnitId,
    pub from: Position,
    pub to: Position,
}

// ============================================================================
// Turn boundary
// ============================================================================

/// Turn-start reset: clears the pending/acted bookkeeping and grants every
/// living unit its passive aura gain (shared base plus the unit's own
/// regeneration).
pub fn on_turn_start(state: &mut GameState, env: &CoreEnv<'_>) -> Result<(), OracleError> {
    let base_gain = env.config()?.rules().base_aura_gain;

    state.turn.reset_for_new_turn();
    for unit in state.units.iter_mut() {
        if unit.is_alive() {
            unit.aura.gain(base_gain + unit.aura_regen);
        }
    }
    debug!(turn = state.turn.number, "turn started");
    Ok(())
}

// ============================================================================
// Movement
// ============================================================================

/// Queues a move for `unit` to `target`.
///
/// Succeeds only during the movement phase, while no flush is in progress,
/// for a living unit that can move, has not acted, and whose team still has
/// allotment left. Queueing marks the unit as having acted.
pub fn queue_move(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    unit_id: UnitId,
    target: Position,
) -> Result<(), TurnError> {
    if state.phase.phase != TurnPhase::Movement {
        return Err(TurnError::OutOfPhase);
    }
    if state.turn.flushing_moves {
        return Err(TurnError::MovementInProgress);
    }

    let unit = state.units.get(unit_id).ok_or(TurnError::UnitNotFound)?;
    if !unit.is_alive() {
        return Err(TurnError::UnitDead);
    }
    let team = unit.team;

    if state.turn.acted.contains(&unit_id) {
        return Err(TurnError::AlreadyActed);
    }
    if !status::can_move(state, unit_id) {
        return Err(TurnError::CannotMove);
    }

    if state.turn.moves_taken_by(team) >= env.config()?.rules().moves_per_turn {
        return Err(TurnError::MoveLimitReached);
    }

    if !env.grid()?.is_passable(target) {
        return Err(TurnError::InvalidDestination);
    }

    state.turn.pending_moves.insert(unit_id, target);
    state.turn.acted.insert(unit_id);
    state.turn.record_move(team);
    debug!(%unit_id, %target, "move queued");
    Ok(())
}

/// Flushes every queued move.
///
/// Destinations are reserved first-come in iteration order (ascending unit
/// id): a unit whose target was already reserved this pass, or is occupied
/// by a standing unit, has its move cancelled. Actual path traversal is the
/// host's concern; the returned records carry the endpoints.
pub fn execute_all_pending_moves(
    state: &mut GameState,
    env: &CoreEnv<'_>,
) -> Result<Vec<ExecutedMove>, OracleError> {
    state.turn.flushing_moves = true;

    let pending: Vec<(UnitId, Position)> = state
        .turn
        .pending_moves
        .iter()
        .map(|(&unit, &target)| (unit, target))
        .collect();

    let mut reserved: Vec<Position> = Vec::with_capacity(pending.len());
    let mut executed = Vec::new();

    for (unit_id, target) in pending {
        let Some(unit) = state.units.get(unit_id) else {
            continue;
        };
        let from = unit.position;
        if from == target {
            continue;
        }
        if reserved.contains(&target) {
            debug!(%unit_id, %target, "move cancelled, tile already reserved");
            continue;
        }
        if state
            .units
            .living_at(target)
            .is_some_and(|occupant| occupant.id != unit_id)
        {
            debug!(%unit_id, %target, "move cancelled, tile occupied");
            continue;
        }

        reserved.push(target);
        if let Some(unit) = state.units.get_mut(unit_id) {
            unit.position = target;
        }
        executed.push(ExecutedMove {
            unit: unit_id,
            from,
            to: target,
        });
        zone::on_unit_moved(state, env, unit_id, from, target)?;
    }

    state.turn.pending_moves.clear();
    state.turn.flushing_moves = false;
    Ok(executed)
}

/// True when both teams have spent their move allotment; lets the phase
/// machine close the movement window early.
pub fn moves_exhausted(state: &GameState, env: &CoreEnv<'_>) -> bool {
    let Ok(config) = env.config() else {
        return false;
    };
    let allotment = config.rules().moves_per_turn;
    state.turn.moves_taken_by(Team::Sun) >= allotment
        && state.turn.moves_taken_by(Team::Moon) >= allotment
}

// ============================================================================
// Cast gating
// ============================================================================

/// Checks whether `unit` may cast right now: the phase must belong to its
/// side, the unit must not have cast this phase, and the team quota must be
/// unmet.
pub fn may_cast(state: &GameState, env: &CoreEnv<'_>, unit_id: UnitId) -> Result<(), TurnError> {
    let unit = state.units.get(unit_id).ok_or(TurnError::UnitNotFound)?;
    if !unit.is_alive() {
        return Err(TurnError::UnitDead);
    }

    match state.phase.phase.active_team() {
        Some(team) if team == unit.team => {}
        _ => return Err(TurnError::OutOfPhase),
    }

    if state.turn.cast_this_phase.contains(&unit_id) {
        return Err(TurnError::AlreadyCast);
    }

    if state.turn.casts_this_phase >= env.config()?.rules().casts_per_phase {
        return Err(TurnError::QuotaExhausted);
    }
    Ok(())
}

/// Records a successful cast; exhausting the quota is what lets the phase
/// machine advance early.
pub fn record_cast(state: &mut GameState, unit_id: UnitId) {
    state.turn.cast_this_phase.insert(unit_id);
    state.turn.acted.insert(unit_id);
    state.turn.casts_this_phase += 1;
}

/// True when the active team's per-phase cast quota is spent.
pub fn casts_exhausted(state: &GameState, env: &CoreEnv<'_>) -> bool {
    let Ok(config) = env.config() else {
        return false;
    };
    state.turn.casts_this_phase >= config.rules().casts_per_phase
}
