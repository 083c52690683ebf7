//! Turn-phase state machine.
//!
//! The cycle per turn:
//!
//! ```text
//! Opening → Movement → Buffer → AuraSun1 → AuraMoon1 → AuraSun2 → AuraMoon2
//!              ↑                                                      │
//!              └───────────────── next turn ─────────────────────────┘
//! ```
//!
//! `GameOver` is terminal and only reachable through a forced transition.
//! The external scheduler drives [`update`] with a delta-time; phases
//! advance when their timer elapses or their early-exit condition is met,
//! and enter/exit side effects fire synchronously inside the transition.

use tracing::{debug, error};

use crate::env::{CoreEnv, OracleError};
use crate::state::{GameState, PhaseState, Team};
use crate::status;
use crate::turn;
use crate::zone;

/// Named segment of a turn with distinct permitted actions.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum TurnPhase {
    /// Pre-match staging; no actions permitted.
    Opening,
    /// Both teams queue moves.
    Movement,
    /// Short pause between movement and casting.
    Buffer,
    /// Sun's first casting window.
    AuraSun1,
    /// Moon's first casting window.
    AuraMoon1,
    /// Sun's second casting window.
    AuraSun2,
    /// Moon's second casting window.
    AuraMoon2,
    /// Terminal; entered only via forced transition.
    GameOver,
}

impl TurnPhase {
    /// Successor in the cycle. `None` marks a terminal state; an undefined
    /// successor during an automatic advance is a configuration error.
    pub fn next(self) -> Option<TurnPhase> {
        match self {
            TurnPhase::Opening => Some(TurnPhase::Movement),
            TurnPhase::Movement => Some(TurnPhase::Buffer),
            TurnPhase::Buffer => Some(TurnPhase::AuraSun1),
            TurnPhase::AuraSun1 => Some(TurnPhase::AuraMoon1),
            TurnPhase::AuraMoon1 => Some(TurnPhase::AuraSun2),
            TurnPhase::AuraSun2 => Some(TurnPhase::AuraMoon2),
            TurnPhase::AuraMoon2 => Some(TurnPhase::Movement),
            TurnPhase::GameOver => None,
        }
    }

    /// The team allowed to cast in this phase.
    pub fn active_team(self) -> Option<Team> {
        match self {
            TurnPhase::AuraSun1 | TurnPhase::AuraSun2 => Some(Team::Sun),
            TurnPhase::AuraMoon1 | TurnPhase::AuraMoon2 => Some(Team::Moon),
            _ => None,
        }
    }

    pub fn is_aura(self) -> bool {
        self.active_team().is_some()
    }

    /// The final casting window; its exit carries the turn boundary.
    pub fn is_turn_final(self) -> bool {
        self == TurnPhase::AuraMoon2
    }
}

/// Errors surfaced by phase transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseError {
    /// A transition is already in progress.
    #[error("phase machine is locked mid-transition")]
    Locked,

    /// The current phase has no successor mapping.
    #[error("no transition defined from the current phase")]
    UndefinedTransition,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Drives the phase cycle over the state's [`PhaseState`].
///
/// Stateless itself; everything observable lives in [`GameState`] so
/// snapshots capture the machine mid-cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct PhaseMachine;

impl PhaseMachine {
    pub fn new() -> Self {
        Self
    }

    /// Advances the current phase's timer by `dt` seconds and transitions
    /// when the phase allows it. Returns the phase entered, if any.
    pub fn update(
        &self,
        state: &mut GameState,
        env: &CoreEnv<'_>,
        dt: f32,
    ) -> Result<Option<TurnPhase>, PhaseError> {
        if state.phase.locked {
            return Ok(None);
        }
        if state.phase.phase == TurnPhase::GameOver {
            return Ok(None);
        }

        state.phase.elapsed += dt;
        if self.can_transition(state, env)? {
            return self.advance(state, env).map(Some);
        }
        Ok(None)
    }

    /// Explicit advance request (e.g. an "end phase" button). Refused while
    /// a transition is in flight.
    pub fn request_transition(
        &self,
        state: &mut GameState,
        env: &CoreEnv<'_>,
    ) -> Result<TurnPhase, PhaseError> {
        if state.phase.locked {
            return Err(PhaseError::Locked);
        }
        self.advance(state, env)
    }

    /// Administrative transition to an arbitrary phase, bypassing the lock
    /// and the normal enter/exit side effects. Intended for host-side
    /// correction and network resynchronization.
    pub fn force_transition_to(&self, state: &mut GameState, phase: TurnPhase) {
        debug!(from = %state.phase.phase, to = %phase, "forced phase transition");
        state.phase = PhaseState::enter(phase);
    }

    /// Whether the current phase is ready to hand over: its timer elapsed,
    /// or its early-exit condition is met.
    fn can_transition(&self, state: &GameState, env: &CoreEnv<'_>) -> Result<bool, PhaseError> {
        let phase = state.phase.phase;

        let Some(limit) = env.config()?.rules().phase_time_limit(phase) else {
            return Ok(false);
        };
        if state.phase.elapsed >= limit {
            return Ok(true);
        }

        Ok(match phase {
            TurnPhase::Movement => turn::moves_exhausted(state, env),
            _ if phase.is_aura() => turn::casts_exhausted(state, env),
            _ => false,
        })
    }

    /// Performs the transition to the successor phase with full side
    /// effects. An undefined successor logs and leaves the state untouched.
    fn advance(&self, state: &mut GameState, env: &CoreEnv<'_>) -> Result<TurnPhase, PhaseError> {
        let from = state.phase.phase;
        let Some(to) = from.next() else {
            error!(%from, "automatic transition out of a terminal phase");
            return Err(PhaseError::UndefinedTransition);
        };

        state.phase.locked = true;
        let result = self.run_transition(state, env, from, to);
        state.phase.locked = false;
        result?;

        // Every transition advances the nonce so turn-end rolls never reuse
        // a seed across turns.
        state.turn.nonce += 1;
        Ok(to)
    }

    fn run_transition(
        &self,
        state: &mut GameState,
        env: &CoreEnv<'_>,
        from: TurnPhase,
        to: TurnPhase,
    ) -> Result<(), PhaseError> {
        self.on_exit(state, env, from)?;

        let locked = state.phase.locked;
        state.phase = PhaseState::enter(to);
        state.phase.locked = locked;

        self.on_enter(state, env, to)?;
        debug!(%from, %to, "phase transition");
        Ok(())
    }

    /// Exit side effects.
    ///
    /// Leaving the movement window or the final casting window flushes
    /// queued moves. Leaving the final casting window additionally runs the
    /// turn-resolution-end: status ticks for every unit, zone turn-end
    /// behaviors, zone duration processing, then the turn counter increments
    /// and the orchestrator resets for the next turn.
    fn on_exit(
        &self,
        state: &mut GameState,
        env: &CoreEnv<'_>,
        from: TurnPhase,
    ) -> Result<(), PhaseError> {
        if from == TurnPhase::Movement || from.is_turn_final() {
            turn::execute_all_pending_moves(state, env)?;
        }

        if from.is_turn_final() {
            for unit_id in state.units.ids() {
                status::turn_end_tick(state, env, unit_id)?;
            }
            zone::apply_turn_end_effects(state, env)?;
            zone::process_turn(state, env)?;

            state.turn.number += 1;
            turn::on_turn_start(state, env)?;
        }

        if from == TurnPhase::Opening {
            // The match proper begins: first turn's bookkeeping.
            state.turn.number = 1;
            turn::on_turn_start(state, env)?;
        }
        Ok(())
    }

    /// Enter side effects: the zone steady tick fires on every movement and
    /// casting window entry, and casting windows reset their per-phase
    /// bookkeeping.
    fn on_enter(
        &self,
        state: &mut GameState,
        env: &CoreEnv<'_>,
        to: TurnPhase,
    ) -> Result<(), PhaseError> {
        if to.is_aura() {
            state.turn.reset_phase_casts();
        }
        if to == TurnPhase::Movement || to.is_aura() {
            zone::apply_zone_effects(state, env)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{StatusEffectDefinition, StatusKind};
    use crate::state::{Position, UnitId};
    use crate::testutil::{Fixture, duel_state};

    fn advance_to_movement(state: &mut GameState, env: &CoreEnv<'_>) {
        let machine = PhaseMachine::new();
        machine.request_transition(state, env).unwrap();
        assert_eq!(state.phase.phase, TurnPhase::Movement);
    }

    #[test]
    fn cycle_wraps_from_final_aura_to_movement() {
        assert_eq!(TurnPhase::AuraMoon2.next(), Some(TurnPhase::Movement));
        assert_eq!(TurnPhase::GameOver.next(), None);
    }

    #[test]
    fn timer_elapsing_advances_the_phase() {
        let fx = Fixture::new();
        let mut state = duel_state();
        let machine = PhaseMachine::new();

        let entered = machine
            .update(&mut state, &fx.env(), fx.config.opening_seconds + 0.1)
            .unwrap();
        assert_eq!(entered, Some(TurnPhase::Movement));
        assert_eq!(state.turn.number, 1);
    }

    #[test]
    fn movement_ends_early_when_both_teams_exhausted() {
        let mut fx = Fixture::new();
        fx.config.moves_per_turn = 1;
        let mut state = duel_state();
        let machine = PhaseMachine::new();
        advance_to_movement(&mut state, &fx.env());

        turn::queue_move(&mut state, &fx.env(), UnitId(1), Position::new(2, 1)).unwrap();
        turn::queue_move(&mut state, &fx.env(), UnitId(2), Position::new(6, 1)).unwrap();

        // Well before the timer, the exhausted allotments close the window.
        let entered = machine.update(&mut state, &fx.env(), 0.1).unwrap();
        assert_eq!(entered, Some(TurnPhase::Buffer));
        // The flush landed both queued moves.
        assert_eq!(state.unit(UnitId(1)).unwrap().position, Position::new(2, 1));
        assert_eq!(state.unit(UnitId(2)).unwrap().position, Position::new(6, 1));
    }

    #[test]
    fn aura_phase_ends_early_when_quota_spent() {
        let fx = Fixture::new();
        let mut state = duel_state();
        let machine = PhaseMachine::new();
        advance_to_movement(&mut state, &fx.env());
        machine.request_transition(&mut state, &fx.env()).unwrap(); // Buffer
        machine.request_transition(&mut state, &fx.env()).unwrap(); // AuraSun1
        assert_eq!(state.phase.phase, TurnPhase::AuraSun1);

        turn::record_cast(&mut state, UnitId(1));
        let entered = machine.update(&mut state, &fx.env(), 0.1).unwrap();
        assert_eq!(entered, Some(TurnPhase::AuraMoon1));
    }

    #[test]
    fn turn_boundary_ticks_statuses_exactly_once() {
        let mut fx = Fixture::new();
        fx.statuses.0 = vec![
            StatusEffectDefinition::new(StatusKind::Poisoned)
                .with_duration(3)
                .with_tick_damage(2),
        ];
        let mut state = duel_state();
        let machine = PhaseMachine::new();
        advance_to_movement(&mut state, &fx.env());
        crate::status::apply(&mut state, &fx.env(), UnitId(1), StatusKind::Poisoned, None, None)
            .unwrap();

        // Walk a full turn: Buffer, four aura phases, wrap to Movement.
        for _ in 0..6 {
            machine.request_transition(&mut state, &fx.env()).unwrap();
        }
        assert_eq!(state.phase.phase, TurnPhase::Movement);
        assert_eq!(state.turn.number, 2);
        // One boundary, one tick.
        assert_eq!(state.unit(UnitId(1)).unwrap().hp.current, 18);
    }

    #[test]
    fn game_over_is_terminal() {
        let fx = Fixture::new();
        let mut state = duel_state();
        let machine = PhaseMachine::new();

        machine.force_transition_to(&mut state, TurnPhase::GameOver);
        let entered = machine.update(&mut state, &fx.env(), 1000.0).unwrap();
        assert_eq!(entered, None);
        assert_eq!(state.phase.phase, TurnPhase::GameOver);
        assert!(matches!(
            machine.request_transition(&mut state, &fx.env()),
            Err(PhaseError::UndefinedTransition)
        ));
    }

    #[test]
    fn locked_machine_refuses_requests() {
        let fx = Fixture::new();
        let mut state = duel_state();
        let machine = PhaseMachine::new();
        state.phase.locked = true;

        assert_eq!(
            machine.request_transition(&mut state, &fx.env()),
            Err(PhaseError::Locked)
        );
        assert_eq!(machine.update(&mut state, &fx.env(), 1000.0).unwrap(), None);
    }
}
