//! Command dispatch and scheduler entry points.
//!
//! The [`CoreEngine`] is the authoritative reducer for [`GameState`]. The
//! external scheduler calls [`CoreEngine::tick`] once per step with a
//! delta-time and forwards player/AI commands to [`CoreEngine::execute`]
//! between ticks. Every successful command advances the nonce so each one
//! draws fresh roll seeds.

use crate::ability::{self, AbilityError, AbilityOutcome, AbilityUse, AuraLedger};
use crate::env::CoreEnv;
use crate::phase::{PhaseError, PhaseMachine, TurnPhase};
use crate::state::{GameState, Position, UnitId};
use crate::turn::{self, TurnError};

/// A command submitted by the host on behalf of a player or an AI agent.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Queue a movement-phase step for a unit.
    QueueMove { unit: UnitId, target: Position },
    /// Cast an ability.
    UseAbility(AbilityUse),
    /// Explicitly ask the current phase to hand over.
    RequestPhaseAdvance,
    /// Administrative phase override (host correction, resync).
    ForcePhase(TurnPhase),
}

/// What a successful command did.
#[derive(Clone, Debug)]
pub enum CommandOutcome {
    MoveQueued,
    Ability(AbilityOutcome),
    PhaseChanged(TurnPhase),
}

/// Errors surfaced while executing a command.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExecuteError {
    #[error("move command failed: {0}")]
    Turn(#[from] TurnError),

    #[error("ability command failed: {0}")]
    Ability(#[from] AbilityError),

    #[error("phase command failed: {0}")]
    Phase(#[from] PhaseError),
}

/// Engine facade borrowing the match state.
///
/// All state mutation flows through `tick` and `execute`; hosts hold the
/// state and construct an engine wherever they need to drive it.
pub struct CoreEngine<'a> {
    state: &'a mut GameState,
    machine: PhaseMachine,
}

impl<'a> CoreEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self {
            state,
            machine: PhaseMachine::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Scheduler entry point: advances the phase timer by `dt` seconds.
    /// Returns the phase entered, if the tick caused a transition.
    pub fn tick(
        &mut self,
        env: &CoreEnv<'_>,
        dt: f32,
    ) -> Result<Option<TurnPhase>, PhaseError> {
        self.machine.update(self.state, env, dt)
    }

    /// Executes a command against the current state.
    ///
    /// Commands are validated before any mutation; a failed command leaves
    /// the state untouched. Successful commands advance the nonce.
    pub fn execute(
        &mut self,
        env: &CoreEnv<'_>,
        ledger: &mut dyn AuraLedger,
        command: &Command,
    ) -> Result<CommandOutcome, ExecuteError> {
        let outcome = match command {
            Command::QueueMove { unit, target } => {
                turn::queue_move(self.state, env, *unit, *target)?;
                CommandOutcome::MoveQueued
            }
            Command::UseAbility(use_) => {
                let outcome = ability::execute(self.state, env, ledger, use_)?;
                CommandOutcome::Ability(outcome)
            }
            Command::RequestPhaseAdvance => {
                let entered = self.machine.request_transition(self.state, env)?;
                CommandOutcome::PhaseChanged(entered)
            }
            Command::ForcePhase(phase) => {
                self.machine.force_transition_to(self.state, *phase);
                CommandOutcome::PhaseChanged(*phase)
            }
        };

        self.state.turn.nonce += 1;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::LocalLedger;
    use crate::env::{AbilityDefinition, AbilityId, TargetFlags};
    use crate::testutil::{Fixture, duel_state};

    fn fx_with_strike() -> Fixture {
        let mut fx = Fixture::new();
        fx.abilities.0 = vec![
            AbilityDefinition::new(AbilityId(1), TargetFlags::ENEMY, 9)
                .with_cost(1)
                .with_damage(4),
        ];
        fx
    }

    #[test]
    fn full_turn_cycle_through_commands() {
        let fx = fx_with_strike();
        let mut state = duel_state();
        let mut engine = CoreEngine::new(&mut state);
        let env = fx.env();

        // Opening elapses into the movement window.
        let entered = engine.tick(&env, fx.config.opening_seconds).unwrap();
        assert_eq!(entered, Some(TurnPhase::Movement));

        engine
            .execute(
                &env,
                &mut LocalLedger,
                &Command::QueueMove {
                    unit: UnitId(1),
                    target: Position::new(2, 1),
                },
            )
            .unwrap();

        // Movement → Buffer → AuraSun1.
        engine.execute(&env, &mut LocalLedger, &Command::RequestPhaseAdvance).unwrap();
        engine.execute(&env, &mut LocalLedger, &Command::RequestPhaseAdvance).unwrap();
        assert_eq!(engine.state().phase.phase, TurnPhase::AuraSun1);
        // The flush landed the queued move on exit.
        assert_eq!(engine.state().unit(UnitId(1)).unwrap().position, Position::new(2, 1));

        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        let outcome = engine
            .execute(&env, &mut LocalLedger, &Command::UseAbility(use_))
            .unwrap();
        assert!(matches!(outcome, CommandOutcome::Ability(_)));
        assert_eq!(engine.state().unit(UnitId(2)).unwrap().hp.current, 16);

        // Quota spent: the next tick closes Sun's window early.
        let entered = engine.tick(&env, 0.1).unwrap();
        assert_eq!(entered, Some(TurnPhase::AuraMoon1));
    }

    #[test]
    fn failed_command_does_not_advance_the_nonce() {
        let fx = fx_with_strike();
        let mut state = duel_state();
        let mut engine = CoreEngine::new(&mut state);
        let env = fx.env();

        let before = engine.state().turn.nonce;
        let use_ = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
        // Opening phase: casting is out of phase.
        let result = engine.execute(&env, &mut LocalLedger, &Command::UseAbility(use_));
        assert!(matches!(result, Err(ExecuteError::Ability(_))));
        assert_eq!(engine.state().turn.nonce, before);
    }

    #[test]
    fn force_phase_jumps_without_side_effects() {
        let fx = fx_with_strike();
        let mut state = duel_state();
        let mut engine = CoreEngine::new(&mut state);
        let env = fx.env();

        engine
            .execute(&env, &mut LocalLedger, &Command::ForcePhase(TurnPhase::GameOver))
            .unwrap();
        assert_eq!(engine.state().phase.phase, TurnPhase::GameOver);
        assert_eq!(engine.tick(&env, 1000.0).unwrap(), None);
    }
}
