//! Turn and phase bookkeeping.

use std::collections::{BTreeMap, BTreeSet};

use crate::phase::TurnPhase;

use super::{Position, Team, UnitId};

/// Per-turn action bookkeeping: queued moves, who has acted, and the per-team
/// tallies the phase machine consults for early transitions. Cleared at every
/// turn boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnState {
    /// Completed turns. The first turn is 1; Opening runs during turn 0.
    pub number: u32,

    /// Sequence number incremented after every successful command; seed
    /// material for deterministic rolls.
    pub nonce: u64,

    /// Queued move destinations, flushed when the movement window closes.
    pub pending_moves: BTreeMap<UnitId, Position>,

    /// Units that have spent their action this phase (moved or cast).
    pub acted: BTreeSet<UnitId>,

    /// Units that have cast during the current aura phase.
    pub cast_this_phase: BTreeSet<UnitId>,

    /// Moves queued by each team this turn.
    pub moves_taken: BTreeMap<Team, u32>,

    /// Casts made by the active team in the current aura phase.
    pub casts_this_phase: u32,

    /// True while `execute_all_pending_moves` is running; queueing is
    /// rejected mid-flush.
    pub flushing_moves: bool,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            number: 0,
            nonce: 0,
            pending_moves: BTreeMap::new(),
            acted: BTreeSet::new(),
            cast_this_phase: BTreeSet::new(),
            moves_taken: BTreeMap::new(),
            casts_this_phase: 0,
            flushing_moves: false,
        }
    }

    pub fn moves_taken_by(&self, team: Team) -> u32 {
        self.moves_taken.get(&team).copied().unwrap_or(0)
    }

    pub fn record_move(&mut self, team: Team) {
        *self.moves_taken.entry(team).or_insert(0) += 1;
    }

    /// Clears the per-phase cast bookkeeping. Called on every aura phase
    /// entry.
    pub fn reset_phase_casts(&mut self) {
        self.cast_this_phase.clear();
        self.casts_this_phase = 0;
    }

    /// Clears everything scoped to the turn. Called at every turn boundary.
    pub fn reset_for_new_turn(&mut self) {
        self.pending_moves.clear();
        self.acted.clear();
        self.cast_this_phase.clear();
        self.moves_taken.clear();
        self.casts_this_phase = 0;
        self.flushing_moves = false;
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}

/// Current phase of the turn cycle, replaced wholesale on each transition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseState {
    pub phase: TurnPhase,
    /// Seconds elapsed inside the current phase.
    pub elapsed: f32,
    /// Set while enter/exit callbacks run; transitions never re-enter while
    /// locked.
    pub locked: bool,
}

impl PhaseState {
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::Opening,
            elapsed: 0.0,
            locked: false,
        }
    }

    pub fn enter(phase: TurnPhase) -> Self {
        Self {
            phase,
            elapsed: 0.0,
            locked: false,
        }
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new()
    }
}
