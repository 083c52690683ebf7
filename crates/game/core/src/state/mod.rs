//! Authoritative match state representation.
//!
//! This module owns the data structures describing units, zones, turn
//! bookkeeping, and the phase tag. Hosts populate the state before the match
//! and mutate it exclusively through the engine.
pub mod types;

pub use crate::status::LinkTable;
pub use types::{
    PhaseState, Position, ResourceMeter, StatusEffectInstance, StatusEffects, Team, TurnState,
    UnitId, UnitState, UnitsState, ZoneInstance, ZoneInstanceId, ZoneLifecycle, ZonesState,
};

/// Canonical snapshot of the deterministic match state.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// All units, host-populated before the match starts.
    pub units: UnitsState,

    /// Zone instances plus tile index and void-tile windows.
    pub zones: ZonesState,

    /// Per-turn bookkeeping: queued moves, acted sets, tallies, nonce.
    pub turn: TurnState,

    /// Current phase tag, elapsed timer, and transition lock.
    pub phase: PhaseState,

    /// Bidirectional tether relation maintained by the status engine.
    pub links: LinkTable,
}

impl GameState {
    /// Creates an empty state with no units (hosts add them explicitly).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Convenience accessor used throughout the pipeline.
    pub fn unit(&self, id: UnitId) -> Option<&UnitState> {
        self.units.get(id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut UnitState> {
        self.units.get_mut(id)
    }
}
