//! Deterministic rules core for a two-player grid tactics duel.
//!
//! `skirmish-core` defines the canonical rules: the turn-phase state machine,
//! per-turn orchestration, the ability resolution pipeline, combat math,
//! status effects, and area zones. All state mutation flows through
//! [`engine::CoreEngine`]; everything the rules need from the outside world
//! (definitions, grid geometry, randomness, tunables) is injected through the
//! oracle traits in [`env`].
pub mod ability;
pub mod combat;
pub mod config;
pub mod engine;
pub mod env;
pub mod phase;
pub mod state;
pub mod status;
#[cfg(test)]
pub(crate) mod testutil;
pub mod turn;
pub mod zone;

pub use ability::{
    AbilityError, AbilityOutcome, AbilityUse, AuraCommand, AuraLedger, DeferredLedger,
    HealRecord, LocalLedger, MoveRecord, StrikeRecord,
};
pub use combat::{
    AttackOutcome, DamageOutcome, HealOutcome, resolve_damage, resolve_healing, resolve_strike,
};
pub use config::CoreConfig;
pub use engine::{Command, CommandOutcome, CoreEngine, ExecuteError};
pub use env::{
    AbilityBinding, AbilityDefinition, AbilityId, AbilityOracle, AllegianceFilter, Attribute,
    ConfigOracle, CoreEnv, Env, GridDimensions, GridOracle, MarkSynergy, MovementKind,
    OracleError, OverloadSpec, PcgRng, RemovalTriggers, RngOracle, SecondHit, Stacking,
    StatModifier, StatusApplication, StatusEffectDefinition, StatusKind, StatusOracle,
    TargetFlags, ZoneDefinition, ZoneId, ZoneMerge, ZoneOracle, ZoneTurnEnd, compute_seed,
};
pub use phase::{PhaseError, PhaseMachine, TurnPhase};
pub use state::{
    GameState, LinkTable, PhaseState, Position, ResourceMeter, StatusEffectInstance,
    StatusEffects, Team, TurnState, UnitId, UnitState, UnitsState, ZoneInstance, ZoneInstanceId,
    ZoneLifecycle, ZonesState,
};
pub use turn::{ExecutedMove, TurnError};
pub use zone::{ZoneError, ZonePlacement};
