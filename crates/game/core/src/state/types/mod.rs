//! State types for units, statuses, zones, and turn bookkeeping.

pub mod common;
pub mod status;
pub mod turn;
pub mod unit;
pub mod zone;

pub use common::{Position, ResourceMeter, Team, UnitId};
pub use status::{StatusEffectInstance, StatusEffects};
pub use turn::{PhaseState, TurnState};
pub use unit::{UnitState, UnitsState};
pub use zone::{ZoneInstance, ZoneInstanceId, ZoneLifecycle, ZonesState};
