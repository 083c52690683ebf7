//! Errors for missing collaborators and missing authored data.
//!
//! Both are fatal configuration errors: the triggering operation logs,
//! aborts, and mutates nothing.

use super::abilities::AbilityId;
use super::statuses::StatusKind;
use super::zones::ZoneId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleError {
    #[error("ability registry not available")]
    AbilitiesNotAvailable,

    #[error("status registry not available")]
    StatusesNotAvailable,

    #[error("zone registry not available")]
    ZonesNotAvailable,

    #[error("grid not available")]
    GridNotAvailable,

    #[error("config not available")]
    ConfigNotAvailable,

    #[error("rng not available")]
    RngNotAvailable,

    #[error("no ability definition for {0}")]
    MissingAbility(AbilityId),

    #[error("no status definition for {0}")]
    MissingStatus(StatusKind),

    #[error("no zone definition for {0}")]
    MissingZone(ZoneId),
}
