//! Traits describing the injected collaborators.
//!
//! Oracles expose authored definitions, grid geometry, rules tunables, and
//! deterministic randomness. The [`Env`] aggregate bundles them so the engine
//! can reach everything it needs without hard coupling to concrete
//! implementations; a missing required collaborator surfaces as
//! [`OracleError`], never a panic.
mod abilities;
mod config;
mod error;
mod grid;
mod rng;
mod statuses;
mod zones;

pub use abilities::{
    AbilityBinding, AbilityDefinition, AbilityId, AbilityOracle, MarkSynergy, MovementKind,
    OverloadSpec, SecondHit, StatusApplication, TargetFlags,
};
pub use config::ConfigOracle;
pub use error::OracleError;
pub use grid::{GridDimensions, GridOracle};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use statuses::{
    Attribute, RemovalTriggers, Stacking, StatModifier, StatusEffectDefinition, StatusKind,
    StatusOracle,
};
pub use zones::{AllegianceFilter, ZoneDefinition, ZoneId, ZoneMerge, ZoneOracle, ZoneTurnEnd};

/// Aggregates the read-only collaborators required by the rules core.
#[derive(Clone, Copy, Debug)]
pub struct Env<'a, A, S, Z, G, C, R>
where
    A: AbilityOracle + ?Sized,
    S: StatusOracle + ?Sized,
    Z: ZoneOracle + ?Sized,
    G: GridOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    abilities: Option<&'a A>,
    statuses: Option<&'a S>,
    zones: Option<&'a Z>,
    grid: Option<&'a G>,
    config: Option<&'a C>,
    rng: Option<&'a R>,
}

pub type CoreEnv<'a> = Env<
    'a,
    dyn AbilityOracle + 'a,
    dyn StatusOracle + 'a,
    dyn ZoneOracle + 'a,
    dyn GridOracle + 'a,
    dyn ConfigOracle + 'a,
    dyn RngOracle + 'a,
>;

impl<'a, A, S, Z, G, C, R> Env<'a, A, S, Z, G, C, R>
where
    A: AbilityOracle + ?Sized,
    S: StatusOracle + ?Sized,
    Z: ZoneOracle + ?Sized,
    G: GridOracle + ?Sized,
    C: ConfigOracle + ?Sized,
    R: RngOracle + ?Sized,
{
    pub fn new(
        abilities: Option<&'a A>,
        statuses: Option<&'a S>,
        zones: Option<&'a Z>,
        grid: Option<&'a G>,
        config: Option<&'a C>,
        rng: Option<&'a R>,
    ) -> Self {
        Self {
            abilities,
            statuses,
            zones,
            grid,
            config,
            rng,
        }
    }

    pub fn with_all(
        abilities: &'a A,
        statuses: &'a S,
        zones: &'a Z,
        grid: &'a G,
        config: &'a C,
        rng: &'a R,
    ) -> Self {
        Self::new(
            Some(abilities),
            Some(statuses),
            Some(zones),
            Some(grid),
            Some(config),
            Some(rng),
        )
    }

    pub fn empty() -> Self {
        Self {
            abilities: None,
            statuses: None,
            zones: None,
            grid: None,
            config: None,
            rng: None,
        }
    }

    /// Returns the ability registry, or an error if not available.
    pub fn abilities(&self) -> Result<&'a A, OracleError> {
        self.abilities.ok_or(OracleError::AbilitiesNotAvailable)
    }

    /// Returns the status registry, or an error if not available.
    pub fn statuses(&self) -> Result<&'a S, OracleError> {
        self.statuses.ok_or(OracleError::StatusesNotAvailable)
    }

    /// Returns the zone registry, or an error if not available.
    pub fn zones(&self) -> Result<&'a Z, OracleError> {
        self.zones.ok_or(OracleError::ZonesNotAvailable)
    }

    /// Returns the grid oracle, or an error if not available.
    pub fn grid(&self) -> Result<&'a G, OracleError> {
        self.grid.ok_or(OracleError::GridNotAvailable)
    }

    /// Returns the config oracle, or an error if not available.
    pub fn config(&self) -> Result<&'a C, OracleError> {
        self.config.ok_or(OracleError::ConfigNotAvailable)
    }

    /// Returns the rng oracle, or an error if not available.
    pub fn rng(&self) -> Result<&'a R, OracleError> {
        self.rng.ok_or(OracleError::RngNotAvailable)
    }

    /// Looks up an ability definition, treating absence as a configuration
    /// error.
    pub fn ability_def(&self, id: AbilityId) -> Result<&'a AbilityDefinition, OracleError> {
        self.abilities()?
            .ability(id)
            .ok_or(OracleError::MissingAbility(id))
    }

    /// Looks up a status definition, treating absence as a configuration
    /// error.
    pub fn status_def(&self, kind: StatusKind) -> Result<&'a StatusEffectDefinition, OracleError> {
        self.statuses()?
            .status(kind)
            .ok_or(OracleError::MissingStatus(kind))
    }

    /// Looks up a zone definition, treating absence as a configuration error.
    pub fn zone_def(&self, id: ZoneId) -> Result<&'a ZoneDefinition, OracleError> {
        self.zones()?.zone(id).ok_or(OracleError::MissingZone(id))
    }
}

impl<'a, A, S, Z, G, C, R> Env<'a, A, S, Z, G, C, R>
where
    A: AbilityOracle + 'a,
    S: StatusOracle + 'a,
    Z: ZoneOracle + 'a,
    G: GridOracle + 'a,
    C: ConfigOracle + 'a,
    R: RngOracle + 'a,
{
    /// Converts this environment into a trait-object based `CoreEnv`
    /// (borrows self). Overhead: six pointer copies.
    pub fn as_core_env(&self) -> CoreEnv<'a> {
        let abilities: Option<&'a dyn AbilityOracle> = self.abilities.map(|a| a as _);
        let statuses: Option<&'a dyn StatusOracle> = self.statuses.map(|s| s as _);
        let zones: Option<&'a dyn ZoneOracle> = self.zones.map(|z| z as _);
        let grid: Option<&'a dyn GridOracle> = self.grid.map(|g| g as _);
        let config: Option<&'a dyn ConfigOracle> = self.config.map(|c| c as _);
        let rng: Option<&'a dyn RngOracle> = self.rng.map(|r| r as _);
        Env::new(abilities, statuses, zones, grid, config, rng)
    }
}
