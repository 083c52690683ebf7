//! Shared fixtures for the crate's unit tests.

use crate::config::CoreConfig;
use crate::env::{
    AbilityDefinition, AbilityId, AbilityOracle, CoreEnv, Env, GridDimensions, GridOracle,
    RngOracle, StatusEffectDefinition, StatusKind, StatusOracle, ZoneDefinition, ZoneId,
    ZoneOracle,
};
use crate::state::{GameState, Position, Team, UnitId, UnitState};

pub(crate) struct AbilityTable(pub Vec<AbilityDefinition>);

impl AbilityOracle for AbilityTable {
    fn ability(&self, id: AbilityId) -> Option<&AbilityDefinition> {
        self.0.iter().find(|d| d.id == id)
    }
}

pub(crate) struct StatusTable(pub Vec<StatusEffectDefinition>);

impl StatusOracle for StatusTable {
    fn status(&self, kind: StatusKind) -> Option<&StatusEffectDefinition> {
        self.0.iter().find(|d| d.kind == kind)
    }
}

pub(crate) struct ZoneTable(pub Vec<ZoneDefinition>);

impl ZoneOracle for ZoneTable {
    fn zone(&self, id: ZoneId) -> Option<&ZoneDefinition> {
        self.0.iter().find(|d| d.id == id)
    }
}

/// Open rectangular board with no blocked tiles.
pub(crate) struct OpenGrid(pub GridDimensions);

impl GridOracle for OpenGrid {
    fn dimensions(&self) -> GridDimensions {
        self.0
    }

    fn is_passable(&self, position: Position) -> bool {
        self.contains(position)
    }
}

/// Test double forcing every probability roll one way: `hit: true` makes any
/// nonzero chance succeed, `hit: false` makes anything below certainty fail.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ForcedRng {
    pub hit: bool,
}

impl RngOracle for ForcedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        if self.hit { 0 } else { u32::MAX }
    }
}

/// A complete environment with every oracle slot filled.
pub(crate) struct Fixture {
    pub abilities: AbilityTable,
    pub statuses: StatusTable,
    pub zones: ZoneTable,
    pub grid: OpenGrid,
    pub config: CoreConfig,
    pub rng: ForcedRng,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            abilities: AbilityTable(Vec::new()),
            statuses: StatusTable(Vec::new()),
            zones: ZoneTable(Vec::new()),
            grid: OpenGrid(GridDimensions::new(10, 10)),
            config: CoreConfig::new(),
            rng: ForcedRng { hit: true },
        }
    }

    pub fn env(&self) -> CoreEnv<'_> {
        Env::with_all(
            &self.abilities,
            &self.statuses,
            &self.zones,
            &self.grid,
            &self.config,
            &self.rng,
        )
        .as_core_env()
    }
}

/// Two opposing units on an open board: Sun #1 at (1,1), Moon #2 at (5,1),
/// both 20 HP and 5 aura.
pub(crate) fn duel_state() -> GameState {
    let mut state = GameState::empty();
    state
        .units
        .insert(UnitState::new(UnitId(1), Team::Sun, Position::new(1, 1), 20, 5));
    state
        .units
        .insert(UnitState::new(UnitId(2), Team::Moon, Position::new(5, 1), 20, 5));
    state
}
