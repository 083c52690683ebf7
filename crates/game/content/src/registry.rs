//! In-memory registries backing the core's oracle traits.

use std::collections::{BTreeMap, BTreeSet};

use skirmish_core::{
    AbilityDefinition, AbilityId, AbilityOracle, GridDimensions, GridOracle, Position,
    StatusEffectDefinition, StatusKind, StatusOracle, ZoneDefinition, ZoneId, ZoneOracle,
};

/// One registry for all three authored-definition families.
///
/// Hosts build it from loaders (or by hand in tests) and lend it to the
/// engine through the ability/status/zone oracle slots of the environment.
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    abilities: BTreeMap<AbilityId, AbilityDefinition>,
    statuses: BTreeMap<StatusKind, StatusEffectDefinition>,
    zones: BTreeMap<ZoneId, ZoneDefinition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ability(&mut self, definition: AbilityDefinition) {
        self.abilities.insert(definition.id, definition);
    }

    pub fn add_status(&mut self, definition: StatusEffectDefinition) {
        self.statuses.insert(definition.kind, definition);
    }

    pub fn add_zone(&mut self, definition: ZoneDefinition) {
        self.zones.insert(definition.id, definition);
    }

    pub fn with_ability(mut self, definition: AbilityDefinition) -> Self {
        self.add_ability(definition);
        self
    }

    pub fn with_status(mut self, definition: StatusEffectDefinition) -> Self {
        self.add_status(definition);
        self
    }

    pub fn with_zone(mut self, definition: ZoneDefinition) -> Self {
        self.add_zone(definition);
        self
    }

    pub fn ability_count(&self) -> usize {
        self.abilities.len()
    }

    pub fn status_count(&self) -> usize {
        self.statuses.len()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}

impl AbilityOracle for DefinitionRegistry {
    fn ability(&self, id: AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(&id)
    }
}

impl StatusOracle for DefinitionRegistry {
    fn status(&self, kind: StatusKind) -> Option<&StatusEffectDefinition> {
        self.statuses.get(&kind)
    }
}

impl ZoneOracle for DefinitionRegistry {
    fn zone(&self, id: ZoneId) -> Option<&ZoneDefinition> {
        self.zones.get(&id)
    }
}

/// Rectangular board with an optional set of blocked tiles.
#[derive(Clone, Debug)]
pub struct GridMap {
    dimensions: GridDimensions,
    blocked: BTreeSet<Position>,
}

impl GridMap {
    pub fn open(width: u32, height: u32) -> Self {
        Self {
            dimensions: GridDimensions::new(width, height),
            blocked: BTreeSet::new(),
        }
    }

    pub fn block(&mut self, position: Position) {
        self.blocked.insert(position);
    }

    pub fn with_blocked(mut self, positions: impl IntoIterator<Item = Position>) -> Self {
        self.blocked.extend(positions);
        self
    }
}

impl GridOracle for GridMap {
    fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    fn is_passable(&self, position: Position) -> bool {
        self.contains(position) && !self.blocked.contains(&position)
    }
}
