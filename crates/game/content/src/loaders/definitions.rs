//! RON/TOML loaders for the three definition families and the rules config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::{AbilityDefinition, CoreConfig, StatusEffectDefinition, ZoneDefinition};

use crate::registry::DefinitionRegistry;

use super::{LoadResult, read_file};

/// Ability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbilityCatalog {
    pub abilities: Vec<AbilityDefinition>,
}

/// Status catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCatalog {
    pub statuses: Vec<StatusEffectDefinition>,
}

/// Zone catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCatalog {
    pub zones: Vec<ZoneDefinition>,
}

/// Load ability definitions from a RON file.
pub fn load_abilities(path: &Path) -> LoadResult<Vec<AbilityDefinition>> {
    let content = read_file(path)?;
    let catalog: AbilityCatalog = ron::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse ability catalog RON: {}", e))?;
    Ok(catalog.abilities)
}

/// Load status-effect definitions from a RON file.
pub fn load_statuses(path: &Path) -> LoadResult<Vec<StatusEffectDefinition>> {
    let content = read_file(path)?;
    let catalog: StatusCatalog = ron::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse status catalog RON: {}", e))?;
    Ok(catalog.statuses)
}

/// Load zone definitions from a RON file.
pub fn load_zones(path: &Path) -> LoadResult<Vec<ZoneDefinition>> {
    let content = read_file(path)?;
    let catalog: ZoneCatalog = ron::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Failed to parse zone catalog RON: {}", e))?;
    Ok(catalog.zones)
}

/// Load the rules configuration from a TOML file.
pub fn load_config(path: &Path) -> LoadResult<CoreConfig> {
    let content = read_file(path)?;
    toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse rules TOML: {}", e))
}

/// Load all three definition files into one registry.
pub fn load_registry(
    abilities: &Path,
    statuses: &Path,
    zones: &Path,
) -> LoadResult<DefinitionRegistry> {
    let mut registry = DefinitionRegistry::new();
    for definition in load_abilities(abilities)? {
        registry.add_ability(definition);
    }
    for definition in load_statuses(statuses)? {
        registry.add_status(definition);
    }
    for definition in load_zones(zones)? {
        registry.add_zone(definition);
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{AbilityId, StatusKind, TargetFlags, ZoneId};

    #[test]
    fn parses_ability_catalog_snippet() {
        let snippet = r#"
            AbilityCatalog(
                abilities: [
                    AbilityDefinition(
                        id: 1,
                        targeting: 4,
                        range: 6,
                        cost: 2,
                        damage: 10,
                    ),
                ],
            )
        "#;
        let catalog: AbilityCatalog = ron::from_str(snippet).unwrap();
        assert_eq!(catalog.abilities.len(), 1);
        let ability = &catalog.abilities[0];
        assert_eq!(ability.id, AbilityId(1));
        assert_eq!(ability.targeting, TargetFlags::ENEMY);
        assert_eq!(ability.damage, 10);
        assert_eq!(ability.cooldown, 0);
        assert!(ability.zone.is_none());
    }

    #[test]
    fn parses_status_catalog_snippet() {
        let snippet = r#"
            StatusCatalog(
                statuses: [
                    StatusEffectDefinition(
                        kind: Poisoned,
                        stacking: Stackable(max_stacks: 3),
                        duration: 2,
                        tick_damage: 3,
                    ),
                ],
            )
        "#;
        let catalog: StatusCatalog = ron::from_str(snippet).unwrap();
        let status = &catalog.statuses[0];
        assert_eq!(status.kind, StatusKind::Poisoned);
        assert_eq!(status.tick_damage, 3);
        assert!(!status.permanent);
    }

    #[test]
    fn parses_zone_catalog_snippet() {
        let snippet = r#"
            ZoneCatalog(
                zones: [
                    ZoneDefinition(
                        id: 1,
                        radius: 2,
                        duration: 3,
                        tick_damage: 2,
                        grants: [Burning],
                    ),
                ],
            )
        "#;
        let catalog: ZoneCatalog = ron::from_str(snippet).unwrap();
        let zone = &catalog.zones[0];
        assert_eq!(zone.id, ZoneId(1));
        assert_eq!(zone.grants, vec![StatusKind::Burning]);
    }

    #[test]
    fn parses_rules_toml() {
        let snippet = r#"
            opening_seconds = 5.0
            movement_seconds = 30.0
            buffer_seconds = 3.0
            aura_seconds = 20.0
            moves_per_turn = 3
            casts_per_phase = 1
            base_aura_gain = 1
            void_duration = 2
            base_hit_chance = 0.95
            nearsight_penalty = -2
            game_seed = 42
        "#;
        let config: CoreConfig = toml::from_str(snippet).unwrap();
        assert_eq!(config.game_seed, 42);
        assert_eq!(config.moves_per_turn, 3);
    }
}
