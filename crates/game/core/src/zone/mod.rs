//! Zone engine: persistent area effects anchored to grid tiles.
//!
//! Lifecycle: `Active` → (duration exhausted) `Fading` → `Spent` → swept.
//! Placement clamps the footprint in-grid, merges with same-type instances
//! per the definition's merge rule, and enforces the per-tile capacity: the
//! overflowing placement triggers unstable resonance instead of stacking.

mod effects;

pub use effects::{apply_turn_end_effects, apply_zone_effects, on_unit_moved};

use tracing::{debug, error};

use crate::env::{AllegianceFilter, CoreEnv, OracleError, ZoneId, ZoneMerge};
use crate::state::{
    GameState, Position, Team, UnitId, ZoneInstance, ZoneInstanceId, ZoneLifecycle,
};

/// Errors surfaced by zone placement and movement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneError {
    /// The tile is inside a resonance void window.
    #[error("tile is void after unstable resonance")]
    TileVoid,

    /// A shift would exceed the destination tile's capacity.
    #[error("destination tile is at zone capacity")]
    DestinationFull,

    #[error("unknown zone instance {0}")]
    UnknownInstance(crate::state::ZoneInstanceId),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// What a placement request resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZonePlacement {
    /// A fresh instance was created.
    Created(ZoneInstanceId),
    /// An existing same-type instance had its duration refreshed.
    Refreshed(ZoneInstanceId),
    /// An existing same-type instance gained a stack.
    Stacked(ZoneInstanceId),
    /// The tile overflowed: every instance there deactivated, a transient
    /// resonance zone spawned, the tile went void, and the request was
    /// rejected.
    Resonance,
}

/// Places a zone of type `definition` at `position` for `owner`.
///
/// The center is clamped so the full radius footprint stays in-grid before
/// any other rule runs.
pub fn create(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    definition: ZoneId,
    position: Position,
    owner: UnitId,
) -> Result<ZonePlacement, ZoneError> {
    let def = env.zone_def(definition)?;
    let position = env.grid()?.clamp_footprint(position, def.radius);

    if state.zones.is_void(position) {
        return Err(ZoneError::TileVoid);
    }

    // Same-type merge rules take precedence over capacity.
    if let Some(existing) = state
        .zones
        .at_tile(position)
        .iter()
        .copied()
        .find(|&id| {
            state
                .zones
                .get(id)
                .is_some_and(|z| z.definition == definition && z.is_active())
        })
    {
        match def.merge {
            ZoneMerge::Refresh => {
                let duration = def.duration;
                if let Some(zone) = state.zones.get_mut(existing) {
                    zone.remaining = zone.remaining.max(duration);
                }
                return Ok(ZonePlacement::Refreshed(existing));
            }
            ZoneMerge::Stack { max } => {
                let duration = def.duration;
                if let Some(zone) = state.zones.get_mut(existing) {
                    zone.remaining = zone.remaining.max(duration);
                    if zone.stacks < max {
                        zone.stacks += 1;
                        return Ok(ZonePlacement::Stacked(existing));
                    }
                }
                return Ok(ZonePlacement::Refreshed(existing));
            }
            ZoneMerge::Separate => {}
        }
    }

    // Capacity check: the overflowing placement destabilizes the tile.
    if state.zones.tile_count(position) >= crate::config::CoreConfig::MAX_ZONES_PER_TILE {
        trigger_resonance(state, env, position, owner)?;
        return Ok(ZonePlacement::Resonance);
    }

    let id = state.zones.allocate_id();
    let instance = ZoneInstance::new(id, definition, position, def.duration, owner);
    if !state.zones.insert(instance) {
        // tile_count was checked above; reaching here means the index and
        // the instance table diverged.
        error!(%position, "zone index out of sync, placement dropped");
        return Err(ZoneError::DestinationFull);
    }
    debug!(%id, %definition, %position, "zone created");
    Ok(ZonePlacement::Created(id))
}

/// Unstable resonance: every instance at the tile deactivates, a transient
/// damaging instance spawns under the reserved id, and the tile rejects new
/// zones for the configured void window.
fn trigger_resonance(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    position: Position,
    owner: UnitId,
) -> Result<(), ZoneError> {
    let void_duration = env.config()?.rules().void_duration;

    // Deactivating instances stop claiming tile slots immediately; they stay
    // in the table until swept so hosts can observe the fade.
    for id in state.zones.at_tile(position).to_vec() {
        if let Some(zone) = state.zones.get_mut(id) {
            zone.lifecycle = ZoneLifecycle::Fading;
        }
        state.zones.deindex(id);
    }
    state.zones.mark_void(position, void_duration);

    // The transient rides on an authored definition; a registry without one
    // is a configuration error, but the deactivation and the void window
    // above still stand.
    match env.zone_def(ZoneId::RESONANCE) {
        Ok(def) => {
            let id = state.zones.allocate_id();
            let instance = ZoneInstance::new(id, ZoneId::RESONANCE, position, def.duration, owner);
            if !state.zones.insert(instance) {
                error!(%position, "resonance transient dropped, tile still full");
            }
        }
        Err(err) => {
            error!(%position, %err, "resonance zone definition missing");
        }
    }
    Ok(())
}

/// Decrements every non-permanent active instance; at zero the instance
/// begins fading. Fading instances from the previous turn are spent and
/// swept, and void windows count down. Runs once per turn boundary.
pub fn process_turn(state: &mut GameState, env: &CoreEnv<'_>) -> Result<(), OracleError> {
    state.zones.sweep_spent();

    for id in state.zones.ids() {
        let Some(zone) = state.zones.get(id) else {
            continue;
        };
        match zone.lifecycle {
            ZoneLifecycle::Active => {
                let permanent = env.zone_def(zone.definition)?.permanent;
                if permanent {
                    continue;
                }
                if let Some(zone) = state.zones.get_mut(id) {
                    zone.remaining = zone.remaining.saturating_sub(1);
                    if zone.remaining == 0 {
                        zone.lifecycle = ZoneLifecycle::Fading;
                        debug!(%id, "zone fading");
                    }
                }
            }
            ZoneLifecycle::Fading => {
                if let Some(zone) = state.zones.get_mut(id) {
                    zone.lifecycle = ZoneLifecycle::Spent;
                }
            }
            ZoneLifecycle::Spent => {}
        }
    }

    state.zones.tick_void_tiles();
    Ok(())
}

/// Moves a zone instance to a new tile.
///
/// Fails without mutating when the destination is void or already at
/// capacity; otherwise the instance is re-indexed under its new position.
pub fn shift(
    state: &mut GameState,
    env: &CoreEnv<'_>,
    id: ZoneInstanceId,
    to: Position,
) -> Result<(), ZoneError> {
    let radius = {
        let zone = state
            .zones
            .get(id)
            .ok_or(ZoneError::UnknownInstance(id))?;
        env.zone_def(zone.definition)?.radius
    };
    let to = env.grid()?.clamp_footprint(to, radius);

    if state.zones.is_void(to) {
        return Err(ZoneError::TileVoid);
    }
    if state.zones.tile_count(to) >= crate::config::CoreConfig::MAX_ZONES_PER_TILE {
        return Err(ZoneError::DestinationFull);
    }

    state.zones.reindex(id, to);
    Ok(())
}

/// True when `unit_team` passes the zone's allegiance filter relative to the
/// owner's team.
pub(crate) fn passes_filter(filter: AllegianceFilter, owner_team: Team, unit_team: Team) -> bool {
    match filter {
        AllegianceFilter::Any => true,
        AllegianceFilter::AllyOnly => unit_team == owner_team,
        AllegianceFilter::EnemyOnly => unit_team != owner_team,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::env::ZoneDefinition;
    use crate::testutil::{Fixture, duel_state};

    fn fx_with_zone(def: ZoneDefinition) -> Fixture {
        let mut fx = Fixture::new();
        fx.zones.0 = vec![
            def,
            ZoneDefinition::new(ZoneId::RESONANCE, 0, 1).with_tick_damage(5),
        ];
        fx
    }

    #[test]
    fn zone_fades_after_duration_elapses() {
        let fx = fx_with_zone(ZoneDefinition::new(ZoneId(1), 1, 2));
        let mut state = duel_state();
        let placement =
            create(&mut state, &fx.env(), ZoneId(1), Position::new(4, 4), UnitId(1)).unwrap();
        let ZonePlacement::Created(id) = placement else {
            panic!("expected creation");
        };

        process_turn(&mut state, &fx.env()).unwrap();
        assert!(state.zones.get(id).unwrap().is_active());

        process_turn(&mut state, &fx.env()).unwrap();
        assert_eq!(state.zones.get(id).unwrap().lifecycle, ZoneLifecycle::Fading);
    }

    #[test]
    fn permanent_zone_never_decrements() {
        let fx = fx_with_zone(ZoneDefinition::new(ZoneId(1), 1, 2).permanent());
        let mut state = duel_state();
        let ZonePlacement::Created(id) =
            create(&mut state, &fx.env(), ZoneId(1), Position::new(4, 4), UnitId(1)).unwrap()
        else {
            panic!("expected creation");
        };

        for _ in 0..5 {
            process_turn(&mut state, &fx.env()).unwrap();
        }
        let zone = state.zones.get(id).unwrap();
        assert!(zone.is_active());
        assert_eq!(zone.remaining, 2);
    }

    #[test]
    fn refresh_merge_extends_existing_instance() {
        let fx = fx_with_zone(ZoneDefinition::new(ZoneId(1), 1, 3));
        let mut state = duel_state();
        let ZonePlacement::Created(id) =
            create(&mut state, &fx.env(), ZoneId(1), Position::new(4, 4), UnitId(1)).unwrap()
        else {
            panic!("expected creation");
        };

        process_turn(&mut state, &fx.env()).unwrap();
        let placement =
            create(&mut state, &fx.env(), ZoneId(1), Position::new(4, 4), UnitId(1)).unwrap();
        assert_eq!(placement, ZonePlacement::Refreshed(id));
        assert_eq!(state.zones.get(id).unwrap().remaining, 3);
    }

    #[test]
    fn overflow_triggers_resonance_and_voids_tile() {
        let def = ZoneDefinition::new(ZoneId(1), 0, 3).with_merge(crate::env::ZoneMerge::Separate);
        let fx = fx_with_zone(def);
        let mut state = duel_state();
        let tile = Position::new(4, 4);

        for _ in 0..CoreConfig::MAX_ZONES_PER_TILE {
            let placement = create(&mut state, &fx.env(), ZoneId(1), tile, UnitId(1)).unwrap();
            assert!(matches!(placement, ZonePlacement::Created(_)));
        }

        let placement = create(&mut state, &fx.env(), ZoneId(1), tile, UnitId(1)).unwrap();
        assert_eq!(placement, ZonePlacement::Resonance);

        // The original four are deactivating and the tile rejects new zones.
        let fading = state
            .zones
            .iter()
            .filter(|z| z.lifecycle == ZoneLifecycle::Fading && z.definition == ZoneId(1))
            .count();
        assert_eq!(fading, CoreConfig::MAX_ZONES_PER_TILE);
        assert!(state.zones.is_void(tile));
        assert!(matches!(
            create(&mut state, &fx.env(), ZoneId(1), tile, UnitId(1)),
            Err(ZoneError::TileVoid)
        ));
    }

    #[test]
    fn placement_clamps_footprint_into_grid() {
        let fx = fx_with_zone(ZoneDefinition::new(ZoneId(1), 2, 3));
        let mut state = duel_state();
        let ZonePlacement::Created(id) =
            create(&mut state, &fx.env(), ZoneId(1), Position::new(0, 0), UnitId(1)).unwrap()
        else {
            panic!("expected creation");
        };
        assert_eq!(state.zones.get(id).unwrap().position, Position::new(2, 2));
    }

    #[test]
    fn shift_rejects_full_destination() {
        let def = ZoneDefinition::new(ZoneId(1), 0, 3).with_merge(crate::env::ZoneMerge::Separate);
        let fx = fx_with_zone(def);
        let mut state = duel_state();
        let from = Position::new(2, 2);
        let to = Position::new(6, 6);

        let ZonePlacement::Created(moving) =
            create(&mut state, &fx.env(), ZoneId(1), from, UnitId(1)).unwrap()
        else {
            panic!("expected creation");
        };
        for _ in 0..CoreConfig::MAX_ZONES_PER_TILE {
            create(&mut state, &fx.env(), ZoneId(1), to, UnitId(1)).unwrap();
        }

        assert_eq!(
            shift(&mut state, &fx.env(), moving, to),
            Err(ZoneError::DestinationFull)
        );
        assert_eq!(state.zones.get(moving).unwrap().position, from);

        let free = Position::new(7, 7);
        shift(&mut state, &fx.env(), moving, free).unwrap();
        assert_eq!(state.zones.get(moving).unwrap().position, free);
        assert_eq!(state.zones.at_tile(free), &[moving]);
    }
}
