//! End-to-end match flow: a full turn driven through the engine facade with
//! content-crate registries, covering movement, casting, zones, and the
//! turn boundary.

use skirmish_content::{DefinitionRegistry, GridMap};
use skirmish_core::{
    AbilityDefinition, AbilityId, AbilityUse, Command, CoreConfig, CoreEngine, Env, GameState,
    LocalLedger, Position, RngOracle, StatusEffectDefinition, StatusKind, TargetFlags, Team,
    TurnPhase, UnitId, UnitState, ZoneDefinition, ZoneId,
};

/// Forces every probability roll to succeed so the scenario is exact.
struct AlwaysHit;

impl RngOracle for AlwaysHit {
    fn next_u32(&self, _seed: u64) -> u32 {
        0
    }
}

fn registry() -> DefinitionRegistry {
    DefinitionRegistry::new()
        .with_ability(
            AbilityDefinition::new(AbilityId(1), TargetFlags::ENEMY, 9)
                .with_cost(2)
                .with_damage(6)
                .with_status(StatusKind::Poisoned, None),
        )
        .with_ability(
            AbilityDefinition::new(AbilityId(2), TargetFlags::ENEMY | TargetFlags::GROUND, 9)
                .with_cost(2)
                .with_area(1)
                .with_damage(3)
                .with_zone(ZoneId(1)),
        )
        .with_status(
            StatusEffectDefinition::new(StatusKind::Poisoned)
                .with_duration(2)
                .with_tick_damage(2),
        )
        .with_status(StatusEffectDefinition::new(StatusKind::Burning).with_tick_damage(1))
        .with_zone(
            ZoneDefinition::new(ZoneId(1), 1, 2)
                .with_tick_damage(2)
                .with_grant(StatusKind::Burning),
        )
        .with_zone(ZoneDefinition::new(ZoneId::RESONANCE, 0, 1).with_tick_damage(5))
}

fn new_match() -> GameState {
    let mut state = GameState::empty();
    state
        .units
        .insert(UnitState::new(UnitId(1), Team::Sun, Position::new(1, 1), 30, 10).with_aura_regen(1));
    state
        .units
        .insert(UnitState::new(UnitId(2), Team::Moon, Position::new(6, 1), 30, 10));
    state
}

#[test]
fn full_turn_scenario() {
    let registry = registry();
    let grid = GridMap::open(12, 12);
    let config = CoreConfig::with_seed(7);
    let rng = AlwaysHit;
    let env_concrete = Env::with_all(&registry, &registry, &registry, &grid, &config, &rng);
    let env = env_concrete.as_core_env();

    let mut state = new_match();
    let mut engine = CoreEngine::new(&mut state);
    let mut ledger = LocalLedger;

    // Opening elapses; turn 1 begins with the movement window.
    let entered = engine.tick(&env, config.opening_seconds).unwrap();
    assert_eq!(entered, Some(TurnPhase::Movement));
    assert_eq!(engine.state().turn.number, 1);

    // Both sides queue one step toward each other.
    engine
        .execute(
            &env,
            &mut ledger,
            &Command::QueueMove {
                unit: UnitId(1),
                target: Position::new(2, 1),
            },
        )
        .unwrap();
    engine
        .execute(
            &env,
            &mut ledger,
            &Command::QueueMove {
                unit: UnitId(2),
                target: Position::new(5, 1),
            },
        )
        .unwrap();

    // Close the movement window; the flush lands both moves.
    engine.execute(&env, &mut ledger, &Command::RequestPhaseAdvance).unwrap();
    assert_eq!(engine.state().phase.phase, TurnPhase::Buffer);
    assert_eq!(engine.state().unit(UnitId(1)).unwrap().position, Position::new(2, 1));
    assert_eq!(engine.state().unit(UnitId(2)).unwrap().position, Position::new(5, 1));

    engine.execute(&env, &mut ledger, &Command::RequestPhaseAdvance).unwrap();
    assert_eq!(engine.state().phase.phase, TurnPhase::AuraSun1);

    // Sun strikes: 6 damage plus a two-turn poison.
    let strike = AbilityUse::on_unit(AbilityId(1), UnitId(1), UnitId(2));
    engine.execute(&env, &mut ledger, &Command::UseAbility(strike)).unwrap();
    {
        let target = engine.state().unit(UnitId(2)).unwrap();
        assert_eq!(target.hp.current, 24);
        assert!(target.status_effects.has(StatusKind::Poisoned));
    }
    assert_eq!(engine.state().unit(UnitId(1)).unwrap().aura.current, 8);

    // Quota spent: the next tick hands over to Moon.
    let entered = engine.tick(&env, 0.1).unwrap();
    assert_eq!(entered, Some(TurnPhase::AuraMoon1));

    // Moon drops a firestorm on Sun's tile: area damage plus a zone.
    let storm = AbilityUse::on_ground(AbilityId(2), UnitId(2), Position::new(2, 1));
    engine.execute(&env, &mut ledger, &Command::UseAbility(storm)).unwrap();
    assert_eq!(engine.state().unit(UnitId(1)).unwrap().hp.current, 27);
    assert_eq!(engine.state().zones.iter().count(), 1);

    // Hand over through Sun's and Moon's second windows. Each aura entry
    // runs the zone steady tick over Sun's unit standing in the firefield.
    let entered = engine.tick(&env, 0.1).unwrap();
    assert_eq!(entered, Some(TurnPhase::AuraSun2));
    let hp_after_first_tick = engine.state().unit(UnitId(1)).unwrap().hp.current;
    assert_eq!(hp_after_first_tick, 25);
    assert!(engine.state().unit(UnitId(1)).unwrap().status_effects.has(StatusKind::Burning));

    engine.execute(&env, &mut ledger, &Command::RequestPhaseAdvance).unwrap();
    assert_eq!(engine.state().phase.phase, TurnPhase::AuraMoon2);
    // Second steady tick: 2 more zone damage.
    assert_eq!(engine.state().unit(UnitId(1)).unwrap().hp.current, 23);

    // Closing the final window carries the turn boundary: status ticks
    // (poison 2 on Moon, burning 1 on Sun), zone countdown, aura regen.
    engine.execute(&env, &mut ledger, &Command::RequestPhaseAdvance).unwrap();
    assert_eq!(engine.state().phase.phase, TurnPhase::Movement);
    assert_eq!(engine.state().turn.number, 2);

    assert_eq!(engine.state().unit(UnitId(2)).unwrap().hp.current, 22);
    // Burning ticked once on Sun's unit, then the movement-entry zone tick
    // added 2 more zone damage and refreshed the grant.
    assert_eq!(engine.state().unit(UnitId(1)).unwrap().hp.current, 20);

    // Aura regen: Sun spent 2 and gets base 1 + regen 1 back (capped at 10);
    // Moon spent 2 and gets the base 1.
    assert_eq!(engine.state().unit(UnitId(1)).unwrap().aura.current, 10);
    assert_eq!(engine.state().unit(UnitId(2)).unwrap().aura.current, 9);

    // The firefield had duration 2: one boundary passed, one turn left.
    let zone = engine.state().zones.iter().next().unwrap();
    assert_eq!(zone.remaining, 1);
}
