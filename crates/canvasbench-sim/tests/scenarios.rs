use canvasbench_core::SlotId;
use canvasbench_sim::{
    AnimationMode, Entity, SimConfig, SimulationEngine, RECORD_STRIDE,
};

const FRAME: f32 = 1.0 / 60.0;

fn shapes_engine(target: u32, window: f32) -> SimulationEngine {
    let mut config = SimConfig::canvas_shapes();
    config.population.target_count = target;
    config.population.emission_window = window;
    SimulationEngine::from_config(config).unwrap()
}

fn assert_pool_conserved(engine: &SimulationEngine) {
    let pool = engine.pool();
    assert_eq!(pool.idle_count() + pool.in_use_count(), pool.capacity());
    assert_eq!(pool.in_use_count(), engine.active_count());
}

#[test]
fn ramp_to_target_over_window() {
    let mut engine = shapes_engine(1000, 5.0);
    for _ in 0..300 {
        let snapshot = engine.advance(FRAME).unwrap();
        assert_eq!(snapshot.as_floats().len(), snapshot.len() * RECORD_STRIDE);
        assert!(engine.active_count() <= 1000);
        assert_pool_conserved(&engine);
    }
    let active = engine.active_count();
    assert!((999..=1000).contains(&active), "active {active}");
}

#[test]
fn single_entity_expires_after_lifetime() {
    let mut config = SimConfig::fountain();
    config.population.target_count = 1;
    config.population.emission_window = 0.0;
    config.spawn.lifetime_min = 3.0;
    config.spawn.lifetime_max = 3.0;
    let mut engine = SimulationEngine::from_config(config).unwrap();

    for _ in 0..29 {
        engine.advance(0.1).unwrap();
    }
    assert_eq!(engine.active_ids(), &[SlotId(0)]);
    let age = engine.entity(SlotId(0)).unwrap().age;
    assert!((age - 2.9).abs() < 1e-4, "age {age}");

    // stop re-emission so the release can be observed on its own
    engine.set_population_target(0).unwrap();
    engine.advance(0.1).unwrap();
    assert_eq!(engine.active_count(), 0);
    assert!(engine.snapshot().is_empty());
    assert!(!engine.pool().is_in_use(SlotId(0)));
    assert_eq!(engine.pool().idle_count(), engine.pool().capacity());

    engine.advance(0.1).unwrap();
    assert_eq!(engine.pool().idle_count(), engine.pool().capacity());
}

#[test]
fn expiry_is_natural_not_trimmed() {
    // same as above but the target stays at 1: the entity must die at 3.0s and
    // be replaced on the following tick by a fresh one
    let mut config = SimConfig::fountain();
    config.population.target_count = 1;
    config.population.emission_window = 0.0;
    config.spawn.lifetime_min = 3.0;
    config.spawn.lifetime_max = 3.0;
    let mut engine = SimulationEngine::from_config(config).unwrap();

    for _ in 0..30 {
        engine.advance(0.1).unwrap();
    }
    assert_eq!(engine.active_count(), 0);
    engine.advance(0.1).unwrap();
    assert_eq!(engine.active_count(), 1);
    let fresh = engine.entity(engine.active_ids()[0]).unwrap();
    assert!((fresh.age - 0.1).abs() < 1e-6);
}

#[test]
fn clear_mid_simulation_restarts_emission() {
    let mut engine = shapes_engine(500, 5.0);
    for _ in 0..300 {
        engine.advance(FRAME).unwrap();
    }
    assert!(engine.active_count() >= 499);

    engine.clear();
    assert_eq!(engine.active_count(), 0);
    assert!(engine.snapshot().is_empty());
    assert_eq!(engine.controller().accumulator(), 0.0);
    assert_pool_conserved(&engine);

    // 100/s for one frame: one or two entities, not a catch-up burst
    engine.advance(FRAME).unwrap();
    assert!(engine.active_count() <= 2, "active {}", engine.active_count());
}

#[test]
fn degenerate_dt_leaves_state_identical() {
    let mut config = SimConfig::fountain();
    config.population.target_count = 300;
    config.mode = AnimationMode::Stress;
    let mut engine = SimulationEngine::from_config(config).unwrap();
    for _ in 0..45 {
        engine.advance(FRAME).unwrap();
    }

    let snapshot = engine.snapshot().clone();
    let controller = engine.controller().clone();
    let ids = engine.active_ids().to_vec();
    let entities: Vec<Entity> = ids.iter().map(|id| engine.entity(*id).unwrap().clone()).collect();
    let (time, tick) = (engine.time(), engine.tick());

    for dt in [-5.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY, 0.0] {
        engine.advance(dt).unwrap();
    }

    assert_eq!(engine.snapshot(), &snapshot);
    assert_eq!(engine.controller(), &controller);
    assert_eq!(engine.active_ids(), ids.as_slice());
    for (id, before) in ids.iter().zip(&entities) {
        assert_eq!(engine.entity(*id).unwrap(), before);
    }
    assert_eq!(engine.time(), time);
    assert_eq!(engine.tick(), tick);
}

#[test]
fn growing_target_ramps_gradually() {
    let mut engine = shapes_engine(1000, 5.0);
    for _ in 0..300 {
        engine.advance(FRAME).unwrap();
    }
    let settled = engine.active_count();

    engine.set_population_target(2000).unwrap();
    engine.sync_capacity().unwrap();
    for _ in 0..6 {
        engine.advance(FRAME).unwrap();
    }
    let after_tenth = engine.active_count();
    assert!(after_tenth <= settled + 41, "jumped to {after_tenth}");
    assert!(after_tenth < 1100);

    for _ in 0..300 {
        engine.advance(FRAME).unwrap();
    }
    assert_eq!(engine.active_count(), 2000);
    assert_pool_conserved(&engine);
}

#[test]
fn ages_increase_until_release() {
    let mut engine = SimulationEngine::from_config(SimConfig::fountain()).unwrap();
    engine.advance(FRAME).unwrap();
    let tracked = engine.active_ids()[0];
    let mut last_age = engine.entity(tracked).unwrap().age;

    let mut released = false;
    for _ in 0..600 {
        engine.advance(FRAME).unwrap();
        match engine.entity(tracked) {
            Some(entity) if !released => {
                // the slot may be reused after release; only follow the first life
                assert!(entity.age > last_age);
                last_age = entity.age;
            }
            None => {
                released = true;
                break;
            }
            Some(_) => {}
        }
    }
    assert!(released, "tracked entity never expired");
    assert!(!engine.active_ids().contains(&tracked));
}

#[test]
fn fountain_snapshot_integrity() {
    let mut engine = SimulationEngine::from_config(SimConfig::fountain()).unwrap();
    for _ in 0..600 {
        let snapshot = engine.advance(FRAME).unwrap();
        assert_eq!(snapshot.as_floats().len(), snapshot.len() * RECORD_STRIDE);
        for record in snapshot.records() {
            assert!((0.0..=1.0).contains(&record.alpha));
            assert!((0.0..=1.0).contains(&record.age_ratio));
        }
    }
    let mut ids: Vec<u32> = engine
        .snapshot()
        .records()
        .iter()
        .map(|r| r.slot_id().raw())
        .collect();
    let len = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), len, "an entity appears twice in the snapshot");
    assert!(engine.active_count() > 0);
    assert!(engine.active_count() <= 5000);
    assert_pool_conserved(&engine);
}

#[test]
fn huge_dt_is_tolerated() {
    let mut engine = SimulationEngine::from_config(SimConfig::fountain()).unwrap();
    engine.advance(1.0e6).unwrap();
    assert!(engine.active_count() <= 5000);
    assert!(engine.snapshot().records().iter().all(|r| r.x.is_finite() && r.y.is_finite()));
    engine.advance(FRAME).unwrap();
    assert_pool_conserved(&engine);
}

#[test]
fn load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bench.toml");
    std::fs::write(
        &path,
        r#"
mode = "rotating"
seed = 11

[population]
target_count = 64
emission_window = 0.0

[canvas]
width = 800.0
height = 600.0
"#,
    )
    .unwrap();

    let config = SimConfig::load(&path).unwrap();
    assert_eq!(config.mode, AnimationMode::Rotating);
    let mut engine = SimulationEngine::from_config(config).unwrap();
    engine.advance(FRAME).unwrap();
    assert_eq!(engine.active_count(), 64);
    assert!(engine.snapshot().records().iter().all(|r| r.rotation > 0.0));

    assert!(SimConfig::load(dir.path().join("missing.toml")).is_err());
}
