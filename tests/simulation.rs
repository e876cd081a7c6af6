use color_economy::{
    Broadphase, ConfigError, Creature, Patch, PatchColorPolicy, Point, SimConfig, SimError,
    Simulation,
};

fn small_config(seed: u64) -> SimConfig {
    SimConfig {
        seed: Some(seed),
        world_width: 400.0,
        world_height: 300.0,
        num_patches: 12,
        initial_creatures: 30,
        ..SimConfig::default()
    }
}

fn square(width: f32, height: f32) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ]
}

#[test]
fn new_simulation_has_terrain_and_population() {
    let sim = Simulation::new(small_config(1)).unwrap();
    assert!(!sim.patches().is_empty());
    assert_eq!(sim.creatures().len(), 30);
    assert_eq!(sim.tick_count(), 0);
    for patch in sim.patches() {
        assert!(patch.sides() >= 3 && patch.sides() <= 8);
    }
}

#[test]
fn invalid_config_is_rejected() {
    let config = SimConfig {
        num_patches: 0,
        ..SimConfig::default()
    };
    assert!(matches!(
        Simulation::new(config),
        Err(SimError::Config(ConfigError::ZeroPatches))
    ));
}

#[test]
fn same_seed_same_history() {
    let mut a = Simulation::new(small_config(42)).unwrap();
    let mut b = Simulation::new(small_config(42)).unwrap();
    for _ in 0..25 {
        assert_eq!(a.tick(), b.tick());
    }
    let left = serde_json::to_string(&a.snapshot()).unwrap();
    let right = serde_json::to_string(&b.snapshot()).unwrap();
    assert_eq!(left, right);
}

#[test]
fn ticks_are_counted() {
    let mut sim = Simulation::new(small_config(3)).unwrap();
    let first = sim.tick();
    let second = sim.tick();
    assert_eq!(first.tick, 1);
    assert_eq!(second.tick, 2);
    assert_eq!(second.population, sim.creatures().len());
}

#[test]
fn patch_resource_stays_in_range() {
    let mut sim = Simulation::new(small_config(5)).unwrap();
    for _ in 0..200 {
        sim.tick();
        for patch in sim.patches() {
            assert!((0.0..=100.0).contains(&patch.resource), "resource {}", patch.resource);
            assert!((0.0..360.0).contains(&patch.hue), "hue {}", patch.hue);
        }
    }
}

#[test]
fn positions_stay_inside_the_world() {
    let mut sim = Simulation::new(small_config(6)).unwrap();
    for _ in 0..100 {
        sim.tick();
        for c in sim.creatures() {
            assert!(c.position.x >= 0.0 && c.position.x < 400.0);
            assert!(c.position.y >= 0.0 && c.position.y < 300.0);
        }
    }
}

#[test]
fn population_never_exceeds_cap() {
    for broadphase in [Broadphase::Naive, Broadphase::Grid] {
        let config = SimConfig {
            initial_creatures: 40,
            max_population: 10,
            broadphase,
            ..small_config(9)
        };
        let mut sim = Simulation::new(config).unwrap();
        for _ in 0..20 {
            let summary = sim.tick();
            assert!(summary.population <= 10);
            assert!(sim.creatures().len() <= 10);
        }
    }
}

#[test]
fn full_creature_reproduces_once() {
    let config = SimConfig {
        initial_creatures: 0,
        energy_decay_rate: 0.0,
        light_boost_scale: 0.0,
        ..small_config(11)
    };
    let mut sim = Simulation::with_terrain(config.clone(), vec![Patch::new(square(400.0, 300.0), 120.0, 60.0, &config)])
        .unwrap();
    assert!(sim.creatures().is_empty());

    let mut parent = Creature::new(Point::new(200.0, 150.0), 3, true, Vec::new(), 10.0);
    parent.energy = 100.0;
    parent.max_energy = 100.0;
    sim.creatures_mut().push(parent);

    let summary = sim.tick();
    assert_eq!(summary.births, 1);
    assert_eq!(sim.creatures().len(), 2);
    let parent = &sim.creatures()[0];
    let child = &sim.creatures()[1];
    assert!((parent.energy - 50.0).abs() < 1e-4);
    assert!((child.energy - 50.0).abs() < 1e-4);
    assert_eq!(child.color, parent.color);
    assert!(parent.clone_timer > 0);
}

#[test]
fn reset_keeps_terrain() {
    let mut sim = Simulation::new(small_config(13)).unwrap();
    let before: Vec<Vec<Point>> = sim.patches().iter().map(|p| p.vertices().to_vec()).collect();
    for _ in 0..10 {
        sim.tick();
    }
    sim.creatures_mut().clear();
    sim.reset();

    let after: Vec<Vec<Point>> = sim.patches().iter().map(|p| p.vertices().to_vec()).collect();
    assert_eq!(before, after);
    assert_eq!(sim.creatures().len(), 30);
    assert_eq!(sim.tick_count(), 0);
}

#[test]
fn starting_population_applies_on_reset() {
    let mut sim = Simulation::new(small_config(37)).unwrap();
    sim.set_initial_creatures(8);
    assert_eq!(sim.creatures().len(), 30);
    assert_eq!(sim.config().max_population, 80);
    sim.reset();
    assert_eq!(sim.creatures().len(), 8);
}

#[test]
fn replacement_keeps_positions_and_shares_a_body_plan() {
    let mut sim = Simulation::new(small_config(17)).unwrap();
    let positions: Vec<Point> = sim.creatures().iter().map(|c| c.position).collect();

    let replaced = sim.replace_within(Point::new(200.0, 150.0), 10_000.0);
    assert_eq!(replaced, positions.len());

    let creatures = sim.creatures();
    let after: Vec<Point> = creatures.iter().map(|c| c.position).collect();
    assert_eq!(positions, after);
    let first = &creatures[0];
    for c in creatures {
        assert_eq!(c.is_herbivore(), first.is_herbivore());
        assert_eq!(c.num_vertices(), first.num_vertices());
        assert_eq!(c.color, first.color);
    }
}

#[test]
fn replacement_outside_everyone_changes_nothing() {
    let mut sim = Simulation::with_terrain(small_config(19), Vec::new()).unwrap();
    sim.creatures_mut().clear();
    assert_eq!(sim.replace_within(Point::new(0.0, 0.0), 50.0), 0);
}

#[test]
fn stats_follow_the_population() {
    let mut sim = Simulation::new(small_config(23)).unwrap();
    sim.tick();
    let stats = sim.stats();
    let creatures = sim.creatures();
    assert_eq!(stats.total, creatures.len());
    assert_eq!(
        stats.herbivores,
        creatures.iter().filter(|c| c.is_herbivore()).count()
    );
    assert_eq!(stats.predators + stats.herbivores, stats.total);
    assert!((0.0..=1.0).contains(&stats.mean_resource_fraction));
}

#[test]
fn config_changes_apply_next_tick() {
    let mut sim = Simulation::new(small_config(29)).unwrap();
    sim.config_mut().energy_decay_rate = 10_000.0;
    let summary = sim.tick();
    assert_eq!(summary.population, 0);
    assert!(sim.creatures().is_empty());
}

#[test]
fn snapshot_mirrors_state() {
    let sim = Simulation::new(small_config(31)).unwrap();
    let snapshot = sim.snapshot();
    assert_eq!(snapshot.tick, 0);
    assert_eq!(snapshot.creatures.len(), sim.creatures().len());
    assert_eq!(snapshot.patches.len(), sim.patches().len());
    for (view, creature) in snapshot.creatures.iter().zip(sim.creatures()) {
        assert_eq!(view.position, creature.position);
        assert_eq!(view.herbivore, creature.is_herbivore());
        assert_eq!(view.shape.len(), creature.base_shape().len());
    }
}

#[test]
fn patch_light_stays_in_band_under_both_color_policies() {
    for patch_color in [PatchColorPolicy::Diffusion, PatchColorPolicy::FeedOverlay] {
        let config = SimConfig {
            seed: Some(3),
            patch_color,
            ..SimConfig::default()
        };
        let (floor, ceiling) = (config.light_floor, config.light_ceiling);
        let mut sim = Simulation::new(config).unwrap();
        for _ in 0..5 {
            sim.tick();
            let outside = sim
                .patches()
                .iter()
                .filter(|p| p.light < floor || p.light > ceiling)
                .count();
            assert_eq!(outside, 0, "{patch_color:?}");
        }
    }
}

#[test]
fn cap_culls_only_the_weakest() {
    let config = SimConfig {
        initial_creatures: 0,
        max_population: 5,
        energy_decay_rate: 0.0,
        light_boost_scale: 0.0,
        ..small_config(41)
    };
    let terrain = vec![Patch::new(square(400.0, 300.0), 200.0, 60.0, &config)];
    let mut sim = Simulation::with_terrain(config, terrain).unwrap();

    // Motionless predators far enough apart that nothing collides.
    for i in 0..20 {
        let position = Point::new(35.0 + 70.0 * (i % 5) as f32, 35.0 + 70.0 * (i / 5) as f32);
        let mut c = Creature::new(position, 4, false, Vec::new(), 10.0);
        c.energy = 1.0 + ((i * 7) % 20) as f32;
        c.max_energy = 150.0;
        sim.creatures_mut().push(c);
    }
    let before: Vec<(Point, f32)> = sim.creatures().iter().map(|c| (c.position, c.energy)).collect();

    let summary = sim.tick();
    assert_eq!(summary.culled, 15);
    assert_eq!(summary.collisions, 0);

    let kept: Vec<Point> = sim.creatures().iter().map(|c| c.position).collect();
    let (retained, culled): (Vec<_>, Vec<_>) =
        before.iter().partition(|(position, _)| kept.contains(position));
    assert_eq!(retained.len(), 5);
    let weakest_kept = retained.iter().map(|(_, e)| *e).fold(f32::INFINITY, f32::min);
    let strongest_culled = culled.iter().map(|(_, e)| *e).fold(f32::NEG_INFINITY, f32::max);
    assert!(strongest_culled <= weakest_kept);
}
