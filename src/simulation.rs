//! The simulation owner: terrain, population, configuration and RNG.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info};

use crate::color::Hsl;
use crate::config::SimConfig;
use crate::creature::{Creature, CreatureFactory};
use crate::error::SimError;
use crate::geometry::Point;
use crate::interaction::{
    advance_creatures, enforce_population_cap, remove_dead, resolve_collisions,
};
use crate::patch::{update_patches, Patch};
use crate::rng::{create_rng, SimRng};
use crate::stats::PopulationStats;
use crate::terrain::generate_patches;

/// Handle for hosts that drive ticks and read state from different threads.
/// Hold the lock for a whole tick so readers only observe tick boundaries.
pub type SharedSimulation = Arc<Mutex<Simulation>>;

/// Outcome of a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub births: usize,
    pub collisions: usize,
    pub culled: usize,
    pub starved: usize,
    pub population: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreatureView {
    pub position: Point,
    pub shape: Vec<Point>,
    pub color: Hsl,
    pub energy: f32,
    pub herbivore: bool,
    pub colliding: bool,
    pub recently_cloned: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PatchView {
    pub vertices: Vec<Point>,
    pub color: Hsl,
}

/// Owned copy of everything a renderer needs.
#[derive(Clone, Debug, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub creatures: Vec<CreatureView>,
    pub patches: Vec<PatchView>,
}

pub struct Simulation {
    config: SimConfig,
    patches: Vec<Patch>,
    creatures: Vec<Creature>,
    factory: CreatureFactory,
    rng: SimRng,
    tick: u64,
}

impl Simulation {
    /// Generate terrain and seed the initial population.
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = create_rng(config.seed);
        let patches = generate_patches(&config, &mut rng);
        if patches.is_empty() {
            return Err(SimError::EmptyTerrain);
        }
        Self::assemble(config, patches, rng)
    }

    /// Use caller-supplied terrain instead of generating it.
    pub fn with_terrain(config: SimConfig, patches: Vec<Patch>) -> Result<Self, SimError> {
        config.validate()?;
        let rng = create_rng(config.seed);
        Self::assemble(config, patches, rng)
    }

    fn assemble(config: SimConfig, patches: Vec<Patch>, mut rng: SimRng) -> Result<Self, SimError> {
        let factory = CreatureFactory::new(&config, &mut rng);
        let mut sim = Simulation {
            config,
            patches,
            creatures: Vec::new(),
            factory,
            rng,
            tick: 0,
        };
        sim.populate();
        info!(
            patches = sim.patches.len(),
            creatures = sim.creatures.len(),
            seed = ?sim.config.seed,
            "simulation initialized"
        );
        Ok(sim)
    }

    fn populate(&mut self) {
        let count = self.config.initial_creatures;
        self.creatures.reserve(count);
        for _ in 0..count {
            let creature = self.factory.spawn(&self.config, &mut self.rng);
            self.creatures.push(creature);
        }
    }

    pub fn into_shared(self) -> SharedSimulation {
        Arc::new(Mutex::new(self))
    }

    /// Advance one step: patches first, then creatures, collisions and
    /// population control.
    pub fn tick(&mut self) -> TickSummary {
        update_patches(&mut self.patches, &self.config, &mut self.rng);
        let births = advance_creatures(
            &mut self.creatures,
            &mut self.patches,
            &self.factory,
            &self.config,
            &mut self.rng,
        );
        let collisions = resolve_collisions(&mut self.creatures, &self.config);
        let culled = enforce_population_cap(&mut self.creatures, self.config.max_population);
        let starved = remove_dead(&mut self.creatures);
        self.tick += 1;

        let summary = TickSummary {
            tick: self.tick,
            births,
            collisions,
            culled,
            starved,
            population: self.creatures.len(),
        };
        debug!(
            tick = summary.tick,
            births,
            collisions,
            culled,
            starved,
            population = summary.population,
            "tick complete"
        );
        summary
    }

    /// Clear the population and respawn the starting creatures. Terrain
    /// and the species roster are kept.
    pub fn reset(&mut self) {
        self.creatures.clear();
        self.populate();
        self.tick = 0;
        info!(creatures = self.creatures.len(), "population reset");
    }

    /// Replace every creature within `radius` of `center` in place with one
    /// freshly drawn body plan; positions are kept. Returns how many changed.
    pub fn replace_within(&mut self, center: Point, radius: f32) -> usize {
        let targets: Vec<usize> = self
            .creatures
            .iter()
            .enumerate()
            .filter(|(_, c)| c.position.distance_to(center) < radius)
            .map(|(i, _)| i)
            .collect();
        if targets.is_empty() {
            return 0;
        }
        let template = self.factory.spawn_at(center, &self.config, &mut self.rng);
        for &i in &targets {
            let position = self.creatures[i].position;
            self.creatures[i] =
                self.factory
                    .respawn_like(&template, position, &self.config, &mut self.rng);
        }
        debug!(
            replaced = targets.len(),
            herbivore = template.is_herbivore(),
            vertices = template.num_vertices(),
            "creatures replaced"
        );
        targets.len()
    }

    /// Pointer-click replacement using the configured radius.
    pub fn replace_near(&mut self, center: Point) -> usize {
        self.replace_within(center, self.config.click_replacement_radius)
    }

    pub fn stats(&self) -> PopulationStats {
        PopulationStats::compute(&self.creatures, &self.patches, self.config.max_energy_threshold)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        let policy = self.config.patch_color;
        WorldSnapshot {
            tick: self.tick,
            creatures: self
                .creatures
                .iter()
                .map(|c| CreatureView {
                    position: c.position,
                    shape: c.base_shape().to_vec(),
                    color: c.color,
                    energy: c.energy,
                    herbivore: c.is_herbivore(),
                    colliding: c.colliding,
                    recently_cloned: c.clone_timer > 0,
                })
                .collect(),
            patches: self
                .patches
                .iter()
                .map(|p| PatchView {
                    vertices: p.vertices().to_vec(),
                    color: p.display_color(policy),
                })
                .collect(),
        }
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Changes take effect on the next tick.
    pub fn config_mut(&mut self) -> &mut SimConfig {
        &mut self.config
    }

    /// Starting population for the next `reset`; also rescales the cap.
    pub fn set_initial_creatures(&mut self, count: usize) {
        self.config.set_initial_creatures(count);
        debug!(count, max_population = self.config.max_population, "starting population changed");
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn creatures_mut(&mut self) -> &mut Vec<Creature> {
        &mut self.creatures
    }

    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    pub fn patches_mut(&mut self) -> &mut [Patch] {
        &mut self.patches
    }

    pub fn factory(&self) -> &CreatureFactory {
        &self.factory
    }
}
