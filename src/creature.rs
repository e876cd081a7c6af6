//! Creatures, their body plans, and the factory that spawns them.

use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::Hsl;
use crate::config::{ClassificationPolicy, SimConfig};
use crate::geometry::Point;
use crate::rng::{chance, rand_range};

/// Silhouette generators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeStyle {
    /// Random angles and radii: jagged, unordered.
    Twisted,
    /// Evenly spaced angles with bounded radial jitter: round, ordered.
    Virus,
}

impl ShapeStyle {
    pub fn for_type(herbivore: bool) -> Self {
        if herbivore {
            ShapeStyle::Virus
        } else {
            ShapeStyle::Twisted
        }
    }

    pub fn generate<R: Rng + ?Sized>(self, num_vertices: u32, radius: f32, rng: &mut R) -> Vec<Point> {
        match self {
            ShapeStyle::Twisted => twisted_shape(num_vertices, radius, rng),
            ShapeStyle::Virus => virus_shape(num_vertices, radius, rng),
        }
    }
}

pub fn twisted_shape<R: Rng + ?Sized>(num_vertices: u32, radius: f32, rng: &mut R) -> Vec<Point> {
    (0..num_vertices)
        .map(|_| {
            let angle = rand_range(rng, 0.0, TAU);
            let r = radius * rand_range(rng, 0.5, 1.5);
            Point::new(r * angle.cos(), r * angle.sin())
        })
        .collect()
}

pub fn virus_shape<R: Rng + ?Sized>(num_vertices: u32, radius: f32, rng: &mut R) -> Vec<Point> {
    let step = TAU / num_vertices.max(1) as f32;
    (0..num_vertices)
        .map(|i| {
            let angle = i as f32 * step;
            let r = radius * rand_range(rng, 0.8, 1.2);
            Point::new(r * angle.cos(), r * angle.sin())
        })
        .collect()
}

/// One entry of the per-run species roster.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Species {
    pub num_vertices: u32,
    pub herbivore: bool,
    pub shape: Vec<Point>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Creature {
    pub position: Point,
    pub velocity: Point,
    num_vertices: u32,
    herbivore: bool,
    base_shape: Vec<Point>,
    pub species: Option<usize>,
    pub color: Hsl,
    pub energy: f32,
    pub max_energy: f32,
    pub radius: f32,
    /// Cruise speed the spawn velocity was drawn from.
    pub speed: f32,
    pub colliding: bool,
    pub clone_timer: u32,
}

impl Creature {
    /// A motionless creature with no energy; callers fill in the rest.
    pub fn new(
        position: Point,
        num_vertices: u32,
        herbivore: bool,
        base_shape: Vec<Point>,
        radius: f32,
    ) -> Self {
        Creature {
            position,
            velocity: Point::default(),
            num_vertices,
            herbivore,
            base_shape,
            species: None,
            color: Hsl::new(0.0, 0.0, 50.0),
            energy: 0.0,
            max_energy: 0.0,
            radius,
            speed: 0.0,
            colliding: false,
            clone_timer: 0,
        }
    }

    #[inline]
    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    #[inline]
    pub fn is_herbivore(&self) -> bool {
        self.herbivore
    }

    #[inline]
    pub fn base_shape(&self) -> &[Point] {
        &self.base_shape
    }

    #[inline]
    pub fn distance_to(&self, other: &Creature) -> f32 {
        self.position.distance_to(other.position)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.energy > 0.0
    }
}

/// More vertices means slower, bounded to `[1/max, 1]`.
pub fn speed_multiplier(num_vertices: u32, config: &SimConfig) -> f32 {
    let max = config.max_vertices.max(1) as f32;
    ((max + 1.0 - num_vertices as f32) / max).clamp(1.0 / max, 1.0)
}

/// More vertices means larger, bounded to `[1, 1.5]`.
pub fn size_multiplier(num_vertices: u32, config: &SimConfig) -> f32 {
    let span = config.max_vertices.saturating_sub(config.min_vertices);
    let frac = if span == 0 {
        0.0
    } else {
        (num_vertices.saturating_sub(config.min_vertices) as f32 / span as f32).clamp(0.0, 1.0)
    };
    1.0 + frac * 0.5
}

/// Body dimensions derived from vertex count and type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Build {
    pub radius: f32,
    pub speed: f32,
}

pub fn build_for(num_vertices: u32, herbivore: bool, config: &SimConfig) -> Build {
    let (size_factor, speed_factor) = if herbivore {
        (config.herbivore_size_factor, config.herbivore_speed_factor)
    } else {
        (config.predator_size_factor, config.predator_speed_factor)
    };
    Build {
        radius: config.creature_radius * size_multiplier(num_vertices, config) * size_factor,
        speed: config.movement_speed * speed_multiplier(num_vertices, config) * speed_factor,
    }
}

/// Spawns creatures. Holds the species roster, which lives for the whole run.
#[derive(Clone, Debug, Default)]
pub struct CreatureFactory {
    herbivore_roster: Vec<Species>,
    predator_roster: Vec<Species>,
}

impl CreatureFactory {
    pub fn new<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Self {
        let mut factory = CreatureFactory::default();
        if config.classification == ClassificationPolicy::SpeciesRoster {
            factory.herbivore_roster = (0..config.herbivore_species_count)
                .map(|_| Self::roll_species(true, config, rng))
                .collect();
            factory.predator_roster = (0..config.predator_species_count)
                .map(|_| Self::roll_species(false, config, rng))
                .collect();
        }
        factory
    }

    pub fn roster(&self, herbivore: bool) -> &[Species] {
        if herbivore {
            &self.herbivore_roster
        } else {
            &self.predator_roster
        }
    }

    fn roll_vertices<R: Rng + ?Sized>(min: u32, max: u32, rng: &mut R) -> u32 {
        rng.gen_range(min..=max.max(min))
    }

    fn roll_species<R: Rng + ?Sized>(herbivore: bool, config: &SimConfig, rng: &mut R) -> Species {
        let num_vertices = Self::roll_vertices(config.min_vertices, config.max_vertices, rng);
        let build = build_for(num_vertices, herbivore, config);
        Species {
            num_vertices,
            herbivore,
            shape: ShapeStyle::for_type(herbivore).generate(num_vertices, build.radius, rng),
        }
    }

    /// Type, vertex count, shape and roster index for a new body plan.
    fn roll_body<R: Rng + ?Sized>(
        &self,
        config: &SimConfig,
        rng: &mut R,
    ) -> (bool, u32, Option<Vec<Point>>, Option<usize>) {
        match config.classification {
            ClassificationPolicy::SpeciesRoster => {
                let herbivore = chance(rng, config.herbivore_probability);
                let roster = self.roster(herbivore);
                if roster.is_empty() {
                    let n = Self::roll_vertices(config.min_vertices, config.max_vertices, rng);
                    return (herbivore, n, None, None);
                }
                let index = rng.gen_range(0..roster.len());
                let species = &roster[index];
                (herbivore, species.num_vertices, Some(species.shape.clone()), Some(index))
            }
            ClassificationPolicy::VertexParity => {
                let n = Self::roll_vertices(config.min_vertices, config.effective_max_vertices(), rng);
                (n % 2 == 1, n, None, None)
            }
        }
    }

    /// A fresh creature at a random position.
    pub fn spawn<R: Rng + ?Sized>(&self, config: &SimConfig, rng: &mut R) -> Creature {
        let position = Point::new(
            rand_range(rng, 0.0, config.world_width),
            rand_range(rng, 0.0, config.world_height),
        );
        self.spawn_at(position, config, rng)
    }

    pub fn spawn_at<R: Rng + ?Sized>(&self, position: Point, config: &SimConfig, rng: &mut R) -> Creature {
        let (mut herbivore, mut num_vertices, mut shape, mut species) = self.roll_body(config, rng);

        if chance(rng, config.spawn_mutation_chance) {
            let max = match config.classification {
                ClassificationPolicy::SpeciesRoster => config.max_vertices,
                ClassificationPolicy::VertexParity => config.effective_max_vertices(),
            };
            num_vertices = Self::roll_vertices(config.min_vertices, max, rng);
            if config.classification == ClassificationPolicy::VertexParity {
                herbivore = num_vertices % 2 == 1;
            }
            shape = None;
            species = None;
        }

        let build = build_for(num_vertices, herbivore, config);
        let shape = shape.unwrap_or_else(|| {
            ShapeStyle::for_type(herbivore).generate(num_vertices, build.radius, rng)
        });
        let mut creature = Creature::new(position, num_vertices, herbivore, shape, build.radius);
        creature.species = species;
        creature.speed = build.speed;
        creature.velocity = Point::new(
            rand_range(rng, -build.speed, build.speed),
            rand_range(rng, -build.speed, build.speed),
        );
        creature.color = Hsl::random_vivid(rng);
        creature.energy = config.base_energy;
        creature.max_energy = config.max_energy_threshold;
        creature
    }

    /// Offspring of `parent`, placed near it. Inherits color, energy and
    /// energy ceiling; the body plan is inherited only when configured.
    pub fn offspring<R: Rng + ?Sized>(&self, parent: &Creature, config: &SimConfig, rng: &mut R) -> Creature {
        let position = Point::new(
            parent.position.x + rand_range(rng, -config.clone_jitter, config.clone_jitter),
            parent.position.y + rand_range(rng, -config.clone_jitter, config.clone_jitter),
        );
        let mut child = if config.offspring_inherit_species {
            let mut child = Creature::new(
                position,
                parent.num_vertices,
                parent.herbivore,
                parent.base_shape.clone(),
                parent.radius,
            );
            child.species = parent.species;
            child.speed = parent.speed;
            child.velocity = Point::new(
                rand_range(rng, -parent.speed, parent.speed),
                rand_range(rng, -parent.speed, parent.speed),
            );
            child
        } else {
            self.spawn_at(position, config, rng)
        };
        child.color = parent.color;
        child.energy = parent.energy;
        child.max_energy = parent.max_energy;
        child
    }

    /// Regenerate `template`'s body plan at `position`: same type, vertex
    /// count, color and species. Roster members keep the roster shape;
    /// mutants get a new one. Velocity and energy are fresh.
    pub fn respawn_like<R: Rng + ?Sized>(
        &self,
        template: &Creature,
        position: Point,
        config: &SimConfig,
        rng: &mut R,
    ) -> Creature {
        let build = build_for(template.num_vertices, template.herbivore, config);
        let species = template
            .species
            .filter(|&index| index < self.roster(template.herbivore).len());
        let shape = match species {
            Some(index) => self.roster(template.herbivore)[index].shape.clone(),
            None => ShapeStyle::for_type(template.herbivore).generate(template.num_vertices, build.radius, rng),
        };
        let mut creature = Creature::new(position, template.num_vertices, template.herbivore, shape, build.radius);
        creature.species = species;
        creature.speed = build.speed;
        creature.velocity = Point::new(
            rand_range(rng, -build.speed, build.speed),
            rand_range(rng, -build.speed, build.speed),
        );
        creature.color = template.color;
        creature.energy = config.base_energy;
        creature.max_energy = config.max_energy_threshold;
        creature
    }
}
