//! Artificial-life sandbox: herbivores and predators competing for energy
//! over a Voronoi terrain of colored, grazeable patches.

pub mod color;
pub mod config;
pub mod creature;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod patch;
pub mod rng;
pub mod simulation;
pub mod spatial;
pub mod stats;
pub mod terrain;

pub use color::Hsl;
pub use config::{
    Broadphase, ClassificationPolicy, CollisionPolicy, PatchColorPolicy, ReproductionPolicy,
    SimConfig,
};
pub use creature::{Creature, CreatureFactory, ShapeStyle, Species};
pub use error::{ConfigError, SimError};
pub use geometry::Point;
pub use patch::Patch;
pub use simulation::{
    CreatureView, PatchView, SharedSimulation, Simulation, TickSummary, WorldSnapshot,
};
pub use stats::PopulationStats;
