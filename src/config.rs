use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SimError};

/// Most vertices a creature body may have.
pub const MAX_SHAPE_VERTICES: u32 = 64;

/// How a spawned creature's type and body plan are chosen.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPolicy {
    /// Draw the type by `herbivore_probability`, then pick uniformly from a
    /// per-run roster of pre-generated species.
    #[default]
    SpeciesRoster,
    /// Draw a vertex count bounded by `diversity`; odd counts are herbivores.
    VertexParity,
}

/// How a patch's display color evolves.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PatchColorPolicy {
    /// Neighbor hue diffusion, random drift and splashes.
    #[default]
    Diffusion,
    /// Feeding paints the patch with the feeder's color; a white overlay
    /// grows back while the patch is left alone.
    FeedOverlay,
}

/// How a colliding pair of creatures is resolved.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Mixed pairs transfer energy only when one side dominates by
    /// `dominance_ratio`; otherwise (and for same-type pairs) they bounce.
    #[default]
    EnergyThreshold,
    /// Mixed pairs: the predator always wins. Same-type pairs bounce.
    PredatorWins,
}

/// How the reproduction energy threshold is derived.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReproductionPolicy {
    /// `max_energy / birth_rate` for the creature's type.
    #[default]
    BirthRate,
    /// Fixed `herbivore_birth_threshold` / `predator_birth_threshold`.
    AbsoluteThreshold,
}

/// Candidate pair generation for the collision scan.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Broadphase {
    /// Every pair in array order.
    #[default]
    Naive,
    /// Uniform grid bucketing; pairs are still resolved in array order.
    Grid,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub world_width: f32,
    pub world_height: f32,

    // Terrain
    pub num_patches: usize,
    pub min_patch_sides: usize,
    pub max_patch_sides: usize,
    /// Maximum offset applied to each grid seed point.
    pub seed_jitter: f32,

    // Patch color evolution
    pub neighbor_threshold: f32,
    pub hue_adjustment_factor: f32,
    pub hue_random_drift: f32,
    pub light_drift: f32,
    pub bold_saturation: f32,
    /// Initial lightness band for freshly generated patches.
    pub bold_light_min: f32,
    pub bold_light_max: f32,
    /// Band lightness is clamped to while it drifts.
    pub light_floor: f32,
    pub light_ceiling: f32,
    pub splash_probability: f32,
    pub splash_max_offset: f32,
    pub splash_life_decay: f32,
    /// Per-tick growth of the white overlay under the feed overlay policy.
    pub overlay_recovery: f32,

    // Resource economy
    pub patch_resource_initial: f32,
    pub patch_resource_recovery: f32,
    pub patch_resource_drain: f32,

    // Creatures
    pub initial_creatures: usize,
    pub min_vertices: u32,
    pub max_vertices: u32,
    pub base_energy: f32,
    pub max_energy_threshold: f32,
    pub energy_decay_rate: f32,
    pub herbivore_energy_gain: f32,
    pub predator_energy_gain: f32,
    pub predator_energy_loss: f32,
    pub movement_speed: f32,
    pub creature_radius: f32,
    pub bounce_factor: f32,
    /// Render-time jitter of shape vertices; never touches simulation state.
    pub wiggle_radius: f32,
    pub spawn_mutation_chance: f32,
    pub click_replacement_radius: f32,
    pub max_population: usize,
    pub predator_birth_rate: f32,
    pub prey_birth_rate: f32,
    pub herbivore_birth_threshold: f32,
    pub predator_birth_threshold: f32,
    pub diversity: f32,
    pub herbivore_probability: f32,
    pub herbivore_species_count: usize,
    pub predator_species_count: usize,
    pub herbivore_size_factor: f32,
    pub predator_size_factor: f32,
    pub herbivore_speed_factor: f32,
    pub predator_speed_factor: f32,
    /// Per-tick velocity nudge toward a steering target.
    pub pursuit_acceleration: f32,
    /// Velocity magnitude cap, as a multiple of `movement_speed`.
    pub speed_limit_factor: f32,
    pub patch_seek_radius: f32,
    /// Resource units a patch's score loses per unit of distance.
    pub patch_seek_distance_penalty: f32,
    /// Patch lightness at which the location energy boost is zero.
    pub light_boost_pivot: f32,
    pub light_boost_scale: f32,
    pub clone_jitter: f32,
    pub clone_timer_ticks: u32,
    /// Energy ratio one side of a mixed pair must exceed to win.
    pub dominance_ratio: f32,
    pub offspring_inherit_species: bool,

    // Policies
    pub classification: ClassificationPolicy,
    pub patch_color: PatchColorPolicy,
    pub collision: CollisionPolicy,
    pub reproduction: ReproductionPolicy,
    pub broadphase: Broadphase,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            world_width: 1920.0,
            world_height: 1080.0,
            num_patches: 100,
            min_patch_sides: 3,
            max_patch_sides: 8,
            seed_jitter: 50.0,
            neighbor_threshold: 300.0,
            hue_adjustment_factor: 0.01,
            hue_random_drift: 0.5,
            light_drift: 0.2,
            bold_saturation: 100.0,
            bold_light_min: 50.0,
            bold_light_max: 70.0,
            light_floor: 60.0,
            light_ceiling: 90.0,
            splash_probability: 0.03,
            splash_max_offset: 30.0,
            splash_life_decay: 0.02,
            overlay_recovery: 0.005,
            patch_resource_initial: 100.0,
            patch_resource_recovery: 0.1,
            patch_resource_drain: 0.5,
            initial_creatures: 100,
            min_vertices: 3,
            max_vertices: 8,
            base_energy: 80.0,
            max_energy_threshold: 150.0,
            energy_decay_rate: 0.1,
            herbivore_energy_gain: 0.2,
            predator_energy_gain: 10.0,
            predator_energy_loss: 20.0,
            movement_speed: 1.0,
            creature_radius: 15.0,
            bounce_factor: 1.0,
            wiggle_radius: 2.0,
            spawn_mutation_chance: 0.3,
            click_replacement_radius: 100.0,
            max_population: 1000,
            predator_birth_rate: 1.0,
            prey_birth_rate: 1.0,
            herbivore_birth_threshold: 150.0,
            predator_birth_threshold: 150.0,
            diversity: 1.0,
            herbivore_probability: 0.5,
            herbivore_species_count: 5,
            predator_species_count: 5,
            herbivore_size_factor: 2.0,
            predator_size_factor: 0.7,
            herbivore_speed_factor: 0.7,
            predator_speed_factor: 1.3,
            pursuit_acceleration: 0.05,
            speed_limit_factor: 3.0,
            patch_seek_radius: 300.0,
            patch_seek_distance_penalty: 0.1,
            light_boost_pivot: 60.0,
            light_boost_scale: 0.01,
            clone_jitter: 5.0,
            clone_timer_ticks: 20,
            dominance_ratio: 1.1,
            offspring_inherit_species: false,
            classification: ClassificationPolicy::default(),
            patch_color: PatchColorPolicy::default(),
            collision: CollisionPolicy::default(),
            reproduction: ReproductionPolicy::default(),
            broadphase: Broadphase::default(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON configuration table; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounds_ok = |v: f32| v.is_finite() && v > 0.0;
        if !bounds_ok(self.world_width) || !bounds_ok(self.world_height) {
            return Err(ConfigError::InvalidBounds {
                width: self.world_width,
                height: self.world_height,
            });
        }
        if self.num_patches == 0 {
            return Err(ConfigError::ZeroPatches);
        }
        if self.min_patch_sides < 3 || self.min_patch_sides > self.max_patch_sides {
            return Err(ConfigError::InvalidPatchSides {
                min: self.min_patch_sides,
                max: self.max_patch_sides,
            });
        }
        if self.min_vertices == 0 || self.min_vertices > self.max_vertices {
            return Err(ConfigError::InvalidVertices {
                min: self.min_vertices,
                max: self.max_vertices,
            });
        }
        for (field, value) in [
            ("splash_probability", self.splash_probability),
            ("spawn_mutation_chance", self.spawn_mutation_chance),
            ("herbivore_probability", self.herbivore_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { field, value });
            }
        }
        for (field, min, max) in [
            ("bold_light", self.bold_light_min, self.bold_light_max),
            ("light_clamp", self.light_floor, self.light_ceiling),
        ] {
            if min > max {
                return Err(ConfigError::InvertedRange { field, min, max });
            }
        }
        for (field, value) in [
            ("neighbor_threshold", self.neighbor_threshold),
            ("seed_jitter", self.seed_jitter),
            ("movement_speed", self.movement_speed),
            ("creature_radius", self.creature_radius),
            ("diversity", self.diversity),
            ("predator_birth_rate", self.predator_birth_rate),
            ("prey_birth_rate", self.prey_birth_rate),
            ("splash_life_decay", self.splash_life_decay),
            ("patch_seek_radius", self.patch_seek_radius),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeValue { field, value });
            }
        }
        let requested = self.min_vertices as f32 + self.scaled_vertex_span();
        if self.max_vertices > MAX_SHAPE_VERTICES || requested > MAX_SHAPE_VERTICES as f32 {
            return Err(ConfigError::TooManyVertices {
                requested: requested.max(self.max_vertices as f32),
                limit: MAX_SHAPE_VERTICES,
            });
        }
        if self.max_population == 0 {
            return Err(ConfigError::ZeroPopulationCap);
        }
        if self.classification == ClassificationPolicy::SpeciesRoster
            && (self.herbivore_species_count == 0 || self.predator_species_count == 0)
        {
            return Err(ConfigError::EmptyRoster);
        }
        Ok(())
    }

    /// Energy at which a creature of the given type reproduces.
    pub fn birth_threshold(&self, herbivore: bool, max_energy: f32) -> f32 {
        match self.reproduction {
            ReproductionPolicy::BirthRate => {
                let rate = if herbivore {
                    self.prey_birth_rate
                } else {
                    self.predator_birth_rate
                };
                if rate > 0.0 {
                    max_energy / rate
                } else {
                    f32::INFINITY
                }
            }
            ReproductionPolicy::AbsoluteThreshold => {
                if herbivore {
                    self.herbivore_birth_threshold
                } else {
                    self.predator_birth_threshold
                }
            }
        }
    }

    /// Upper vertex bound for parametric spawns, scaled by `diversity`.
    /// Never exceeds `MAX_SHAPE_VERTICES`, even for a config edited after
    /// validation.
    pub fn effective_max_vertices(&self) -> u32 {
        let scaled = self.scaled_vertex_span().min(MAX_SHAPE_VERTICES as f32) as u32;
        self.min_vertices
            .saturating_add(scaled)
            .min(MAX_SHAPE_VERTICES.max(self.min_vertices))
    }

    fn scaled_vertex_span(&self) -> f32 {
        let span = self.max_vertices.saturating_sub(self.min_vertices) as f32;
        (span * self.diversity).round()
    }

    /// Apply the starting-population control; the cap follows at 10x.
    pub fn set_initial_creatures(&mut self, count: usize) {
        self.initial_creatures = count;
        self.max_population = (count * 10).max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SimConfig::from_json_str(
            r#"{ "num_patches": 12, "collision": "predator_wins", "seed": 7 }"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.num_patches, 12);
        assert_eq!(cfg.collision, CollisionPolicy::PredatorWins);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.max_population, 1000);
        assert_eq!(cfg.patch_color, PatchColorPolicy::Diffusion);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let result = SimConfig::from_json_str(r#"{ "collision": "coin_flip" }"#);
        assert!(matches!(result, Err(SimError::Parse(_))));
    }

    #[test]
    fn rejects_inverted_patch_sides() {
        let cfg = SimConfig {
            min_patch_sides: 6,
            max_patch_sides: 4,
            ..SimConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidPatchSides { min: 6, max: 4 })
        );
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let cfg = SimConfig {
            herbivore_probability: 1.5,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidProbability {
                field: "herbivore_probability",
                ..
            })
        ));
    }

    #[test]
    fn rejects_empty_roster_only_for_roster_policy() {
        let mut cfg = SimConfig {
            predator_species_count: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRoster));
        cfg.classification = ClassificationPolicy::VertexParity;
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn birth_threshold_follows_rate_and_policy() {
        let mut cfg = SimConfig {
            prey_birth_rate: 2.0,
            predator_birth_rate: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.birth_threshold(true, 150.0), 75.0);
        assert!(cfg.birth_threshold(false, 150.0).is_infinite());
        cfg.reproduction = ReproductionPolicy::AbsoluteThreshold;
        cfg.predator_birth_threshold = 120.0;
        assert_eq!(cfg.birth_threshold(false, 150.0), 120.0);
    }

    #[test]
    fn diversity_scales_vertex_ceiling() {
        let mut cfg = SimConfig::default();
        assert_eq!(cfg.effective_max_vertices(), 8);
        cfg.diversity = 0.0;
        assert_eq!(cfg.effective_max_vertices(), 3);
        cfg.diversity = 2.0;
        assert_eq!(cfg.effective_max_vertices(), 13);
    }

    #[test]
    fn oversized_diversity_is_rejected_and_bounded() {
        let cfg = SimConfig {
            classification: ClassificationPolicy::VertexParity,
            diversity: 1.0e9,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooManyVertices { limit: MAX_SHAPE_VERTICES, .. })
        ));
        assert_eq!(cfg.effective_max_vertices(), MAX_SHAPE_VERTICES);

        let cfg = SimConfig {
            max_vertices: MAX_SHAPE_VERTICES + 1,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::TooManyVertices { .. })));
    }

    #[test]
    fn starting_population_rescales_cap() {
        let mut cfg = SimConfig::default();
        cfg.set_initial_creatures(40);
        assert_eq!(cfg.initial_creatures, 40);
        assert_eq!(cfg.max_population, 400);
    }
}
