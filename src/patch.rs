//! Terrain cells: resource economy and display color.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::Hsl;
use crate::config::{PatchColorPolicy, SimConfig};
use crate::geometry::{centroid, point_in_polygon, wrap_coordinate, Point};
use crate::rng::{chance, rand_range};

/// Upper bound of a patch's resource level.
pub const MAX_RESOURCE: f32 = 100.0;

/// Transient hue perturbation that fades out with `life`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Splash {
    pub hue_offset: f32,
    pub life: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Patch {
    vertices: Vec<Point>,
    center: Point,
    pub hue: f32,
    pub light: f32,
    pub resource: f32,
    pub splash: Option<Splash>,
    /// Current display color (without overlay).
    pub base_color: Hsl,
    /// White overlay under the feed overlay policy; 0 right after feeding.
    pub overlay: f32,
}

impl Patch {
    pub fn new(vertices: Vec<Point>, hue: f32, light: f32, config: &SimConfig) -> Self {
        let center = centroid(&vertices).unwrap_or_default();
        let resource = config.patch_resource_initial.clamp(0.0, MAX_RESOURCE);
        Patch {
            vertices,
            center,
            hue,
            light,
            resource,
            splash: None,
            base_color: Hsl::new(hue, config.bold_saturation, light),
            overlay: 1.0,
        }
    }

    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    #[inline]
    pub fn sides(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn center(&self) -> Point {
        self.center
    }

    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.vertices)
    }

    /// Color handed to renderers.
    pub fn display_color(&self, policy: PatchColorPolicy) -> Hsl {
        match policy {
            PatchColorPolicy::Diffusion => self.base_color,
            PatchColorPolicy::FeedOverlay => self.base_color.whitened(self.overlay),
        }
    }

    /// Whether a body with `num_vertices` sides may graze here.
    #[inline]
    pub fn accepts(&self, num_vertices: u32) -> bool {
        num_vertices > 0 && self.sides() % num_vertices as usize == 0
    }

    /// Drain resource for one feeding. Rejected when the patch is empty.
    pub fn feed(&mut self, feeder_color: Hsl, config: &SimConfig) -> bool {
        if self.resource <= 0.0 {
            return false;
        }
        self.resource = (self.resource - config.patch_resource_drain).clamp(0.0, MAX_RESOURCE);
        if config.patch_color == PatchColorPolicy::FeedOverlay {
            self.base_color = feeder_color;
            self.overlay = 0.0;
        }
        true
    }

    /// Energy delta for a creature standing on this patch.
    #[inline]
    pub fn energy_boost(&self, config: &SimConfig) -> f32 {
        (self.light - config.light_boost_pivot) * config.light_boost_scale
    }

    fn recover(&mut self, config: &SimConfig) {
        self.resource = (self.resource + config.patch_resource_recovery).clamp(0.0, MAX_RESOURCE);
    }

    fn evolve_diffusion<R: Rng + ?Sized>(
        &mut self,
        neighbor_hue: Option<f32>,
        config: &SimConfig,
        rng: &mut R,
    ) {
        if let Some(avg) = neighbor_hue {
            self.hue += (avg - self.hue) * config.hue_adjustment_factor;
        }
        self.hue += rand_range(rng, -config.hue_random_drift, config.hue_random_drift);
        self.light += rand_range(rng, -config.light_drift, config.light_drift);
        self.hue = wrap_coordinate(self.hue, 360.0);
        self.light = self.light.clamp(config.light_floor, config.light_ceiling);

        self.recover(config);
        let saturation = config.bold_saturation * (self.resource / MAX_RESOURCE);

        if self.splash.is_none() && chance(rng, config.splash_probability) {
            self.splash = Some(Splash {
                hue_offset: rand_range(rng, -config.splash_max_offset, config.splash_max_offset),
                life: 1.0,
            });
        }
        if let Some(splash) = self.splash.as_mut() {
            splash.life -= config.splash_life_decay;
            if splash.life <= 0.0 {
                self.splash = None;
            }
        }

        let hue = self.hue + self.splash.map_or(0.0, |s| s.hue_offset * s.life);
        self.base_color = Hsl::new(hue, saturation, self.light);
    }

    fn evolve_overlay(&mut self, config: &SimConfig) {
        self.light = self.light.clamp(config.light_floor, config.light_ceiling);
        self.recover(config);
        self.overlay = (self.overlay + config.overlay_recovery).clamp(0.0, 1.0);
    }
}

/// Index of the first patch containing `point`.
pub fn patch_index_at(patches: &[Patch], point: Point) -> Option<usize> {
    patches.iter().position(|p| p.contains(point))
}

/// Mean hue of the patches whose centers lie within `threshold` of each
/// patch, read from the current (pre-update) hues.
fn neighbor_hues(patches: &[Patch], threshold: f32) -> Vec<Option<f32>> {
    patches
        .par_iter()
        .enumerate()
        .map(|(i, patch)| {
            let (sum, count) = patches
                .iter()
                .enumerate()
                .filter(|&(j, other)| {
                    j != i && other.center.distance_to(patch.center) < threshold
                })
                .fold((0.0_f32, 0_u32), |(sum, count), (_, other)| {
                    (sum + other.hue, count + 1)
                });
            (count > 0).then(|| sum / count as f32)
        })
        .collect()
}

/// Advance every patch by one tick.
pub fn update_patches<R: Rng + ?Sized>(patches: &mut [Patch], config: &SimConfig, rng: &mut R) {
    match config.patch_color {
        PatchColorPolicy::Diffusion => {
            let averages = neighbor_hues(patches, config.neighbor_threshold);
            for (patch, avg) in patches.iter_mut().zip(averages) {
                if patch.vertices.is_empty() {
                    continue;
                }
                patch.evolve_diffusion(avg, config, rng);
            }
        }
        PatchColorPolicy::FeedOverlay => {
            for patch in patches.iter_mut() {
                patch.evolve_overlay(config);
            }
        }
    }
}
