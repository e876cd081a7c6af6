//! Voronoi-like partition of the world rectangle into polygonal patches.

use rand::Rng;
use tracing::{debug, warn};

use crate::config::SimConfig;
use crate::geometry::{clip_polygon, Point};
use crate::patch::Patch;
use crate::rng::rand_range;

/// Seeds on a near-square grid, each jittered by up to `config.seed_jitter`.
pub fn scatter_seeds<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec<Point> {
    let n = config.num_patches;
    let cols = (n as f32).sqrt().ceil().max(1.0) as usize;
    let rows = n.div_ceil(cols);
    let cell_w = config.world_width / cols as f32;
    let cell_h = config.world_height / rows as f32;
    let jitter = config.seed_jitter;

    let mut seeds = Vec::with_capacity(n);
    'rows: for r in 0..rows {
        for c in 0..cols {
            if seeds.len() >= n {
                break 'rows;
            }
            seeds.push(Point::new(
                (c as f32 + 0.5) * cell_w + rand_range(rng, -jitter, jitter),
                (r as f32 + 0.5) * cell_h + rand_range(rng, -jitter, jitter),
            ));
        }
    }
    seeds
}

/// Cell of `seeds[index]`: the bounds rectangle clipped by the bisector
/// half-plane of every other seed. Empty when clipped away entirely.
pub fn voronoi_cell(index: usize, seeds: &[Point], width: f32, height: f32) -> Vec<Point> {
    let seed = seeds[index];
    let mut cell = vec![
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ];
    for (j, &other) in seeds.iter().enumerate() {
        if j == index {
            continue;
        }
        let mid = Point::new((seed.x + other.x) / 2.0, (seed.y + other.y) / 2.0);
        let normal = Point::new(seed.x - other.x, seed.y - other.y);
        let len = normal.length();
        // Coincident seeds have no bisector.
        if len == 0.0 {
            continue;
        }
        let normal = Point::new(normal.x / len, normal.y / len);
        cell = clip_polygon(&cell, mid, normal);
        if cell.is_empty() {
            break;
        }
    }
    cell
}

/// Build the terrain. Degenerate cells are dropped, so the result may hold
/// fewer than `config.num_patches` patches.
pub fn generate_patches<R: Rng + ?Sized>(config: &SimConfig, rng: &mut R) -> Vec<Patch> {
    let seeds = scatter_seeds(config, rng);
    let mut patches = Vec::with_capacity(seeds.len());

    for index in 0..seeds.len() {
        let mut cell = voronoi_cell(index, &seeds, config.world_width, config.world_height);
        if cell.len() < config.min_patch_sides {
            continue;
        }
        while cell.len() > config.max_patch_sides {
            let victim = rng.gen_range(0..cell.len());
            cell.remove(victim);
        }
        let hue = rand_range(rng, 0.0, 360.0);
        let light = rand_range(rng, config.bold_light_min, config.bold_light_max);
        patches.push(Patch::new(cell, hue, light, config));
    }

    let dropped = seeds.len() - patches.len();
    if dropped > 0 {
        warn!(
            requested = config.num_patches,
            produced = patches.len(),
            dropped,
            "terrain dropped degenerate cells"
        );
    }
    debug!(patches = patches.len(), "terrain generated");
    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use proptest::prelude::*;

    fn config(num_patches: usize, min: usize, max: usize) -> SimConfig {
        SimConfig {
            num_patches,
            min_patch_sides: min,
            max_patch_sides: max,
            world_width: 800.0,
            world_height: 600.0,
            ..SimConfig::default()
        }
    }

    #[test]
    fn seed_count_matches_request() {
        let mut rng = create_rng(Some(1));
        for n in [1, 2, 7, 10, 100] {
            assert_eq!(scatter_seeds(&config(n, 3, 8), &mut rng).len(), n);
        }
    }

    #[test]
    fn single_seed_owns_the_whole_rectangle() {
        let cell = voronoi_cell(0, &[Point::new(10.0, 10.0)], 100.0, 50.0);
        assert_eq!(cell.len(), 4);
    }

    #[test]
    fn duplicate_seeds_are_skipped_not_fatal() {
        let seeds = [Point::new(25.0, 25.0), Point::new(25.0, 25.0), Point::new(75.0, 25.0)];
        let cell = voronoi_cell(0, &seeds, 100.0, 50.0);
        assert_eq!(cell.len(), 4);
        assert!(cell.iter().all(|p| p.x <= 50.0 + 1e-3));
        assert!(cell.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn two_seeds_split_at_bisector() {
        let seeds = [Point::new(25.0, 25.0), Point::new(75.0, 25.0)];
        let left = voronoi_cell(0, &seeds, 100.0, 50.0);
        let right = voronoi_cell(1, &seeds, 100.0, 50.0);
        assert!(left.iter().all(|p| p.x <= 50.0 + 1e-3));
        assert!(right.iter().all(|p| p.x >= 50.0 - 1e-3));
    }

    #[test]
    fn seed_outside_bounds_can_be_clipped_away() {
        let seeds = [Point::new(-500.0, 25.0), Point::new(50.0, 25.0)];
        assert!(voronoi_cell(0, &seeds, 100.0, 50.0).is_empty());
    }

    #[test]
    fn default_terrain_is_mostly_populated() {
        let mut rng = create_rng(Some(11));
        let cfg = SimConfig::default();
        let patches = generate_patches(&cfg, &mut rng);
        assert!(patches.len() > cfg.num_patches / 2);
        assert!(patches.iter().all(|p| p.resource == cfg.patch_resource_initial));
    }

    proptest! {
        #[test]
        fn generated_terrain_is_well_formed(seed in any::<u64>(), n in 1usize..60, max in 3usize..9) {
            let cfg = config(n, 3, max);
            let mut rng = create_rng(Some(seed));
            let patches = generate_patches(&cfg, &mut rng);

            for p in &patches {
                prop_assert!(p.sides() >= cfg.min_patch_sides && p.sides() <= cfg.max_patch_sides);
                for v in p.vertices() {
                    prop_assert!(v.x >= -0.5 && v.x <= cfg.world_width + 0.5);
                    prop_assert!(v.y >= -0.5 && v.y <= cfg.world_height + 0.5);
                }
            }
            for (i, a) in patches.iter().enumerate() {
                for b in &patches[i + 1..] {
                    prop_assert!(a.center().distance_to(b.center()) > 1e-3);
                }
            }
        }
    }
}
