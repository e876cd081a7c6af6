//! Per-tick creature rules: movement, metabolism, feeding, steering,
//! reproduction, pairwise collisions and population control.

use rand::Rng;
use tracing::trace;

use crate::config::{Broadphase, CollisionPolicy, SimConfig};
use crate::creature::{Creature, CreatureFactory};
use crate::geometry::{wrap_coordinate, Point};
use crate::patch::{patch_index_at, Patch};
use crate::spatial::build_grid;

/// Integrate position by velocity, wrapping toroidally.
#[inline]
pub fn integrate(creature: &mut Creature, width: f32, height: f32) {
    creature.position.x = wrap_coordinate(creature.position.x + creature.velocity.x, width);
    creature.position.y = wrap_coordinate(creature.position.y + creature.velocity.y, height);
}

/// Highest energy a creature may hold. Never below its reproduction
/// threshold, so reproduction stays reachable at low birth rates.
#[inline]
pub fn energy_cap(creature: &Creature, config: &SimConfig) -> f32 {
    let threshold = config.birth_threshold(creature.is_herbivore(), creature.max_energy);
    if threshold.is_finite() {
        creature.max_energy.max(threshold)
    } else {
        creature.max_energy
    }
}

/// Passive decay plus the lightness boost of the patch underfoot.
pub fn apply_metabolism(creature: &mut Creature, patches: &[Patch], config: &SimConfig) {
    creature.energy -= config.energy_decay_rate;
    if let Some(index) = patch_index_at(patches, creature.position) {
        creature.energy += patches[index].energy_boost(config);
    }
}

/// Graze the patch underfoot if its side count is a multiple of the
/// creature's vertex count and it still holds resource.
pub fn try_feed(creature: &mut Creature, patches: &mut [Patch], config: &SimConfig) -> bool {
    let Some(index) = patch_index_at(patches, creature.position) else {
        return false;
    };
    let patch = &mut patches[index];
    if !patch.accepts(creature.num_vertices()) || !patch.feed(creature.color, config) {
        return false;
    }
    creature.energy += config.herbivore_energy_gain;
    true
}

/// Center of the best grazing patch in range other than the one underfoot,
/// scored by resource minus a distance penalty.
pub fn best_patch_target(creature: &Creature, patches: &[Patch], config: &SimConfig) -> Option<Point> {
    let current = patch_index_at(patches, creature.position);
    patches
        .iter()
        .enumerate()
        .filter(|&(j, p)| {
            Some(j) != current && p.resource > 0.0 && p.accepts(creature.num_vertices())
        })
        .filter_map(|(_, p)| {
            let distance = creature.position.distance_to(p.center());
            (distance <= config.patch_seek_radius)
                .then(|| (p.center(), p.resource - distance * config.patch_seek_distance_penalty))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(center, _)| center)
}

/// Position of the closest herbivore other than `creatures[index]`.
pub fn nearest_herbivore(creatures: &[Creature], index: usize) -> Option<Point> {
    let hunter = &creatures[index];
    creatures
        .iter()
        .enumerate()
        .filter(|&(j, c)| j != index && c.is_herbivore())
        .map(|(_, c)| (c.position, hunter.distance_to(c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(position, _)| position)
}

/// Nudge velocity toward `target` by a constant acceleration.
#[inline]
pub fn steer_toward(creature: &mut Creature, target: Point, acceleration: f32) {
    let angle = creature.position.angle_to(target);
    creature.velocity.x += acceleration * angle.cos();
    creature.velocity.y += acceleration * angle.sin();
}

#[inline]
pub fn limit_speed(creature: &mut Creature, config: &SimConfig) {
    let limit = config.speed_limit_factor * config.movement_speed;
    let speed = creature.velocity.length();
    if limit > 0.0 && speed > limit {
        let scale = limit / speed;
        creature.velocity.x *= scale;
        creature.velocity.y *= scale;
    }
}

/// Run the per-creature pass over the current population. Offspring are
/// appended afterwards and first act next tick. Returns the birth count.
pub fn advance_creatures<R: Rng + ?Sized>(
    creatures: &mut Vec<Creature>,
    patches: &mut [Patch],
    factory: &CreatureFactory,
    config: &SimConfig,
    rng: &mut R,
) -> usize {
    let mut newborns = Vec::new();

    for i in 0..creatures.len() {
        {
            let creature = &mut creatures[i];
            integrate(creature, config.world_width, config.world_height);
            apply_metabolism(creature, patches, config);
        }

        if creatures[i].is_herbivore() {
            let creature = &mut creatures[i];
            try_feed(creature, patches, config);
            if let Some(target) = best_patch_target(creature, patches, config) {
                steer_toward(creature, target, config.pursuit_acceleration);
            }
        } else if let Some(target) = nearest_herbivore(creatures, i) {
            steer_toward(&mut creatures[i], target, config.pursuit_acceleration);
        }

        let creature = &mut creatures[i];
        limit_speed(creature, config);

        // Reproduce from the unclamped energy; the cap applies afterwards.
        let threshold = config.birth_threshold(creature.is_herbivore(), creature.max_energy);
        if creature.energy >= threshold {
            creature.energy /= 2.0;
            creature.clone_timer = config.clone_timer_ticks;
            let mut child = factory.offspring(creature, config, rng);
            child.position.x = wrap_coordinate(child.position.x, config.world_width);
            child.position.y = wrap_coordinate(child.position.y, config.world_height);
            child.energy = child.energy.min(energy_cap(&child, config));
            trace!(parent = i, energy = creature.energy, "creature reproduced");
            newborns.push(child);
        }
        creature.energy = creature.energy.min(energy_cap(creature, config));

        if creature.clone_timer > 0 {
            creature.clone_timer -= 1;
        }
    }

    let births = newborns.len();
    creatures.extend(newborns);
    births
}

/// Centers closer than the sum of radii. Symmetric in its arguments.
#[inline]
pub fn creatures_collide(a: &Creature, b: &Creature) -> bool {
    a.distance_to(b) < a.radius + b.radius
}

/// Push the pair apart along the line joining their centers.
pub fn bounce(a: &mut Creature, b: &mut Creature, magnitude: f32) {
    let angle = a.position.angle_to(b.position);
    let (sin, cos) = angle.sin_cos();
    a.velocity = Point::new(-cos * magnitude, -sin * magnitude);
    b.velocity = Point::new(cos * magnitude, sin * magnitude);
}

fn transfer(winner: &mut Creature, loser: &mut Creature, config: &SimConfig) {
    winner.energy = (winner.energy + config.predator_energy_gain).min(energy_cap(winner, config));
    loser.energy -= config.predator_energy_loss;
}

/// Resolve one colliding pair under the configured policy.
pub fn resolve_pair(a: &mut Creature, b: &mut Creature, config: &SimConfig) {
    a.colliding = true;
    b.colliding = true;

    if a.is_herbivore() == b.is_herbivore() {
        bounce(a, b, config.bounce_factor);
        return;
    }

    match config.collision {
        CollisionPolicy::EnergyThreshold => {
            let ratio = config.dominance_ratio;
            if a.energy > b.energy * ratio {
                transfer(a, b, config);
            } else if b.energy > a.energy * ratio {
                transfer(b, a, config);
            } else {
                bounce(a, b, config.bounce_factor);
            }
        }
        CollisionPolicy::PredatorWins => {
            if a.is_herbivore() {
                transfer(b, a, config);
            } else {
                transfer(a, b, config);
            }
        }
    }
}

fn pair_mut(creatures: &mut [Creature], i: usize, j: usize) -> (&mut Creature, &mut Creature) {
    debug_assert!(i < j);
    let (left, right) = creatures.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

fn resolve_candidate(creatures: &mut [Creature], i: usize, j: usize, config: &SimConfig) -> bool {
    let (a, b) = pair_mut(creatures, i, j);
    if !creatures_collide(a, b) {
        return false;
    }
    resolve_pair(a, b, config);
    true
}

/// Clear collision flags, then resolve every colliding pair in array order.
/// Returns the number of colliding pairs.
pub fn resolve_collisions(creatures: &mut [Creature], config: &SimConfig) -> usize {
    for creature in creatures.iter_mut() {
        creature.colliding = false;
    }

    let mut hits = 0;
    match config.broadphase {
        Broadphase::Naive => {
            for i in 0..creatures.len() {
                for j in i + 1..creatures.len() {
                    if resolve_candidate(creatures, i, j, config) {
                        hits += 1;
                    }
                }
            }
        }
        Broadphase::Grid => {
            let grid = build_grid(creatures, config.world_width, config.world_height);
            for (i, j) in grid.candidate_pairs() {
                if resolve_candidate(creatures, i, j, config) {
                    hits += 1;
                }
            }
        }
    }
    hits
}

/// Drop the lowest-energy excess above `max_population`. Returns how many
/// were culled.
pub fn enforce_population_cap(creatures: &mut Vec<Creature>, max_population: usize) -> usize {
    if creatures.len() <= max_population {
        return 0;
    }
    creatures.sort_by(|a, b| a.energy.total_cmp(&b.energy));
    let excess = creatures.len() - max_population;
    creatures.drain(..excess);
    trace!(culled = excess, max_population, "population cap enforced");
    excess
}

/// Remove creatures whose energy has run out. Returns how many died.
pub fn remove_dead(creatures: &mut Vec<Creature>) -> usize {
    let before = creatures.len();
    creatures.retain(Creature::is_alive);
    before - creatures.len()
}
