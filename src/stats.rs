use std::collections::BTreeSet;

use serde::Serialize;

use crate::creature::Creature;
use crate::patch::{Patch, MAX_RESOURCE};

/// Population summary for stats panels.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PopulationStats {
    pub total: usize,
    pub predators: usize,
    pub herbivores: usize,
    /// Mean creature energy over `max_energy_threshold`.
    pub mean_energy_fraction: f32,
    /// Mean patch resource over the resource ceiling.
    pub mean_resource_fraction: f32,
    /// Population standard deviation of vertex counts.
    pub vertex_std_dev: f32,
    /// Number of distinct vertex counts alive.
    pub distinct_vertex_counts: usize,
}

impl PopulationStats {
    pub fn compute(creatures: &[Creature], patches: &[Patch], max_energy_threshold: f32) -> Self {
        let total = creatures.len();
        let herbivores = creatures.iter().filter(|c| c.is_herbivore()).count();

        let mut stats = PopulationStats {
            total,
            predators: total - herbivores,
            herbivores,
            ..PopulationStats::default()
        };

        if total > 0 {
            let n = total as f32;
            let energy: f32 = creatures.iter().map(|c| c.energy).sum();
            if max_energy_threshold > 0.0 {
                stats.mean_energy_fraction = energy / n / max_energy_threshold;
            }
            let mean_vertices = creatures.iter().map(|c| c.num_vertices() as f32).sum::<f32>() / n;
            let variance = creatures
                .iter()
                .map(|c| (c.num_vertices() as f32 - mean_vertices).powi(2))
                .sum::<f32>()
                / n;
            stats.vertex_std_dev = variance.sqrt();
            stats.distinct_vertex_counts = creatures
                .iter()
                .map(Creature::num_vertices)
                .collect::<BTreeSet<_>>()
                .len();
        }

        if !patches.is_empty() {
            let resource: f32 = patches.iter().map(|p| p.resource).sum();
            stats.mean_resource_fraction = resource / patches.len() as f32 / MAX_RESOURCE;
        }

        stats
    }
}
