//! Uniform grid bucketing for collision candidate pairs.

use crate::creature::Creature;

#[derive(Clone, Debug, Default)]
struct SpatialCell {
    creatures: Vec<usize>,
}

impl SpatialCell {
    fn new() -> Self {
        SpatialCell {
            creatures: Vec::with_capacity(8),
        }
    }
}

pub struct Grid {
    cells: Vec<SpatialCell>,
    width: usize,
    height: usize,
    inv_cell_size: f32,
}

impl Grid {
    pub fn new(world_width: f32, world_height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let width = ((world_width / cell_size).ceil() as usize).max(1);
        let height = ((world_height / cell_size).ceil() as usize).max(1);
        let cells = (0..width * height).map(|_| SpatialCell::new()).collect();

        Grid {
            cells,
            width,
            height,
            inv_cell_size: 1.0 / cell_size,
        }
    }

    #[inline]
    fn cell_coords(&self, x: f32, y: f32) -> (usize, usize) {
        // Negative coordinates saturate to 0 on the cast.
        let cell_x = (x * self.inv_cell_size) as usize;
        let cell_y = (y * self.inv_cell_size) as usize;
        (cell_x.min(self.width - 1), cell_y.min(self.height - 1))
    }

    pub fn insert(&mut self, creature: &Creature, index: usize) {
        let (cell_x, cell_y) = self.cell_coords(creature.position.x, creature.position.y);
        let cell_index = cell_y * self.width + cell_x;
        if let Some(cell) = self.cells.get_mut(cell_index) {
            cell.creatures.push(index);
        }
    }

    /// Every `(i, j)` with `i < j` whose cells lie within one ring of each
    /// other, sorted in array order. With cell size at least the largest
    /// collision distance this is a superset of the colliding pairs.
    pub fn candidate_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for cy in 0..self.height {
            for cx in 0..self.width {
                let here = &self.cells[cy * self.width + cx].creatures;
                if here.is_empty() {
                    continue;
                }
                let y_end = (cy + 2).min(self.height);
                let x_end = (cx + 2).min(self.width);
                for ny in cy.saturating_sub(1)..y_end {
                    for nx in cx.saturating_sub(1)..x_end {
                        let there = &self.cells[ny * self.width + nx].creatures;
                        for &i in here {
                            pairs.extend(there.iter().filter(|&&j| i < j).map(|&j| (i, j)));
                        }
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

/// Rebuild a grid over `creatures` sized for their largest collision distance.
pub fn build_grid(creatures: &[Creature], world_width: f32, world_height: f32) -> Grid {
    let max_radius = creatures.iter().map(|c| c.radius).fold(0.0_f32, f32::max);
    // Padded so float rounding at cell borders cannot split a colliding pair.
    let mut grid = Grid::new(world_width, world_height, max_radius * 2.0 + 1.0);
    for (i, creature) in creatures.iter().enumerate() {
        grid.insert(creature, i);
    }
    grid
}
