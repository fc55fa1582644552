//! Per-round breakable wall generation.

use blast_arena_core::{CellCoord, Tile};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::grid::Grid;

/// Scatters breakable walls over empty floor, keeping spawn areas clear.
///
/// Every empty cell outside the 3×3 neighbourhood of a spawn point receives a
/// wall with probability `density`. Returns the number of walls placed.
pub(crate) fn generate_breakable_walls(
    grid: &mut Grid,
    spawns: &[CellCoord],
    density: f32,
    seed: u64,
) -> u32 {
    let probability = if density.is_finite() {
        f64::from(density.clamp(0.0, 1.0))
    } else {
        0.0
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut placed = 0;
    let (width, height) = grid.dimensions();

    for row in 0..height {
        for column in 0..width {
            let cell = CellCoord::new(column, row);
            if grid.classify(cell) != Tile::Empty || overlaps_spawn(cell, spawns) {
                continue;
            }

            if rng.gen_bool(probability) {
                grid.set(cell, Tile::BreakableWall);
                placed += 1;
            }
        }
    }

    placed
}

fn overlaps_spawn(cell: CellCoord, spawns: &[CellCoord]) -> bool {
    spawns.iter().any(|spawn| {
        spawn.column().abs_diff(cell.column()) <= 1 && spawn.row().abs_diff(cell.row()) <= 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_density_fills_every_cell_outside_spawn_areas() {
        let mut grid = Grid::new(6, 6);
        let spawns = [CellCoord::new(0, 0)];

        let placed = generate_breakable_walls(&mut grid, &spawns, 1.0, 7);

        assert_eq!(placed, 36 - 4);
        assert_eq!(grid.classify(CellCoord::new(1, 1)), Tile::Empty);
        assert_eq!(grid.classify(CellCoord::new(2, 0)), Tile::BreakableWall);
    }

    #[test]
    fn zero_density_places_nothing() {
        let mut grid = Grid::new(4, 4);
        assert_eq!(generate_breakable_walls(&mut grid, &[], 0.0, 1), 0);
        assert_eq!(generate_breakable_walls(&mut grid, &[], f32::NAN, 1), 0);
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let mut first = Grid::new(9, 9);
        let mut second = Grid::new(9, 9);

        let _ = generate_breakable_walls(&mut first, &[], 0.5, 0xdead_beef);
        let _ = generate_breakable_walls(&mut second, &[], 0.5, 0xdead_beef);

        assert_eq!(first, second);
    }
}
