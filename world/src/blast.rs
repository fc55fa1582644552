//! Blast-zone ray casting.

use blast_arena_core::{CellCoord, Direction, Tile};

use crate::grid::Grid;

/// Rays are cast in this order at every distance step.
const BLAST_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// Cells reached by a detonation together with the walls that stopped it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blast {
    cells: Vec<CellCoord>,
    breakable_walls: Vec<CellCoord>,
}

impl Blast {
    /// Cells the blast reaches, origin first.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Breakable walls that absorbed one of the rays.
    #[must_use]
    pub fn breakable_walls(&self) -> &[CellCoord] {
        &self.breakable_walls
    }

    /// Reports whether the blast reaches the provided cell.
    #[must_use]
    pub fn covers(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    /// Consumes the blast, yielding the reached cells.
    #[must_use]
    pub fn into_cells(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Casts the four rays of a detonation at `origin` with the provided power.
///
/// Each ray advances up to `power` cells and stops at the first permanent or
/// breakable wall, which is never part of the blast. Bombs, explosions,
/// bonuses and players let the ray through. Rays are independent, so one
/// side stopping early never shortens another.
#[must_use]
pub fn resolve_blast(grid: &Grid, origin: CellCoord, power: u32) -> Blast {
    let mut blast = Blast {
        cells: vec![origin],
        breakable_walls: Vec::new(),
    };
    let mut stopped = [false; BLAST_DIRECTIONS.len()];

    for distance in 1..=power {
        if stopped.iter().all(|done| *done) {
            break;
        }

        for (direction, done) in BLAST_DIRECTIONS.iter().zip(stopped.iter_mut()) {
            if *done {
                continue;
            }

            let tile = grid.classify_step(origin, *direction, distance);
            if tile.passes_blast() {
                if let Some(cell) = origin.offset(*direction, distance) {
                    blast.cells.push(cell);
                }
                continue;
            }

            *done = true;
            if tile == Tile::BreakableWall {
                if let Some(cell) = origin.offset(*direction, distance) {
                    blast.breakable_walls.push(cell);
                }
            }
        }
    }

    blast
}

/// Cells a detonation at `origin` with the provided power would reach.
#[must_use]
pub fn blast_cells(grid: &Grid, origin: CellCoord, power: u32) -> Vec<CellCoord> {
    resolve_blast(grid, origin, power).into_cells()
}
