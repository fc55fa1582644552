//! Breadth-first distance fields over the arena.

use std::collections::VecDeque;

use blast_arena_core::{ArenaView, CellCoord, HazardTolerance};

/// Dense hop-count grid seeded from a single source cell.
///
/// The field mirrors the arena dimensions and stores the breadth-first search
/// results that drive path planning. Unreachable cells hold the sentinel
/// returned by [`DistanceField::infinity`], which equals the number of cells,
/// so callers can distinguish blocked tiles from reachable ones.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistanceField {
    width: u32,
    height: u32,
    source: Option<CellCoord>,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Rebuilds the distances using a breadth-first search from `source`.
    ///
    /// The source always receives distance zero, even when `is_blocked`
    /// rejects it. Neighbours are expanded up, right, down, left.
    pub fn rebuild_with<F>(&mut self, width: u32, height: u32, source: CellCoord, mut is_blocked: F)
    where
        F: FnMut(CellCoord) -> bool,
    {
        let width_usize = usize::try_from(width).unwrap_or(0);
        let height_usize = usize::try_from(height).unwrap_or(0);
        let cell_count = width_usize.checked_mul(height_usize).unwrap_or(0);

        self.width = width;
        self.height = height;
        self.source = None;

        if cell_count == 0 {
            self.distances.clear();
            return;
        }

        let infinity = u32::try_from(cell_count).unwrap_or(u32::MAX);
        if self.distances.len() != cell_count {
            self.distances = vec![infinity; cell_count];
        } else {
            self.distances.fill(infinity);
        }

        if source.column() >= width || source.row() >= height {
            return;
        }
        let Some(source_index) = index(width_usize, source) else {
            return;
        };

        self.source = Some(source);
        self.distances[source_index] = 0;

        let mut queue = VecDeque::new();
        queue.push_back(source);
        let mut visited = 1_usize;

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = index(width_usize, cell) else {
                continue;
            };
            let next_distance = self.distances[current_index].saturating_add(1);

            for neighbor in neighbors(cell, width, height) {
                let Some(neighbor_index) = index(width_usize, neighbor) else {
                    continue;
                };

                if self.distances[neighbor_index] != infinity || is_blocked(neighbor) {
                    continue;
                }

                self.distances[neighbor_index] = next_distance;
                visited += 1;
                queue.push_back(neighbor);
            }
        }

        tracing::trace!(?source, visited, cells = cell_count, "distance field rebuilt");
    }

    /// Sentinel stored for unreachable cells.
    #[must_use]
    pub fn infinity(&self) -> u32 {
        u32::try_from(self.distances.len()).unwrap_or(u32::MAX)
    }

    /// Width of the field in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell the field was seeded from, if it lay inside the arena.
    #[must_use]
    pub const fn source(&self) -> Option<CellCoord> {
        self.source
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.distances
    }

    /// Distance captured for the provided cell, if it lies within the field.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        index(width, cell).and_then(|offset| self.distances.get(offset).copied())
    }

    /// Reports whether the search reached the provided cell.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell)
            .is_some_and(|distance| distance < self.infinity())
    }
}

/// Builds a distance field from `source` over traversable cells.
///
/// Cells whose danger exceeds the tolerance are treated like walls.
#[must_use]
pub fn build_distance_field(
    view: ArenaView<'_>,
    source: CellCoord,
    tolerance: HazardTolerance,
) -> DistanceField {
    let mut field = DistanceField::default();
    field.rebuild_with(view.width(), view.height(), source, |cell| {
        !view.is_traversable(cell) || !tolerance.admits(view.danger_level(cell))
    });
    field
}

/// In-bounds neighbours of `cell` in the order up, right, down, left.
fn neighbors(cell: CellCoord, width: u32, height: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_add(1) {
        if row < height {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < width {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(width: usize, cell: CellCoord) -> Option<usize> {
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
