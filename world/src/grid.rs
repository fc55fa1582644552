//! Dense tile storage and world-space mapping for the arena.

use blast_arena_core::{ArenaView, CellCoord, DangerLevel, Direction, Tile};
use glam::{IVec2, Vec2};

/// Mapping between cell coordinates and world-space points.
///
/// `origin` is the world-grid cell that corresponds to arena cell `(0, 0)`;
/// each cell spans `cell_length` world units along both axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridTransform {
    origin: IVec2,
    cell_length: f32,
}

impl GridTransform {
    /// Creates a transform from an integer origin offset and cell size.
    #[must_use]
    pub const fn new(origin: IVec2, cell_length: f32) -> Self {
        Self {
            origin,
            cell_length,
        }
    }

    /// World-grid cell aligned with arena cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_length(&self) -> f32 {
        self.cell_length
    }
}

impl Default for GridTransform {
    fn default() -> Self {
        Self::new(IVec2::ZERO, 1.0)
    }
}

/// Rectangular arena of classified cells.
///
/// The grid keeps the static layout it was created from so that the mutable
/// overlay (bombs, explosions, bonuses, players, generated walls) can be
/// discarded at the start of every round.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    base: Vec<Tile>,
    tiles: Vec<Tile>,
    transform: GridTransform,
}

impl Grid {
    /// Creates an open grid where every cell is [`Tile::Empty`].
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let count = cell_count(width, height);
        Self::from_tiles(width, height, vec![Tile::Empty; count])
    }

    /// Creates a grid from row-major tiles that also become the static layout.
    ///
    /// Missing trailing cells are filled with permanent walls and surplus
    /// cells are dropped.
    #[must_use]
    pub fn from_tiles(width: u32, height: u32, mut tiles: Vec<Tile>) -> Self {
        tiles.resize(cell_count(width, height), Tile::PermanentWall);
        Self {
            width,
            height,
            base: tiles.clone(),
            tiles,
            transform: GridTransform::default(),
        }
    }

    /// Replaces the world-space transform.
    #[must_use]
    pub fn with_transform(mut self, transform: GridTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Width of the grid in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the grid in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Provides the dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// World-space transform applied by coordinate conversions.
    #[must_use]
    pub const fn transform(&self) -> GridTransform {
        self.transform
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Classification of the cell; out-of-bounds cells are permanent walls.
    #[must_use]
    pub fn classify(&self, cell: CellCoord) -> Tile {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
            .unwrap_or(Tile::PermanentWall)
    }

    /// Classification of the cell `distance` steps away from `cell`.
    ///
    /// Steps that leave the grid on any side classify as permanent walls.
    #[must_use]
    pub fn classify_step(&self, cell: CellCoord, direction: Direction, distance: u32) -> Tile {
        cell.offset(direction, distance)
            .map_or(Tile::PermanentWall, |target| self.classify(target))
    }

    /// Reports whether agents may walk through the cell.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.classify(cell).is_traversable()
    }

    /// Overwrites the classification of an in-bounds cell.
    pub fn set(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    /// Discards the mutable overlay and restores the static layout.
    pub fn reset_overlay(&mut self) {
        self.tiles.clone_from(&self.base);
    }

    /// Row-major classifications.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Counts the cells currently holding the provided classification.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }

    /// Borrows the grid together with a danger layer as a read-only view.
    #[must_use]
    pub fn view<'a>(&'a self, danger: &'a [DangerLevel]) -> ArenaView<'a> {
        ArenaView::new(&self.tiles, danger, self.width, self.height)
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec2 {
        let absolute = self.transform.origin.as_vec2()
            + Vec2::new(cell.column() as f32, cell.row() as f32);
        (absolute + Vec2::splat(0.5)) * self.transform.cell_length
    }

    /// Cell containing the provided world-space point, if it lies in the grid.
    #[must_use]
    pub fn world_to_cell(&self, point: Vec2) -> Option<CellCoord> {
        let length = self.transform.cell_length;
        if !length.is_finite() || length <= 0.0 || !point.is_finite() {
            return None;
        }

        let absolute = (point / length).floor().as_ivec2();
        let local = absolute - self.transform.origin;
        let column = u32::try_from(local.x).ok()?;
        let row = u32::try_from(local.y).ok()?;
        let cell = CellCoord::new(column, row);
        self.contains(cell).then_some(cell)
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}

pub(crate) fn cell_count(width: u32, height: u32) -> usize {
    let count = u64::from(width) * u64::from(height);
    usize::try_from(count).unwrap_or(0)
}
