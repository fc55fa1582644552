//! Per-cell hazard levels derived from a registry of bombs and explosions.
//!
//! Every active hazard is a record keyed by its identifier. Cells never point
//! back at hazards; the registry is queried by position instead, which keeps
//! chained bombs free of reference cycles.

use blast_arena_core::{BombId, CellCoord, DangerLevel, ExplosionId};

use crate::{
    blast::blast_cells,
    grid::{cell_count, Grid},
};

/// Lifecycle stage of a registered bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BombState {
    /// The fuse is burning.
    Armed,
    /// The fuse is about to run out.
    Imminent,
}

impl BombState {
    /// Danger level the bomb projects onto its own blast.
    #[must_use]
    pub const fn level(self) -> DangerLevel {
        match self {
            Self::Armed => DangerLevel::Armed,
            Self::Imminent => DangerLevel::Imminent,
        }
    }
}

#[derive(Clone, Debug)]
struct BombRecord {
    id: BombId,
    cell: CellCoord,
    power: u32,
    state: BombState,
    /// Own level raised by any hazard whose marked cells include this bomb.
    level: DangerLevel,
    blast: Vec<CellCoord>,
}

#[derive(Clone, Debug)]
struct ExplosionRecord {
    id: ExplosionId,
    cells: Vec<CellCoord>,
}

/// Hazard registry plus the dense danger layer it produces.
///
/// Invariant: every cell holds the maximum level of all hazards covering it,
/// where a bomb standing inside another hazard's cells projects that
/// hazard's level onto its own blast as well.
#[derive(Clone, Debug, Default)]
pub struct DangerField {
    width: u32,
    height: u32,
    levels: Vec<DangerLevel>,
    bombs: Vec<BombRecord>,
    explosions: Vec<ExplosionRecord>,
}

impl DangerField {
    /// Creates a hazard-free field with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            levels: vec![DangerLevel::Safe; cell_count(width, height)],
            bombs: Vec::new(),
            explosions: Vec::new(),
        }
    }

    /// Drops every hazard and resizes the field.
    pub fn reset(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Danger level of the cell; out-of-bounds cells report no danger.
    #[must_use]
    pub fn level(&self, cell: CellCoord) -> DangerLevel {
        self.index(cell)
            .and_then(|index| self.levels.get(index).copied())
            .unwrap_or_default()
    }

    /// Reports whether no hazard covers the cell.
    #[must_use]
    pub fn is_safe(&self, cell: CellCoord) -> bool {
        self.level(cell).is_safe()
    }

    /// Row-major danger levels.
    #[must_use]
    pub fn levels(&self) -> &[DangerLevel] {
        &self.levels
    }

    /// Number of registered bombs.
    #[must_use]
    pub fn bomb_count(&self) -> usize {
        self.bombs.len()
    }

    /// Number of registered explosions.
    #[must_use]
    pub fn explosion_count(&self) -> usize {
        self.explosions.len()
    }

    /// Lifecycle stage of a registered bomb.
    #[must_use]
    pub fn bomb_state(&self, bomb: BombId) -> Option<BombState> {
        self.bomb(bomb).map(|record| record.state)
    }

    /// Level a bomb currently projects, including chained hazards.
    #[must_use]
    pub fn bomb_level(&self, bomb: BombId) -> Option<DangerLevel> {
        self.bomb(bomb).map(|record| record.level)
    }

    /// Blast cells currently attributed to a registered bomb.
    #[must_use]
    pub fn bomb_blast(&self, bomb: BombId) -> Option<&[CellCoord]> {
        self.bomb(bomb).map(|record| record.blast.as_slice())
    }

    /// Bomb registered on the provided cell, if any.
    #[must_use]
    pub fn bomb_at(&self, cell: CellCoord) -> Option<BombId> {
        self.bombs
            .iter()
            .find(|record| record.cell == cell)
            .map(|record| record.id)
    }

    /// Cells covered by a registered explosion.
    #[must_use]
    pub fn explosion_cells(&self, explosion: ExplosionId) -> Option<&[CellCoord]> {
        self.explosions
            .iter()
            .find(|record| record.id == explosion)
            .map(|record| record.cells.as_slice())
    }

    /// Reports whether any registered explosion covers the cell.
    #[must_use]
    pub fn is_exploding(&self, cell: CellCoord) -> bool {
        self.explosions
            .iter()
            .any(|record| record.cells.contains(&cell))
    }

    /// Registers a freshly armed bomb and marks its blast.
    pub fn on_bomb_armed(&mut self, grid: &Grid, bomb: BombId, cell: CellCoord, power: u32) {
        self.ensure_dimensions(grid);
        self.bombs.retain(|record| record.id != bomb);

        let blast = blast_cells(grid, cell, power);
        // A bomb armed inside an existing hazard inherits its level.
        let inherited = self.level(cell).max(DangerLevel::Armed);
        self.bombs.push(BombRecord {
            id: bomb,
            cell,
            power,
            state: BombState::Armed,
            level: inherited,
            blast: blast.clone(),
        });
        self.bombs.sort_by_key(|record| record.id);

        tracing::debug!(bomb = bomb.get(), ?cell, power, "bomb armed");
        self.mark(&blast, inherited);
    }

    /// Raises a bomb to the imminent stage and marks its blast.
    ///
    /// Returns `false` when the bomb is not registered.
    pub fn on_bomb_imminent(&mut self, grid: &Grid, bomb: BombId) -> bool {
        let Some(record) = self.bombs.iter_mut().find(|record| record.id == bomb) else {
            return false;
        };

        record.state = BombState::Imminent;
        record.blast = blast_cells(grid, record.cell, record.power);
        record.level = record.level.max(DangerLevel::Imminent);
        let blast = record.blast.clone();
        let level = record.level;

        tracing::debug!(bomb = bomb.get(), "bomb imminent");
        self.mark(&blast, level);
        true
    }

    /// Hands a detonated bomb over to a new explosion hazard.
    ///
    /// The explosion covers the bomb's blast as resolved against the current
    /// grid. Returns the explosion cells, or `None` for unknown bombs.
    pub fn on_bomb_exploded(
        &mut self,
        grid: &Grid,
        bomb: BombId,
        explosion: ExplosionId,
    ) -> Option<Vec<CellCoord>> {
        let position = self.bombs.iter().position(|record| record.id == bomb)?;
        let record = self.bombs.remove(position);
        let cells = blast_cells(grid, record.cell, record.power);

        self.explosions.retain(|existing| existing.id != explosion);
        self.explosions.push(ExplosionRecord {
            id: explosion,
            cells: cells.clone(),
        });
        self.explosions.sort_by_key(|existing| existing.id);

        tracing::debug!(
            bomb = bomb.get(),
            explosion = explosion.get(),
            cells = cells.len(),
            "bomb exploded"
        );
        self.mark(&cells, DangerLevel::Exploding);
        Some(cells)
    }

    /// Removes a finished explosion and recomputes the field from the
    /// remaining hazards.
    ///
    /// Returns the cells the explosion covered, or `None` when unknown.
    pub fn on_explosion_finished(
        &mut self,
        grid: &Grid,
        explosion: ExplosionId,
    ) -> Option<Vec<CellCoord>> {
        let position = self
            .explosions
            .iter()
            .position(|record| record.id == explosion)?;
        let record = self.explosions.remove(position);

        tracing::debug!(explosion = explosion.get(), "explosion finished");
        self.rebuild(grid);
        Some(record.cells)
    }

    /// Re-resolves every bomb blast against the grid and recomputes all
    /// levels from the registry.
    pub fn rebuild(&mut self, grid: &Grid) {
        self.ensure_dimensions(grid);
        self.levels.fill(DangerLevel::Safe);

        for record in &mut self.bombs {
            record.blast = blast_cells(grid, record.cell, record.power);
            record.level = record.state.level();
        }

        let explosions: Vec<Vec<CellCoord>> = self
            .explosions
            .iter()
            .map(|record| record.cells.clone())
            .collect();
        for cells in explosions {
            self.mark(&cells, DangerLevel::Exploding);
        }

        let bombs: Vec<(Vec<CellCoord>, DangerLevel)> = self
            .bombs
            .iter()
            .map(|record| (record.blast.clone(), record.level))
            .collect();
        for (blast, level) in bombs {
            self.mark(&blast, level);
        }
    }

    /// Copy of the field with an additional armed bomb at `cell`.
    ///
    /// The provisional bomb takes the next free identifier. The receiver is
    /// left untouched.
    #[must_use]
    pub fn simulate_bomb(&self, grid: &Grid, cell: CellCoord, power: u32) -> DangerField {
        let mut simulated = self.clone();
        let next = self
            .bombs
            .iter()
            .map(|record| record.id.get())
            .max()
            .map_or(0, |highest| highest.saturating_add(1));
        simulated.on_bomb_armed(grid, BombId::new(next), cell, power);
        simulated
    }

    /// Raises the provided cells to at least `level` and chains the level
    /// into every bomb standing on one of them.
    ///
    /// A bomb already at or above `level` is skipped, which bounds the work
    /// on cyclic overlaps.
    fn mark(&mut self, cells: &[CellCoord], level: DangerLevel) {
        let mut pending = vec![cells.to_vec()];

        while let Some(batch) = pending.pop() {
            for cell in &batch {
                self.raise(*cell, level);
            }

            for record in &mut self.bombs {
                if record.level >= level || !batch.contains(&record.cell) {
                    continue;
                }

                tracing::trace!(bomb = record.id.get(), ?level, "danger chained");
                record.level = level;
                pending.push(record.blast.clone());
            }
        }
    }

    fn raise(&mut self, cell: CellCoord, level: DangerLevel) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.levels.get_mut(index) {
                *slot = (*slot).max(level);
            }
        }
    }

    fn bomb(&self, bomb: BombId) -> Option<&BombRecord> {
        self.bombs.iter().find(|record| record.id == bomb)
    }

    fn ensure_dimensions(&mut self, grid: &Grid) {
        let (width, height) = grid.dimensions();
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.levels = vec![DangerLevel::Safe; cell_count(width, height)];
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + column)
    }
}
