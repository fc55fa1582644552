#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blast Arena engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing hazard lifecycle transitions and overlay mutations, the world
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values that collaborators (agents, audio, debug overlays) react
//! to. Systems never mutate the world: they read [`ArenaView`] snapshots and
//! return plans.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cardinal directions on the arena grid.
///
/// Rows grow upwards, so [`Direction::Up`] increments the row index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing row indices.
    Up,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Column and row delta applied by a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell, growing upwards.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Neighbouring cell one step away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        self.offset(direction, 1)
    }

    /// Cell located `distance` steps away in the provided direction.
    #[must_use]
    pub fn offset(self, direction: Direction, distance: u32) -> Option<CellCoord> {
        let (dx, dy) = direction.delta();
        let distance = i64::from(distance);
        let column = i64::from(self.column) + dx * distance;
        let row = i64::from(self.row) + dy * distance;
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Direction of a single orthogonal step from `self` to `other`.
    #[must_use]
    pub fn direction_to(self, other: CellCoord) -> Option<Direction> {
        if self.manhattan_distance(other) != 1 {
            return None;
        }

        if other.column > self.column {
            Some(Direction::Right)
        } else if other.column < self.column {
            Some(Direction::Left)
        } else if other.row > self.row {
            Some(Direction::Up)
        } else {
            Some(Direction::Down)
        }
    }
}

/// Exclusive classification of a single arena cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Open floor.
    #[default]
    Empty,
    /// Indestructible wall; also reported for every out-of-bounds query.
    PermanentWall,
    /// Wall that a blast destroys.
    BreakableWall,
    /// Cell holding an armed bomb.
    Bomb,
    /// Cell covered by an active explosion.
    Explosion,
    /// Collectable power-up.
    Bonus,
    /// Cell occupied by a player.
    Player,
}

impl Tile {
    /// Reports whether agents may walk through the tile.
    ///
    /// Players do not block traversal because they move.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        !matches!(
            self,
            Self::PermanentWall | Self::BreakableWall | Self::Explosion | Self::Bomb
        )
    }

    /// Reports whether a blast continues through the tile.
    #[must_use]
    pub const fn passes_blast(self) -> bool {
        !matches!(self, Self::PermanentWall | Self::BreakableWall)
    }
}

/// Hazard intensity recorded for a cell.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum DangerLevel {
    /// No hazard covers the cell.
    #[default]
    Safe = 0,
    /// An armed bomb's blast line covers the cell.
    Armed = 1,
    /// A bomb covering the cell is about to explode.
    Imminent = 2,
    /// An explosion currently occupies the cell.
    Exploding = 3,
}

impl DangerLevel {
    /// Numeric representation of the level.
    #[must_use]
    pub const fn get(self) -> u8 {
        self as u8
    }

    /// Reports whether the level denotes a hazard-free cell.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// Policy that decides which danger levels a traversal may cross.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardTolerance {
    /// Danger is not considered at all.
    #[default]
    Ignore,
    /// Cells above the provided level are treated as blocked.
    AtMost(DangerLevel),
}

impl HazardTolerance {
    /// Only hazard-free cells may be crossed.
    pub const STRICT: Self = Self::AtMost(DangerLevel::Safe);
    /// Cells in the blast line of a freshly armed bomb may be crossed.
    pub const PERMISSIVE: Self = Self::AtMost(DangerLevel::Armed);

    /// Reports whether a cell at the provided level may be crossed.
    #[must_use]
    pub fn admits(self, level: DangerLevel) -> bool {
        match self {
            Self::Ignore => true,
            Self::AtMost(max) => level <= max,
        }
    }
}

/// Unique identifier assigned to a bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BombId(u32);

impl BombId {
    /// Creates a new bomb identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an explosion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExplosionId(u32);

impl ExplosionId {
    /// Creates a new explosion identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u32);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a bomb placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BombPlacementError {
    /// The requested cell lies outside the arena.
    OutOfBounds,
    /// The requested cell holds something other than floor or a player.
    Occupied,
    /// Bombs need a blast radius of at least one cell.
    ZeroPower,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Restores the static layout and generates a fresh set of breakable walls.
    StartRound {
        /// Probability that an eligible empty cell receives a breakable wall.
        wall_density: f32,
        /// Seed driving the wall generator.
        seed: u64,
    },
    /// Overwrites the classification of a single cell.
    ///
    /// Bomb and explosion tiles are refused, as are cells that hold a live
    /// bomb or explosion.
    SetTile {
        /// Cell to overwrite.
        cell: CellCoord,
        /// Classification to store.
        tile: Tile,
    },
    /// Moves a player onto the provided cell, spawning it if unknown.
    MovePlayer {
        /// Player being moved.
        player: PlayerId,
        /// Destination cell.
        to: CellCoord,
    },
    /// Removes a player from the arena.
    RemovePlayer {
        /// Player being removed.
        player: PlayerId,
    },
    /// Arms a bomb on the provided cell.
    PlaceBomb {
        /// Cell receiving the bomb.
        cell: CellCoord,
        /// Blast radius in cells.
        power: u32,
        /// Fuse length; the world default applies when absent.
        fuse: Option<Duration>,
        /// Player credited with the bomb, if any.
        owner: Option<PlayerId>,
    },
    /// Advances bomb fuses and explosion lifetimes by the provided delta.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Detonates a bomb immediately regardless of its fuse.
    DetonateBomb {
        /// Bomb to detonate.
        bomb: BombId,
    },
    /// Ends an explosion immediately regardless of its lifetime.
    FinishExplosion {
        /// Explosion to end.
        explosion: ExplosionId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a round started from the static layout.
    RoundStarted {
        /// Number of breakable walls generated for the round.
        breakable_walls: u32,
    },
    /// Confirms that a cell classification was overwritten.
    TileChanged {
        /// Cell that changed.
        cell: CellCoord,
        /// Classification now stored for the cell.
        tile: Tile,
    },
    /// Confirms that a player moved.
    PlayerMoved {
        /// Player that moved.
        player: PlayerId,
        /// Cell previously occupied, absent for a freshly spawned player.
        from: Option<CellCoord>,
        /// Cell now occupied.
        to: CellCoord,
    },
    /// Confirms that a player left the arena.
    PlayerRemoved {
        /// Player that was removed.
        player: PlayerId,
        /// Cell the player occupied.
        cell: CellCoord,
    },
    /// Reports that an explosion reached a player.
    PlayerCaught {
        /// Player standing in the blast.
        player: PlayerId,
        /// Cell where the player was caught.
        cell: CellCoord,
    },
    /// Confirms that a bomb was armed.
    BombArmed {
        /// Identifier assigned to the bomb.
        bomb: BombId,
        /// Cell holding the bomb.
        cell: CellCoord,
        /// Blast radius in cells.
        power: u32,
        /// Player credited with the bomb, if any.
        owner: Option<PlayerId>,
    },
    /// Reports that a bomb placement request was rejected.
    BombRejected {
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: BombPlacementError,
    },
    /// Announces that a bomb's fuse dropped below the imminent threshold.
    BombImminent {
        /// Bomb about to explode.
        bomb: BombId,
        /// Cell holding the bomb.
        cell: CellCoord,
    },
    /// Announces that a bomb detonated.
    BombDetonated {
        /// Bomb that detonated.
        bomb: BombId,
        /// Cell that held the bomb.
        cell: CellCoord,
        /// Player credited with the bomb, if any.
        owner: Option<PlayerId>,
    },
    /// Announces that an explosion now covers the listed cells.
    ExplosionStarted {
        /// Identifier assigned to the explosion.
        explosion: ExplosionId,
        /// Cells covered by the explosion.
        cells: Vec<CellCoord>,
    },
    /// Announces that a breakable wall was destroyed by a blast.
    WallDestroyed {
        /// Cell that held the wall.
        cell: CellCoord,
    },
    /// Announces that an explosion ended.
    ExplosionFinished {
        /// Explosion that ended.
        explosion: ExplosionId,
    },
}

/// Read-only view over the arena classification and danger layers.
#[derive(Clone, Copy, Debug)]
pub struct ArenaView<'a> {
    tiles: &'a [Tile],
    danger: &'a [DangerLevel],
    width: u32,
    height: u32,
}

impl<'a> ArenaView<'a> {
    /// Captures a new view backed by row-major tile and danger slices.
    #[must_use]
    pub fn new(tiles: &'a [Tile], danger: &'a [DangerLevel], width: u32, height: u32) -> Self {
        Self {
            tiles,
            danger,
            width,
            height,
        }
    }

    /// Width of the arena in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the arena in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Provides the dimensions of the arena.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of cells inside the arena, `width * height`.
    ///
    /// Layers may be shorter; missing cells read as walls and safe cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.checked_mul(height).unwrap_or(0)
    }

    /// Reports whether the cell lies inside the arena.
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

    /// Danger level of the cell; out-of-bounds cells report no danger.
    #[must_use]
    pub fn danger_level(&self, cell: CellCoord) -> DangerLevel {
        self.index(cell)
            .and_then(|index| self.danger.get(index).copied())
            .unwrap_or_default()
    }

    /// Reports whether agents may walk through the cell.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.classify(cell).is_traversable()
    }

    /// Reports whether no hazard covers the cell.
    #[must_use]
    pub fn is_safe(&self, cell: CellCoord) -> bool {
        self.danger_level(cell).is_safe()
    }

    /// Row-major index of the cell, if it lies inside the arena.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Cell stored at the provided row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.width).ok()?;
        if width == 0 || index >= self.cell_count() {
            return None;
        }
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + 'a {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |row| (0..width).map(move |column| CellCoord::new(column, row)))
    }
}

/// Owned copy of the arena layers, used for hypothetical states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaSnapshot {
    tiles: Vec<Tile>,
    danger: Vec<DangerLevel>,
    width: u32,
    height: u32,
}

impl ArenaSnapshot {
    /// Creates a snapshot from row-major layers.
    ///
    /// Layers shorter than `width * height` read as walls and safe cells.
    #[must_use]
    pub fn new(tiles: Vec<Tile>, danger: Vec<DangerLevel>, width: u32, height: u32) -> Self {
        Self {
            tiles,
            danger,
            width,
            height,
        }
    }

    /// Borrows the snapshot as a read-only view.
    #[must_use]
    pub fn view(&self) -> ArenaView<'_> {
        ArenaView::new(&self.tiles, &self.danger, self.width, self.height)
    }
}
