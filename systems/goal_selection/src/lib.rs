#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interest scoring that picks exploration and attack goals for agents.
//!
//! Every cell reachable from the origin receives a score from its
//! classification and surroundings: bonuses rank above players, players above
//! floor next to breakable walls, and hazardous cells never score.

use blast_arena_core::{ArenaView, CellCoord, Direction, HazardTolerance, Tile};
use blast_arena_world::navigation::DistanceField;
use rand::{seq::IteratorRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Highest score an empty cell can earn from neighbouring breakable walls.
pub const MAX_WALL_SCORE: u32 = 4;

const DEFAULT_BONUS_SCORE: u32 = 10;
const DEFAULT_PLAYER_SCORE: u32 = 5;

/// Errors raised when a scoring configuration breaks the goal ordering.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Bonuses must outrank players.
    #[error("bonus score {bonus} must exceed player score {player}")]
    BonusNotAbovePlayer {
        /// Rejected bonus score.
        bonus: u32,
        /// Rejected player score.
        player: u32,
    },
    /// Players must outrank any wall-adjacent floor.
    #[error("player score {player} must exceed the wall score limit of {MAX_WALL_SCORE}")]
    PlayerNotAboveWalls {
        /// Rejected player score.
        player: u32,
    },
}

/// Scoring weights and traversal policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    bonus_score: u32,
    player_score: u32,
    tolerance: HazardTolerance,
}

impl Config {
    /// Validates and creates a configuration.
    pub fn new(bonus_score: u32, player_score: u32) -> Result<Self, ConfigError> {
        if player_score <= MAX_WALL_SCORE {
            return Err(ConfigError::PlayerNotAboveWalls {
                player: player_score,
            });
        }
        if bonus_score <= player_score {
            return Err(ConfigError::BonusNotAbovePlayer {
                bonus: bonus_score,
                player: player_score,
            });
        }

        Ok(Self {
            bonus_score,
            player_score,
            tolerance: HazardTolerance::Ignore,
        })
    }

    /// Replaces the policy deciding which hazardous cells the search crosses.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: HazardTolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Score of a reachable bonus.
    #[must_use]
    pub const fn bonus_score(&self) -> u32 {
        self.bonus_score
    }

    /// Score of a reachable player.
    #[must_use]
    pub const fn player_score(&self) -> u32 {
        self.player_score
    }

    /// Policy deciding which hazardous cells the search crosses.
    #[must_use]
    pub const fn tolerance(&self) -> HazardTolerance {
        self.tolerance
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bonus_score: DEFAULT_BONUS_SCORE,
            player_score: DEFAULT_PLAYER_SCORE,
            tolerance: HazardTolerance::Ignore,
        }
    }
}

/// Dense interest scores computed from a single origin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GoalMap {
    width: u32,
    height: u32,
    scores: Vec<u32>,
}

impl GoalMap {
    /// Width of the map in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the map in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major scores.
    #[must_use]
    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    /// Score of the provided cell, if it lies within the map.
    #[must_use]
    pub fn score(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        let width = usize::try_from(self.width).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        self.scores.get(row * width + column).copied()
    }

    /// Cell holding the strict maximum score, earliest in row-major order.
    ///
    /// Returns `None` when no cell scores above zero.
    #[must_use]
    pub fn best(&self) -> Option<CellCoord> {
        let width = usize::try_from(self.width).ok().filter(|width| *width > 0)?;
        let mut best: Option<(usize, u32)> = None;
        for (index, score) in self.scores.iter().copied().enumerate() {
            if best.map_or(score > 0, |(_, current)| score > current) {
                best = Some((index, score));
            }
        }

        let (index, _) = best?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Scores every cell reachable from `origin`.
#[must_use]
pub fn score_goals(view: ArenaView<'_>, origin: CellCoord, config: &Config) -> GoalMap {
    let mut reach = DistanceField::default();
    let tolerance = config.tolerance;
    reach.rebuild_with(view.width(), view.height(), origin, |cell| {
        !view.is_traversable(cell) || !tolerance.admits(view.danger_level(cell))
    });

    let scores = view
        .cells()
        .map(|cell| {
            if cell == origin || !reach.is_reachable(cell) {
                0
            } else {
                score_cell(view, cell, config)
            }
        })
        .collect();

    GoalMap {
        width: view.width(),
        height: view.height(),
        scores,
    }
}

/// Best goal reachable from `origin`, if any cell is worth visiting.
#[must_use]
pub fn select_goal(view: ArenaView<'_>, origin: CellCoord, config: &Config) -> Option<CellCoord> {
    let goal = score_goals(view, origin, config).best();
    tracing::debug!(?origin, ?goal, "goal selected");
    goal
}

fn score_cell(view: ArenaView<'_>, cell: CellCoord, config: &Config) -> u32 {
    if !view.is_safe(cell) {
        return 0;
    }

    match view.classify(cell) {
        Tile::Empty => adjacent_breakable_walls(view, cell),
        Tile::Bonus => config.bonus_score,
        Tile::Player => config.player_score,
        _ => 0,
    }
}

fn adjacent_breakable_walls(view: ArenaView<'_>, cell: CellCoord) -> u32 {
    let walls = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ]
    .into_iter()
    .filter_map(|direction| cell.step(direction))
    .filter(|neighbor| view.classify(*neighbor) == Tile::BreakableWall)
    .count();
    u32::try_from(walls).unwrap_or(MAX_WALL_SCORE)
}

/// Seeded fallback that wanders to random reachable cells.
#[derive(Clone, Debug)]
pub struct Exploration {
    rng: ChaCha8Rng,
}

impl Exploration {
    /// Creates an exploration source with a deterministic seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Picks a uniformly random cell the field reaches, other than its source.
    pub fn pick(&mut self, field: &DistanceField) -> Option<CellCoord> {
        let width = field.width();
        let height = field.height();
        let source = field.source();
        (0..height)
            .flat_map(|row| (0..width).map(move |column| CellCoord::new(column, row)))
            .filter(|cell| Some(*cell) != source && field.is_reachable(*cell))
            .choose(&mut self.rng)
    }
}
