//! Static arena layouts and their ASCII representation.
//!
//! The first text line describes the top row of the arena. Recognised glyphs:
//!
//! | Glyph | Meaning |
//! |-------|---------|
//! | `#`   | permanent wall |
//! | `+`   | breakable wall |
//! | `.`   | empty floor |
//! | `*`   | bonus |
//! | `@`   | player |
//! | `B`   | bomb tile (no hazard is registered for it) |
//! | `X`   | explosion tile |
//! | `S`   | spawn point on empty floor |

use std::str::FromStr;

use blast_arena_core::{CellCoord, Tile};
use thiserror::Error;

use crate::grid::Grid;

/// Largest accepted side length, in cells.
pub const MAX_LAYOUT_SIDE: usize = 256;

const CLASSIC_WIDTH: u32 = 13;
const CLASSIC_HEIGHT: u32 = 11;

/// Errors raised while parsing an ASCII layout.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The text contained no non-blank line.
    #[error("layout contains no rows")]
    Empty,
    /// A line had a different number of glyphs than the first line.
    #[error("line {line} has {found} cells; expected {expected}")]
    Ragged {
        /// Zero-based line index counted from the top of the text.
        line: usize,
        /// Width established by the first line.
        expected: usize,
        /// Width of the offending line.
        found: usize,
    },
    /// A glyph did not map to any classification.
    #[error("unknown glyph `{glyph}` at line {line}, column {column}")]
    UnknownGlyph {
        /// Offending character.
        glyph: char,
        /// Zero-based line index counted from the top of the text.
        line: usize,
        /// Zero-based column index.
        column: usize,
    },
    /// The layout exceeded [`MAX_LAYOUT_SIDE`] along one axis.
    #[error("layout side of {found} cells exceeds the limit of {MAX_LAYOUT_SIDE}")]
    TooLarge {
        /// Offending side length.
        found: usize,
    },
}

/// Static description of an arena: classifications plus spawn points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaLayout {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
    spawns: Vec<CellCoord>,
}

impl ArenaLayout {
    /// Parses an ASCII layout, ignoring blank lines and surrounding whitespace.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let Some(first) = lines.first() else {
            return Err(LayoutError::Empty);
        };
        let expected = first.chars().count();
        if expected > MAX_LAYOUT_SIDE {
            return Err(LayoutError::TooLarge { found: expected });
        }
        if lines.len() > MAX_LAYOUT_SIDE {
            return Err(LayoutError::TooLarge { found: lines.len() });
        }

        let height = lines.len();
        let mut tiles = vec![Tile::Empty; expected * height];
        let mut spawns = Vec::new();

        for (line_index, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(LayoutError::Ragged {
                    line: line_index,
                    expected,
                    found,
                });
            }

            let row = height - 1 - line_index;
            for (column, glyph) in line.chars().enumerate() {
                let tile = match glyph {
                    '#' => Tile::PermanentWall,
                    '+' => Tile::BreakableWall,
                    '.' => Tile::Empty,
                    '*' => Tile::Bonus,
                    '@' => Tile::Player,
                    'B' => Tile::Bomb,
                    'X' => Tile::Explosion,
                    'S' => {
                        spawns.push(cell_at(column, row));
                        Tile::Empty
                    }
                    _ => {
                        return Err(LayoutError::UnknownGlyph {
                            glyph,
                            line: line_index,
                            column,
                        })
                    }
                };
                tiles[row * expected + column] = tile;
            }
        }

        spawns.sort();
        Ok(Self {
            width: to_u32(expected),
            height: to_u32(height),
            tiles,
            spawns,
        })
    }

    /// Classic 13×11 arena: a permanent border, a pillar on every even
    /// interior cell and one spawn point in each corner.
    #[must_use]
    pub fn classic() -> Self {
        let capacity = usize::try_from(CLASSIC_WIDTH * CLASSIC_HEIGHT).unwrap_or(0);
        let mut tiles = Vec::with_capacity(capacity);
        for row in 0..CLASSIC_HEIGHT {
            for column in 0..CLASSIC_WIDTH {
                let border = column == 0
                    || row == 0
                    || column == CLASSIC_WIDTH - 1
                    || row == CLASSIC_HEIGHT - 1;
                let pillar = column % 2 == 0 && row % 2 == 0;
                tiles.push(if border || pillar {
                    Tile::PermanentWall
                } else {
                    Tile::Empty
                });
            }
        }

        let spawns = vec![
            CellCoord::new(1, 1),
            CellCoord::new(1, CLASSIC_HEIGHT - 2),
            CellCoord::new(CLASSIC_WIDTH - 2, 1),
            CellCoord::new(CLASSIC_WIDTH - 2, CLASSIC_HEIGHT - 2),
        ];

        Self {
            width: CLASSIC_WIDTH,
            height: CLASSIC_HEIGHT,
            tiles,
            spawns,
        }
    }

    /// Width of the layout in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the layout in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major classifications, bottom row first.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Spawn points in ascending coordinate order.
    #[must_use]
    pub fn spawns(&self) -> &[CellCoord] {
        &self.spawns
    }

    /// Builds a grid whose static layout matches this description.
    #[must_use]
    pub fn to_grid(&self) -> Grid {
        Grid::from_tiles(self.width, self.height, self.tiles.clone())
    }

    /// Renders the layout back into text lines, top row first.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        (0..height)
            .rev()
            .map(|row| {
                (0..width)
                    .map(|column| {
                        let cell = cell_at(column, row);
                        let tile = self
                            .tiles
                            .get(row * width + column)
                            .copied()
                            .unwrap_or(Tile::PermanentWall);
                        if tile == Tile::Empty && self.spawns.binary_search(&cell).is_ok() {
                            'S'
                        } else {
                            glyph(tile)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self::classic()
    }
}

impl FromStr for ArenaLayout {
    type Err = LayoutError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

/// Glyph used for a classification in layouts and debug overlays.
#[must_use]
pub const fn glyph(tile: Tile) -> char {
    match tile {
        Tile::Empty => '.',
        Tile::PermanentWall => '#',
        Tile::BreakableWall => '+',
        Tile::Bomb => 'B',
        Tile::Explosion => 'X',
        Tile::Bonus => '*',
        Tile::Player => '@',
    }
}

fn cell_at(column: usize, row: usize) -> CellCoord {
    CellCoord::new(to_u32(column), to_u32(row))
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
