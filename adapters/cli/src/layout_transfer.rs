use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use blast_arena_core::{CellCoord, Tile};
use blast_arena_world::{
    grid::Grid,
    layout::{glyph, ArenaLayout, LayoutError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "arena";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "arena:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Snapshot of an arena's classifications and spawn points as ASCII rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LayoutSnapshot {
    /// Number of columns contained in the arena.
    pub(crate) width: u32,
    /// Number of rows contained in the arena.
    pub(crate) height: u32,
    /// Layout rows, top row first.
    pub(crate) rows: Vec<String>,
}

impl LayoutSnapshot {
    /// Captures the current classifications of a grid.
    #[must_use]
    pub(crate) fn capture(grid: &Grid, spawns: &[CellCoord]) -> Self {
        let (width, height) = grid.dimensions();
        let rows = (0..height)
            .rev()
            .map(|row| {
                (0..width)
                    .map(|column| {
                        let cell = CellCoord::new(column, row);
                        let tile = grid.classify(cell);
                        if tile == Tile::Empty && spawns.contains(&cell) {
                            'S'
                        } else {
                            glyph(tile)
                        }
                    })
                    .collect()
            })
            .collect();

        Self {
            width,
            height,
            rows,
        }
    }

    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableSnapshot {
            rows: self.rows.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::Serialize)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{SNAPSHOT_HEADER}:{}x{}:{encoded}",
            self.width, self.height
        ))
    }

    /// Decodes a snapshot from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (width, height) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            width,
            height,
            rows: decoded.rows,
        })
    }

    /// Parses the captured rows back into a layout with matching dimensions.
    pub(crate) fn to_layout(&self) -> Result<ArenaLayout, LayoutTransferError> {
        let layout = ArenaLayout::parse(&self.rows.join("\n"))?;
        let found = (layout.width(), layout.height());
        if found != (self.width, self.height) {
            return Err(LayoutTransferError::DimensionMismatch {
                declared: format!("{}x{}", self.width, self.height),
                found: format!("{}x{}", found.0, found.1),
            });
        }
        Ok(layout)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    rows: Vec<String>,
}

/// Errors that can occur while transferring layout strings.
#[derive(Debug, Error)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("layout payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("layout string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("layout string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include grid dimensions.
    #[error("layout string is missing the grid dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("layout string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("layout prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("layout version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed from the encoded snapshot.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode layout payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse layout payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The snapshot could not be serialised.
    #[error("could not serialise layout payload: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The rows did not form a valid layout.
    #[error("layout rows are invalid: {0}")]
    InvalidLayout(#[from] LayoutError),
    /// The rows disagreed with the declared dimensions.
    #[error("layout declares {declared} but its rows describe {found}")]
    DimensionMismatch {
        /// Dimensions from the header.
        declared: String,
        /// Dimensions described by the rows.
        found: String,
    },
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| LayoutTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(LayoutTransferError::InvalidDimensions(
            dimensions.to_owned(),
        ));
    }

    Ok((width, height))
}
