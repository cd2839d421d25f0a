//! Tile codec, symmetry catalog and pattern/compatibility tables for the
//! overlapping Wave Function Collapse model.

use thiserror::Error;

pub mod codec;
pub mod generator;
pub mod pattern;
pub mod transform;
pub mod types;

pub use codec::{TileCode, MAX_TILE_ID};
pub use generator::{generate_compatibility, PatternTableBuilder};
pub use pattern::{
    Direction, Pattern, PatternId, PatternSummary, PatternSummaryEntry, PatternTable, WindowShape,
};
pub use transform::{orient_window, Orientation};
pub use types::{SymmetryClass, SymmetryTable, Tile, TileId};

/// Errors raised while building the tile catalog or the pattern table.
///
/// All of these are configuration problems detected before any solving work.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// The tile symmetry catalog has no entries.
    #[error("Tile catalog is empty")]
    EmptyCatalog,
    /// A symmetry class name could not be parsed.
    #[error("Unknown symmetry class: {0}")]
    UnknownSymmetry(String),
    /// The pattern size must be at least 1.
    #[error("Invalid pattern size {size}: must be at least 1")]
    InvalidPatternSize {
        /// Requested window extent.
        size: usize,
    },
    /// The pattern window does not fit the sample along an axis.
    #[error("Pattern size {size} exceeds the sample extent {extent} along {axis}")]
    PatternSizeExceedsExtent {
        /// `'x'`, `'y'` or `'z'`.
        axis: char,
        /// Requested window extent.
        size: usize,
        /// Sample extent along `axis`.
        extent: usize,
    },
    /// The sample grid has no cells, or no window could be extracted.
    #[error("Sample grid yields no patterns")]
    EmptySample,
    /// A window was observed with the wrong number of cells.
    #[error("Window has {found} cells, expected {expected}")]
    CellCountMismatch {
        /// Cells in the window shape.
        expected: usize,
        /// Cells supplied.
        found: usize,
    },
    /// The tile id does not fit the encoded tile layout.
    #[error("Tile id {id} exceeds the maximum of {max}", max = crate::MAX_TILE_ID)]
    TileIdOutOfRange {
        /// The rejected id.
        id: u32,
    },
}
