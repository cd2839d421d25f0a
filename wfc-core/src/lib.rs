//! Core library for the overlapping Wave Function Collapse model.
//! Pattern extraction from sample grids and the entropy-driven solver.

use propagator::PropagationError;
use rand::distributions::WeightedError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wfc_rules::RulesError;

/// Per-position solver state.
pub mod cell;
/// Training options.
pub mod config;
/// Entropy calculation logic and traits.
pub mod entropy;
/// Sliding-window pattern mining.
pub mod extractor;
/// Generic 3D grid structures.
pub mod grid;
/// Train/generate facade.
pub mod model;
/// Constraint propagation logic and traits.
pub mod propagator;
/// The observe/propagate solver loop.
pub mod runner;

pub use crate::cell::Cell;
pub use crate::config::{TrainingConfig, TrainingConfigBuilder};
pub use crate::entropy::{CpuEntropyCalculator, EntropyCalculator};
pub use crate::extractor::{encode_sample, extract_patterns, window_shape};
pub use crate::grid::{Grid, SourceGrid, TileGrid};
pub use crate::model::OverlappingModel;
pub use crate::propagator::{ConstraintPropagator, CpuConstraintPropagator, PendingRemovals};
pub use crate::runner::{SolveStats, Solver};

/// Errors that can occur while training or generating.
#[derive(Error, Debug)]
pub enum WfcError {
    /// Invalid options or output dimensions.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// Pattern extraction rejected the sample or window.
    #[error("Rules error: {0}")]
    Rules(#[from] RulesError),
    /// Generation was requested before a successful training run.
    #[error("Model has not been trained")]
    UninitializedModel,
    /// A cell's admissible set became empty.
    /// Includes the (x, y, z) coordinates of the contradictory cell.
    #[error("Contradiction found at ({0}, {1}, {2})")]
    Contradiction(usize, usize, usize),
    /// The solve finished with cells still open.
    #[error("Solve finished with uncollapsed cells")]
    IncompleteCollapse,
    /// Error occurred during weighted random selection.
    #[error("Weighted selection error: {0}")]
    WeightedChoiceError(#[from] WeightedError),
    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WfcError {
    /// True for errors raised before any solving work starts.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::ConfigurationError(_) | Self::Rules(_))
    }
}

impl From<PropagationError> for WfcError {
    fn from(err: PropagationError) -> Self {
        match err {
            PropagationError::Contradiction(x, y, z) => Self::Contradiction(x, y, z),
            PropagationError::InternalError(msg) => Self::InternalError(msg),
        }
    }
}

/// How windows that cross a sample edge are handled along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundaryPolicy {
    /// Coordinates wrap around.
    Periodic,
    /// Coordinates past the edge repeat the last slice.
    #[default]
    Padded,
    /// Only windows that fit entirely are observed.
    Truncated,
}

impl BoundaryPolicy {
    /// Periodic wins over padding.
    pub fn select(periodic: bool, sandwich: bool) -> Self {
        match (periodic, sandwich) {
            (true, _) => Self::Periodic,
            (false, true) => Self::Padded,
            (false, false) => Self::Truncated,
        }
    }
}

/// Order in which cells with pending removals are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PropagationOrder {
    /// Earliest queued cell first.
    #[default]
    Fifo,
    /// Latest queued cell first.
    Lifo,
}
