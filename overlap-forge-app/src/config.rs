use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wfc_core::{PropagationOrder, TrainingConfig};
use wfc_rules::{SymmetryClass, TileId};

/// Prefix of environment variables overriding the configuration file.
pub const ENV_PREFIX: &str = "OVERLAP_FORGE_";

/// Log level of the whole application.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Everything, including per-iteration solver traces.
    Trace,
    /// Propagation and extraction details.
    Debug,
    /// Progress messages.
    #[default]
    Info,
    /// Recoverable problems only.
    Warn,
    /// Failures only.
    Error,
}

/// Command-line configuration for the Overlap Forge application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Sample grid to learn patterns from (text grid format).
    #[arg(short, long, value_name = "FILE")]
    pub sample: PathBuf,

    /// Optional TOML file with `[training]` options and the `[[tiles]]` catalog.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Partial grid to complete instead of generating from scratch.
    #[arg(long, value_name = "FILE")]
    pub partial: Option<PathBuf>,

    /// Width of the output grid.
    #[arg(long, default_value_t = 10)]
    pub width: usize,

    /// Height of the output grid.
    #[arg(long, default_value_t = 1)]
    pub height: usize,

    /// Depth of the output grid.
    #[arg(long, default_value_t = 10)]
    pub depth: usize,

    /// Window size; overrides the configuration file.
    #[arg(short, long)]
    pub pattern_size: Option<usize>,

    /// Seed for the random number generator; overrides the configuration file.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also learn rotated windows.
    #[arg(long, default_value_t = false)]
    pub rotation: bool,

    /// Also learn mirrored windows.
    #[arg(long, default_value_t = false)]
    pub reflection: bool,

    /// Treat the sample as wrapping along x and z.
    #[arg(long, default_value_t = false)]
    pub periodic_horizontal: bool,

    /// Treat the sample as wrapping along y.
    #[arg(long, default_value_t = false)]
    pub periodic_vertical: bool,

    /// Truncate windows at the sample edge instead of padding.
    #[arg(long, default_value_t = false)]
    pub no_sandwich: bool,

    #[arg(long, value_enum)]
    pub propagation_order: Option<PropagationOrder>,

    /// Path to save the generated output grid.
    #[arg(short, long, value_name = "FILE", default_value = "output.txt")]
    pub output_path: PathBuf,

    /// Print the learned pattern table.
    #[arg(long, default_value_t = false)]
    pub summary: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info, env = "OVERLAP_FORGE_LOG_LEVEL")]
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Applies flags given on the command line on top of `training`.
    pub fn apply_overrides(&self, training: &mut TrainingConfig) {
        if let Some(size) = self.pattern_size {
            training.pattern_size = size;
        }
        if let Some(seed) = self.seed {
            training.seed = seed;
        }
        if let Some(order) = self.propagation_order {
            training.propagation_order = order;
        }
        training.enable_rotation |= self.rotation;
        training.enable_reflection |= self.reflection;
        training.horizontal_periodic |= self.periodic_horizontal;
        training.vertical_periodic |= self.periodic_vertical;
        if self.no_sandwich {
            training.sandwich_patterns = false;
        }
    }
}

/// One catalog entry of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileEntry {
    /// Catalog id; 0 is reserved for empty cells.
    pub id: u32,
    /// Symmetry class letter.
    pub symmetry: SymmetryClass,
}

/// Contents of the optional configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// `[training]` table.
    pub training: TrainingConfig,
    /// `[[tiles]]` catalog.
    pub tiles: Vec<TileEntry>,
}

impl FileConfig {
    /// Merges defaults, the TOML file (if any) and `OVERLAP_FORGE_*` variables.
    ///
    /// Nested keys use `__` in variable names, e.g. `OVERLAP_FORGE_TRAINING__SEED`.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["log_level"]))
            .extract()?;
        log::debug!("Loaded file config: {:?}", config);
        Ok(config)
    }

    /// Catalog entries as `(id, class)` pairs.
    pub fn symmetry_pairs(&self) -> impl Iterator<Item = (TileId, SymmetryClass)> + '_ {
        self.tiles.iter().map(|t| (TileId(t.id), t.symmetry))
    }
}
