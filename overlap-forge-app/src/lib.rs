//! Overlap Forge Application Library
//!
//! Loads a sample grid, trains the overlapping model on it and writes a
//! generated grid. Configuration, logging and grid file I/O live here.

pub mod config;
pub mod error;
pub mod logging;
pub mod output;

pub use config::{AppConfig, FileConfig};
pub use error::AppError;

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use std::time::Instant;
use wfc_core::{OverlappingModel, SourceGrid, TileGrid};
use wfc_rules::{SymmetryClass, SymmetryTable, TileId};

/// Builds the symmetry catalog: configured entries, or every sample id as
/// asymmetric when none are configured.
pub fn build_catalog(file_config: &FileConfig, sample: &TileGrid) -> Result<SymmetryTable, AppError> {
    if !file_config.tiles.is_empty() {
        return Ok(SymmetryTable::from_pairs(file_config.symmetry_pairs())?);
    }
    let ids: BTreeSet<TileId> = sample
        .iter()
        .map(|tile| tile.id)
        .filter(|id| !id.is_empty())
        .collect();
    log::warn!(
        "No tile catalog configured; treating {} sample tile ids as asymmetric",
        ids.len()
    );
    Ok(SymmetryTable::from_pairs(
        ids.into_iter().map(|id| (id, SymmetryClass::None)),
    )?)
}

/// Runs one train-and-generate pass with the given settings.
pub fn run(config: &AppConfig) -> Result<()> {
    let start = Instant::now();
    let file_config = FileConfig::load(config.config.as_deref())?;
    let mut training = file_config.training.clone();
    config.apply_overrides(&mut training);
    log::debug!("Effective training config: {:?}", training);

    let sample = output::load_grid_from_file(&config.sample)?;
    let symmetry = build_catalog(&file_config, &sample)?;
    let pattern_size = training.pattern_size;
    let mut model = OverlappingModel::new(training, symmetry);

    let count = model
        .train(&sample, pattern_size)
        .map_err(AppError::from)
        .context("Training failed")?;
    log::info!(
        "Trained on {}x{}x{} sample: {} patterns",
        sample.width(),
        sample.height(),
        sample.depth(),
        count
    );
    if config.summary {
        if let Some(summary) = model.pattern_summary() {
            print!("{summary}");
        }
    }

    let generated = match &config.partial {
        Some(path) => {
            let partial = output::load_grid_from_file(path)?;
            model.generate_from(&partial)
        }
        None => model.generate(config.width, config.height, config.depth),
    }
    .map_err(AppError::from)
    .context("Generation failed")?;

    if let Some(stats) = model.last_stats() {
        log::info!(
            "Generated {}x{}x{} grid: {} observations, {} auto-collapses",
            generated.width,
            generated.height,
            generated.depth,
            stats.observations,
            stats.auto_collapses
        );
    }
    output::save_grid_to_file(&generated, &config.output_path)?;
    log::info!("Overlap Forge finished in {:?}", start.elapsed());
    Ok(())
}

/// Parses the command line, sets up logging and runs.
pub fn main() -> Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(&config);
    log::info!("Overlap Forge App Starting");
    log::debug!("Loaded Config: {:?}", config);
    run(&config).map_err(|e| {
        log::error!("{:#}", e);
        e
    })
}
