//! Train-then-generate facade over extraction and solving.

use crate::config::TrainingConfig;
use crate::extractor::extract_patterns;
use crate::grid::{Grid, SourceGrid, TileGrid};
use crate::runner::{collapsed_patterns, SolveStats, Solver};
use crate::WfcError;
use log::{debug, info, warn};
use wfc_rules::{PatternId, PatternSummary, PatternTable, SymmetryTable, TileCode};

/// Overlapping model: learns patterns from a sample and synthesizes new grids.
///
/// The pattern table is rebuilt by every successful [`train`](Self::train)
/// call and only read afterwards, so any number of generations can follow.
#[derive(Debug, Clone)]
pub struct OverlappingModel {
    config: TrainingConfig,
    symmetry: SymmetryTable,
    table: Option<PatternTable>,
    last_stats: Option<SolveStats>,
}

impl OverlappingModel {
    /// Creates an untrained model.
    pub fn new(config: TrainingConfig, symmetry: SymmetryTable) -> Self {
        Self {
            config,
            symmetry,
            table: None,
            last_stats: None,
        }
    }

    /// Options of the last successful training, or the initial ones.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Tile catalog used for encoding.
    pub fn symmetry(&self) -> &SymmetryTable {
        &self.symmetry
    }

    /// Seed used by the next generation.
    pub fn set_seed(&mut self, seed: u64) {
        self.config.seed = seed;
    }

    /// True once a pattern table exists.
    pub fn is_trained(&self) -> bool {
        self.table.is_some()
    }

    /// Rebuilds the pattern table from `source` with the given window size.
    ///
    /// On failure the previously trained table, if any, stays in place.
    ///
    /// # Errors
    ///
    /// Configuration errors when the window does not fit the sample.
    pub fn train<G: SourceGrid + ?Sized>(
        &mut self,
        source: &G,
        pattern_size: usize,
    ) -> Result<usize, WfcError> {
        let mut config = self.config.clone();
        config.pattern_size = pattern_size;
        let table = extract_patterns(source, &self.symmetry, &config).map_err(|e| {
            warn!("Training failed: {}", e);
            e
        })?;
        let count = table.len();
        self.config = config;
        self.table = Some(table);
        Ok(count)
    }

    /// Synthesizes a fresh grid of the given dimensions.
    ///
    /// # Errors
    ///
    /// `WfcError::UninitializedModel` before training,
    /// `WfcError::ConfigurationError` for empty dimensions and
    /// `WfcError::Contradiction` when the solve dead-ends.
    pub fn generate(
        &mut self,
        width: usize,
        height: usize,
        depth: usize,
    ) -> Result<TileGrid, WfcError> {
        let table = self.table.as_ref().ok_or(WfcError::UninitializedModel)?;
        let mut solver = Solver::new(table, self.config.propagation_order, self.config.seed);
        let cells = solver.solve(width, height, depth)?;
        let patterns = collapsed_patterns(&cells)?;
        let output = decode_patterns(table, &patterns, None)?;
        self.last_stats = Some(solver.stats());
        Ok(output)
    }

    /// Completes `partial`: cells holding tile id 0 are synthesized, every
    /// other cell is a hard constraint and keeps its tile.
    ///
    /// # Errors
    ///
    /// As [`generate`](Self::generate); a fixed tile that no pattern can
    /// anchor raises `WfcError::Contradiction` at that cell, and a tile id
    /// too large to encode raises `WfcError::Rules`.
    pub fn generate_from(&mut self, partial: &TileGrid) -> Result<TileGrid, WfcError> {
        let table = self.table.as_ref().ok_or(WfcError::UninitializedModel)?;
        let data = partial
            .iter()
            .map(|tile| {
                if tile.id.is_empty() {
                    Ok(None)
                } else {
                    TileCode::try_encode(*tile, &self.symmetry).map(Some)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let seeds = Grid {
            width: partial.width,
            height: partial.height,
            depth: partial.depth,
            data,
        };
        let fixed = seeds.iter().filter(|s| s.is_some()).count();
        debug!("Completing partial grid with {} fixed cells", fixed);

        let mut solver = Solver::new(table, self.config.propagation_order, self.config.seed);
        let cells = solver.solve_seeded(&seeds)?;
        let patterns = collapsed_patterns(&cells)?;
        let output = decode_patterns(table, &patterns, Some(partial))?;
        self.last_stats = Some(solver.stats());
        Ok(output)
    }

    /// Number of distinct patterns, or 0 before training.
    pub fn pattern_count(&self) -> usize {
        self.table.as_ref().map_or(0, PatternTable::len)
    }

    /// Per-pattern diagnostics, or None before training.
    pub fn pattern_summary(&self) -> Option<PatternSummary> {
        self.table.as_ref().map(PatternTable::summary)
    }

    /// The trained table, if any.
    pub fn pattern_table(&self) -> Option<&PatternTable> {
        self.table.as_ref()
    }

    /// Counters of the last successful generation.
    pub fn last_stats(&self) -> Option<SolveStats> {
        self.last_stats
    }
}

/// Turns collapsed pattern ids back into tiles via each pattern's anchor.
///
/// Cells fixed in `partial` keep their original tile.
fn decode_patterns(
    table: &PatternTable,
    patterns: &Grid<PatternId>,
    partial: Option<&TileGrid>,
) -> Result<TileGrid, WfcError> {
    let mut tiles = Vec::with_capacity(patterns.len());
    for (index, &id) in patterns.iter().enumerate() {
        let fixed = partial
            .and_then(|grid| grid.data.get(index))
            .filter(|tile| !tile.id.is_empty());
        let tile = match fixed {
            Some(&tile) => tile,
            None => table
                .get(id)
                .map(|pattern| pattern.anchor().decode())
                .ok_or_else(|| WfcError::InternalError(format!("Unknown pattern id {id}")))?,
        };
        tiles.push(tile);
    }
    info!(
        "Decoded {}x{}x{} output grid",
        patterns.width, patterns.height, patterns.depth
    );
    Ok(Grid {
        width: patterns.width,
        height: patterns.height,
        depth: patterns.depth,
        data: tiles,
    })
}
