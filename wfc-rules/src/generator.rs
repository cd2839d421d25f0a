use crate::codec::TileCode;
use crate::pattern::{Direction, Pattern, PatternId, PatternTable, WindowShape};
use crate::RulesError;
use bitvec::prelude::*;
use log::debug;
use rayon::prelude::*;
use std::collections::HashMap;

/// Accumulates window observations and turns them into a [`PatternTable`].
///
/// Windows are deduplicated by content; every call to [`observe`](Self::observe)
/// counts as one observation, whether it came from the sample directly or from
/// an augmented orientation.
#[derive(Debug, Clone)]
pub struct PatternTableBuilder {
    shape: WindowShape,
    windows: Vec<Vec<TileCode>>,
    frequencies: Vec<u32>,
    index: HashMap<Vec<TileCode>, PatternId>,
    total_observations: u64,
}

impl PatternTableBuilder {
    /// Starts an empty builder for windows of `shape`.
    pub fn new(shape: WindowShape) -> Self {
        Self {
            shape,
            windows: Vec::new(),
            frequencies: Vec::new(),
            index: HashMap::new(),
            total_observations: 0,
        }
    }

    /// Records one observation of `cells`, returning its pattern id.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::CellCountMismatch` if `cells` does not fill the window.
    pub fn observe(&mut self, cells: Vec<TileCode>) -> Result<PatternId, RulesError> {
        if cells.len() != self.shape.len() {
            return Err(RulesError::CellCountMismatch {
                expected: self.shape.len(),
                found: cells.len(),
            });
        }
        self.total_observations += 1;
        if let Some(&id) = self.index.get(&cells) {
            self.frequencies[id] += 1;
            return Ok(id);
        }
        let id = self.windows.len();
        self.index.insert(cells.clone(), id);
        self.windows.push(cells);
        self.frequencies.push(1);
        Ok(id)
    }

    /// Number of distinct windows seen so far.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// True before the first observation.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Observations recorded, duplicates included.
    pub fn total_observations(&self) -> u64 {
        self.total_observations
    }

    /// Derives frequency statistics and the compatibility relation.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::EmptySample` if nothing was observed.
    pub fn build(self) -> Result<PatternTable, RulesError> {
        if self.windows.is_empty() {
            return Err(RulesError::EmptySample);
        }
        let compatibility = generate_compatibility(&self.windows, self.shape);
        let total = self.total_observations as f64;

        let patterns: Vec<Pattern> = self
            .windows
            .into_iter()
            .zip(self.frequencies)
            .zip(compatibility)
            .enumerate()
            .map(|(id, ((cells, frequency), compatibility))| {
                let relative_frequency = f64::from(frequency) / total;
                let relative_frequency_log2 = relative_frequency.log2();
                Pattern {
                    id,
                    cells,
                    frequency,
                    relative_frequency,
                    relative_frequency_log2,
                    freq_times_freq_log2: relative_frequency * relative_frequency_log2,
                    compatibility,
                }
            })
            .collect();

        debug!(
            "Built pattern table: {} patterns, {} observations, window {}",
            patterns.len(),
            self.total_observations,
            self.shape
        );

        Ok(PatternTable {
            patterns,
            index: self.index,
            shape: self.shape,
            total_observations: self.total_observations,
        })
    }
}

/// Computes, for every window and direction, the set of windows that agree with
/// it on their overlap when placed one cell away in that direction.
///
/// Along an axis whose window extent is 1 the overlap is empty and every pair
/// is compatible. The relation is symmetric under direction reversal.
pub fn generate_compatibility(
    windows: &[Vec<TileCode>],
    shape: WindowShape,
) -> Vec<[BitVec; Direction::COUNT]> {
    let count = windows.len();
    let compatibility: Vec<[BitVec; Direction::COUNT]> = windows
        .par_iter()
        .map(|a| {
            Direction::ALL.map(|direction| {
                windows
                    .iter()
                    .map(|b| agrees(a, b, shape, direction))
                    .collect::<BitVec>()
            })
        })
        .collect();
    debug!(
        "Generated compatibility for {} patterns with {} allowed pairs",
        count,
        compatibility
            .iter()
            .flat_map(|sets| sets.iter())
            .map(|set| set.count_ones())
            .sum::<usize>()
    );
    compatibility
}

/// True iff `b`, with its origin shifted one cell from `a` in `direction`,
/// matches `a` cell-wise on the overlap.
pub fn agrees(a: &[TileCode], b: &[TileCode], shape: WindowShape, direction: Direction) -> bool {
    let (dx, dy, dz) = direction.offset();
    let x_range = overlap(shape.width, dx);
    let y_range = overlap(shape.height, dy);
    let z_range = overlap(shape.depth, dz);
    for z in z_range.clone() {
        for y in y_range.clone() {
            for x in x_range.clone() {
                let bx = (x as isize - dx) as usize;
                let by = (y as isize - dy) as usize;
                let bz = (z as isize - dz) as usize;
                if a[shape.index(x, y, z)] != b[shape.index(bx, by, bz)] {
                    return false;
                }
            }
        }
    }
    true
}

// Local coordinates of `a` that also fall inside `b` when `b` is shifted by `delta`.
fn overlap(extent: usize, delta: isize) -> std::ops::Range<usize> {
    match delta {
        1 => 1.min(extent)..extent,
        -1 => 0..extent.saturating_sub(1),
        _ => 0..extent,
    }
}
