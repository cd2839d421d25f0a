use crate::cell::Cell;
use crate::grid::Grid;
use float_ord::FloatOrd;
use rayon::prelude::*;

/// Upper bound of the tie-breaking noise added to each cell's entropy.
///
/// Well below the smallest gap between distinct pattern-set entropies.
pub const ENTROPY_NOISE: f64 = 1e-6;

/// Frequency-weighted Shannon entropy of an admissible set.
///
/// `sum_weights` is the sum of relative frequencies `S`, `sum_weight_log_weights`
/// the sum of `f * log2(f)` terms `L`; the result is `log2(S) - L / S`.
pub fn shannon_entropy(sum_weights: f64, sum_weight_log_weights: f64) -> f64 {
    if sum_weights <= 0.0 {
        return 0.0;
    }
    sum_weights.log2() - sum_weight_log_weights / sum_weights
}

/// Picks the next cell to observe.
pub trait EntropyCalculator {
    /// Coordinates of the uncollapsed cell with the lowest entropy, or None
    /// when every cell is collapsed.
    #[must_use]
    fn find_lowest_entropy(&self, cells: &Grid<Cell>) -> Option<(usize, usize, usize)>;
}

/// Shannon entropy over cell weight sums, scanned with rayon.
#[derive(Debug, Clone, Default)]
pub struct CpuEntropyCalculator;

impl CpuEntropyCalculator {
    /// Creates the calculator.
    pub fn new() -> Self {
        Self
    }
}

impl EntropyCalculator for CpuEntropyCalculator {
    fn find_lowest_entropy(&self, cells: &Grid<Cell>) -> Option<(usize, usize, usize)> {
        // Keyed on (entropy, index) so exact ties resolve the same way on every run.
        cells
            .data
            .par_iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_collapsed())
            .min_by_key(|&(index, cell)| (FloatOrd(cell.entropy()), index))
            .map(|(index, _)| cells.coords_of(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pattern_has_zero_entropy() {
        // One pattern with relative frequency 1: log2(1) - 0 / 1
        assert!(shannon_entropy(1.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn two_equal_patterns_have_one_bit() {
        let half = 0.5_f64;
        let l = 2.0 * half * half.log2();
        assert!((shannon_entropy(1.0, l) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn subset_entropy_is_renormalized() {
        // Two of four equal patterns left: S = 0.5, still one bit.
        let q = 0.25_f64;
        let l = 2.0 * q * q.log2();
        assert!((shannon_entropy(0.5, l) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_sum_is_finite() {
        assert_eq!(shannon_entropy(0.0, 0.0), 0.0);
    }
}
