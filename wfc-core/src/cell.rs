use crate::entropy::shannon_entropy;
use bitvec::prelude::*;
use wfc_rules::{Direction, PatternId, PatternTable};

/// Per-direction enabler counters of one pattern.
pub type EnablerCounts = [u32; Direction::COUNT];

/// Below this the running frequency sum is recomputed from scratch.
const SUM_EPSILON: f64 = 1e-9;

/// One output position during a solve.
///
/// `enablers[p][d]` counts the patterns still admissible in the neighbour in
/// direction `d` that are compatible with `p`. When it drops to zero `p` is no
/// longer supported and is removed.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Grid coordinates `(x, y, z)`.
    pub position: (usize, usize, usize),
    possible: BitVec,
    remaining: usize,
    enablers: Vec<EnablerCounts>,
    sum_weights: f64,
    sum_weight_log_weights: f64,
    noise: f64,
    entropy: f64,
    collapsed: Option<PatternId>,
}

impl Cell {
    /// A cell admitting every pattern, with the given initial enabler counts.
    ///
    /// `noise` is added to the entropy to break exact ties.
    pub fn new(
        position: (usize, usize, usize),
        table: &PatternTable,
        initial_enablers: &[EnablerCounts],
        noise: f64,
    ) -> Self {
        let (sum_weights, sum_weight_log_weights) = table
            .iter()
            .fold((0.0, 0.0), |(s, l), p| {
                (s + p.relative_frequency, l + p.freq_times_freq_log2)
            });
        Self {
            position,
            possible: bitvec![1; table.len()],
            remaining: table.len(),
            enablers: initial_enablers.to_vec(),
            sum_weights,
            sum_weight_log_weights,
            noise,
            entropy: shannon_entropy(sum_weights, sum_weight_log_weights) + noise,
            collapsed: None,
        }
    }

    /// Whether `pattern` is still admissible here.
    #[inline]
    pub fn is_possible(&self, pattern: PatternId) -> bool {
        self.possible.get(pattern).map_or(false, |bit| *bit)
    }

    /// Admissible pattern ids in ascending order.
    pub fn possible_patterns(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.possible.iter_ones()
    }

    /// Size of the admissible set.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Cached entropy; `f64::INFINITY` once collapsed.
    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    /// Sum of relative frequencies over the admissible set.
    pub fn sum_of_weights(&self) -> f64 {
        self.sum_weights
    }

    /// True once the cell is fixed to one pattern.
    pub fn is_collapsed(&self) -> bool {
        self.collapsed.is_some()
    }

    /// The pattern a collapsed cell holds.
    pub fn collapsed_pattern(&self) -> Option<PatternId> {
        self.collapsed
    }

    /// Supporters of `pattern` left in the neighbour at `direction`.
    pub fn enabler_count(&self, pattern: PatternId, direction: Direction) -> u32 {
        self.enablers
            .get(pattern)
            .map_or(0, |counts| counts[direction.index()])
    }

    /// Decrements the enabler counter and returns the new value.
    pub(crate) fn decrement_enabler(&mut self, pattern: PatternId, direction: Direction) -> u32 {
        match self.enablers.get_mut(pattern) {
            Some(counts) => {
                let count = &mut counts[direction.index()];
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        }
    }

    /// Removes `pattern` from the admissible set and refreshes the entropy.
    ///
    /// Returns false if it was not admissible.
    pub(crate) fn remove(&mut self, pattern: PatternId, table: &PatternTable) -> bool {
        if !self.is_possible(pattern) {
            return false;
        }
        self.possible.set(pattern, false);
        self.remaining -= 1;
        if let Some(p) = table.get(pattern) {
            self.sum_weights = (self.sum_weights - p.relative_frequency).max(0.0);
            self.sum_weight_log_weights -= p.freq_times_freq_log2;
        }
        if self.remaining > 0 && self.sum_weights < SUM_EPSILON {
            self.recompute_sums(table);
        }
        if !self.is_collapsed() {
            self.refresh_entropy();
        }
        true
    }

    /// Commits the cell to `pattern` and returns every other pattern that was
    /// admissible, in ascending order.
    pub(crate) fn collapse_to(&mut self, pattern: PatternId, table: &PatternTable) -> Vec<PatternId> {
        let removed: Vec<PatternId> = self
            .possible
            .iter_ones()
            .filter(|&p| p != pattern)
            .collect();
        self.possible.fill(false);
        self.possible.set(pattern, true);
        self.remaining = 1;
        if let Some(p) = table.get(pattern) {
            self.sum_weights = p.relative_frequency;
            self.sum_weight_log_weights = p.freq_times_freq_log2;
        }
        self.mark_collapsed(pattern);
        removed
    }

    /// Marks a cell whose admissible set already is `{pattern}` as collapsed.
    pub(crate) fn mark_collapsed(&mut self, pattern: PatternId) {
        self.collapsed = Some(pattern);
        self.entropy = f64::INFINITY;
    }

    fn recompute_sums(&mut self, table: &PatternTable) {
        let (s, l) = self
            .possible
            .iter_ones()
            .filter_map(|id| table.get(id))
            .fold((0.0, 0.0), |(s, l), p| {
                (s + p.relative_frequency, l + p.freq_times_freq_log2)
            });
        self.sum_weights = s;
        self.sum_weight_log_weights = l;
    }

    fn refresh_entropy(&mut self) {
        self.entropy = if self.remaining == 0 {
            // Contradiction; the solver aborts before this is read.
            0.0
        } else {
            shannon_entropy(self.sum_weights, self.sum_weight_log_weights) + self.noise
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::{PatternTableBuilder, TileCode, WindowShape};

    fn table(frequencies: &[u32]) -> PatternTable {
        let mut builder = PatternTableBuilder::new(WindowShape::new(1, 1, 1));
        for (id, &n) in frequencies.iter().enumerate() {
            for _ in 0..n {
                builder.observe(vec![TileCode(id as i32 * 4)]).unwrap();
            }
        }
        builder.build().unwrap()
    }

    fn enablers(table: &PatternTable) -> Vec<EnablerCounts> {
        table
            .iter()
            .map(|p| Direction::ALL.map(|d| p.compatible_count(d) as u32))
            .collect()
    }

    #[test]
    fn uniform_entropy_is_log2_count() {
        let table = table(&[1, 1, 1, 1]);
        let cell = Cell::new((0, 0, 0), &table, &enablers(&table), 0.0);
        assert!((cell.entropy() - 2.0).abs() < 1e-9);
        assert!((cell.sum_of_weights() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn removal_keeps_sums_valid() {
        let table = table(&[3, 1, 1]);
        let mut cell = Cell::new((0, 0, 0), &table, &enablers(&table), 0.0);
        for id in [0, 2] {
            assert!(cell.remove(id, &table));
            assert!(cell.sum_of_weights() >= 0.0);
            assert!(cell.entropy().is_finite());
        }
        assert!(!cell.remove(0, &table));
        assert_eq!(cell.remaining(), 1);
        // A single admissible pattern has zero entropy.
        assert!(cell.entropy().abs() < 1e-9);
    }

    #[test]
    fn collapse_returns_other_patterns() {
        let table = table(&[1, 2, 1]);
        let mut cell = Cell::new((1, 0, 0), &table, &enablers(&table), 0.0);
        let removed = cell.collapse_to(1, &table);
        assert_eq!(removed, vec![0, 2]);
        assert!(cell.is_collapsed());
        assert_eq!(cell.collapsed_pattern(), Some(1));
        assert_eq!(cell.possible_patterns().collect::<Vec<_>>(), vec![1]);
        assert!(cell.entropy().is_infinite());
    }

    #[test]
    fn enabler_counts_saturate() {
        let table = table(&[1, 1]);
        let mut cell = Cell::new((0, 0, 0), &table, &enablers(&table), 0.0);
        // 1x1x1 windows: everything compatible everywhere.
        assert_eq!(cell.enabler_count(0, Direction::PosX), 2);
        assert_eq!(cell.decrement_enabler(0, Direction::PosX), 1);
        assert_eq!(cell.decrement_enabler(0, Direction::PosX), 0);
        assert_eq!(cell.decrement_enabler(0, Direction::PosX), 0);
    }
}
