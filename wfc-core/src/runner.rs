use crate::cell::{Cell, EnablerCounts};
use crate::entropy::{CpuEntropyCalculator, EntropyCalculator, ENTROPY_NOISE};
use crate::grid::Grid;
use crate::propagator::{ConstraintPropagator, CpuConstraintPropagator, PendingRemovals};
use crate::{PropagationOrder, WfcError};
use log::{debug, error, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use wfc_rules::{Direction, PatternId, PatternTable, TileCode};

/// Counters collected over one solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Cells collapsed by `observe`.
    pub observations: usize,
    /// Cells collapsed because their admissible set narrowed to one.
    pub auto_collapses: usize,
    /// Pending-removal entries processed.
    pub propagation_steps: usize,
}

/// Entropy-driven solver over a trained [`PatternTable`].
///
/// The table is only read; every solve allocates its own cells and pending
/// queue. The random generator is re-seeded from `seed` at the start of each
/// solve, so repeated solves with the same inputs produce the same result.
pub struct Solver<'a> {
    table: &'a PatternTable,
    order: PropagationOrder,
    seed: u64,
    entropy_calculator: Box<dyn EntropyCalculator + Send + Sync>,
    propagator: Box<dyn ConstraintPropagator + Send + Sync>,
    stats: SolveStats,
}

impl<'a> Solver<'a> {
    /// Creates a solver using the CPU entropy and propagation strategies.
    pub fn new(table: &'a PatternTable, order: PropagationOrder, seed: u64) -> Self {
        Self {
            table,
            order,
            seed,
            entropy_calculator: Box::new(CpuEntropyCalculator::new()),
            propagator: Box::new(CpuConstraintPropagator::new()),
            stats: SolveStats::default(),
        }
    }

    /// Replaces the cell selection strategy.
    #[must_use]
    pub fn with_entropy_calculator(
        mut self,
        calculator: Box<dyn EntropyCalculator + Send + Sync>,
    ) -> Self {
        self.entropy_calculator = calculator;
        self
    }

    /// Changes the seed used by subsequent solves.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
    }

    /// Seed of the next solve.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Counters of the most recent solve.
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Solves an unconstrained grid of the given dimensions.
    ///
    /// # Errors
    ///
    /// `WfcError::ConfigurationError` for empty dimensions or an empty table,
    /// `WfcError::Contradiction` when a cell runs out of patterns.
    pub fn solve(
        &mut self,
        width: usize,
        height: usize,
        depth: usize,
    ) -> Result<Grid<Cell>, WfcError> {
        self.solve_inner(width, height, depth, None)
    }

    /// Solves a grid in which some cells are fixed.
    ///
    /// `seeds` holds, per cell, the encoded tile it must show; cells set to
    /// `None` are free. Only patterns whose anchor equals the seed stay
    /// admissible at a seeded cell.
    ///
    /// # Errors
    ///
    /// As [`solve`](Self::solve); a seed no pattern can show raises
    /// `WfcError::Contradiction` at that cell.
    pub fn solve_seeded(&mut self, seeds: &Grid<Option<TileCode>>) -> Result<Grid<Cell>, WfcError> {
        self.solve_inner(seeds.width, seeds.height, seeds.depth, Some(seeds))
    }

    /// Solves and returns the collapsed pattern id of every cell.
    ///
    /// # Errors
    ///
    /// As [`solve`](Self::solve).
    pub fn generate(
        &mut self,
        width: usize,
        height: usize,
        depth: usize,
    ) -> Result<Grid<PatternId>, WfcError> {
        let cells = self.solve(width, height, depth)?;
        collapsed_patterns(&cells)
    }

    fn solve_inner(
        &mut self,
        width: usize,
        height: usize,
        depth: usize,
        seeds: Option<&Grid<Option<TileCode>>>,
    ) -> Result<Grid<Cell>, WfcError> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(WfcError::ConfigurationError(format!(
                "Output dimensions {width}x{height}x{depth} must be non-zero"
            )));
        }
        if self.table.is_empty() {
            return Err(WfcError::ConfigurationError(
                "Pattern table is empty".to_owned(),
            ));
        }
        info!(
            "Starting solve of {}x{}x{} grid over {} patterns ({:?} propagation, seed {})",
            width,
            height,
            depth,
            self.table.len(),
            self.order,
            self.seed
        );
        let start_time = Instant::now();
        self.stats = SolveStats::default();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let enablers = initial_enablers(self.table);
        let table = self.table;
        let mut cells = Grid::from_fn(width, height, depth, |x, y, z| {
            Cell::new((x, y, z), table, &enablers, rng.gen::<f64>() * ENTROPY_NOISE)
        });
        let mut pending = PendingRemovals::new(self.order);

        self.prune_unsupported(&mut cells, &enablers, &mut pending)?;
        if let Some(seeds) = seeds {
            self.apply_seeds(&mut cells, seeds, &mut pending)?;
        }
        self.propagate(&mut cells, &mut pending)?;

        let total_cells = cells.len();
        // Each observation collapses at least one cell.
        let iteration_limit = total_cells + 1;
        let mut iterations = 0;
        while let Some(index) = self.observe(&mut cells, &mut rng, &mut pending)? {
            iterations += 1;
            if iterations > iteration_limit {
                error!("Solve exceeded {} observations", iteration_limit);
                return Err(WfcError::InternalError(format!(
                    "Exceeded {iteration_limit} observations without finishing"
                )));
            }
            debug!(
                "Iter {}: observed cell {:?}, {} cells queued",
                iterations,
                cells.coords_of(index),
                pending.len()
            );
            self.propagate(&mut cells, &mut pending)?;
        }

        info!(
            "Solve finished in {:?}: {} observations, {} auto-collapses, {} propagation steps",
            start_time.elapsed(),
            self.stats.observations,
            self.stats.auto_collapses,
            self.stats.propagation_steps
        );
        Ok(cells)
    }

    /// Removes patterns that nothing supports across a face the cell has.
    ///
    /// Propagation starts from removals, so these must go up front.
    fn prune_unsupported(
        &mut self,
        cells: &mut Grid<Cell>,
        enablers: &[EnablerCounts],
        pending: &mut PendingRemovals,
    ) -> Result<(), WfcError> {
        let unsupported: Vec<Vec<PatternId>> = Direction::ALL
            .iter()
            .map(|d| {
                enablers
                    .iter()
                    .enumerate()
                    .filter(|(_, counts)| counts[d.index()] == 0)
                    .map(|(p, _)| p)
                    .collect()
            })
            .collect();
        if unsupported.iter().all(Vec::is_empty) {
            return Ok(());
        }

        let mut pruned = 0;
        for index in 0..cells.len() {
            let faces: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&d| cells.neighbor_index(index, d).is_some())
                .collect();
            let cell = cells.data.get_mut(index).ok_or_else(|| {
                WfcError::InternalError(format!("Cell index {index} out of range"))
            })?;
            let before = pruned;
            for d in faces {
                for &p in &unsupported[d.index()] {
                    if cell.remove(p, self.table) {
                        pending.push(index, p);
                        pruned += 1;
                    }
                }
            }
            if pruned == before {
                continue;
            }
            match cell.remaining() {
                0 => {
                    let (x, y, z) = cell.position;
                    error!("No pattern is supported at ({}, {}, {})", x, y, z);
                    return Err(WfcError::Contradiction(x, y, z));
                }
                1 if !cell.is_collapsed() => {
                    let last = cell.possible_patterns().next();
                    if let Some(last) = last {
                        cell.mark_collapsed(last);
                        self.stats.auto_collapses += 1;
                    }
                }
                _ => {}
            }
        }
        debug!("Pruned {} unsupported cell patterns", pruned);
        Ok(())
    }

    /// Restricts seeded cells to patterns anchored on their seed tile.
    fn apply_seeds(
        &mut self,
        cells: &mut Grid<Cell>,
        seeds: &Grid<Option<TileCode>>,
        pending: &mut PendingRemovals,
    ) -> Result<(), WfcError> {
        let mut seeded = 0;
        for (index, seed) in seeds.iter().enumerate() {
            let Some(code) = *seed else { continue };
            let cell = cells.data.get_mut(index).ok_or_else(|| {
                WfcError::InternalError(format!("Seed index {index} out of range"))
            })?;
            let rejected: Vec<PatternId> = cell
                .possible_patterns()
                .filter(|&p| self.table.get(p).map_or(true, |pattern| pattern.anchor() != code))
                .collect();
            for p in rejected {
                cell.remove(p, self.table);
                pending.push(index, p);
            }
            match cell.remaining() {
                0 => {
                    let (x, y, z) = cell.position;
                    error!(
                        "Seed tile {:?} at ({}, {}, {}) matches no pattern",
                        code.decode(),
                        x,
                        y,
                        z
                    );
                    return Err(WfcError::Contradiction(x, y, z));
                }
                1 if !cell.is_collapsed() => {
                    let last = cell.possible_patterns().next();
                    if let Some(last) = last {
                        cell.mark_collapsed(last);
                        self.stats.auto_collapses += 1;
                    }
                }
                _ => {}
            }
            seeded += 1;
        }
        debug!("Applied {} seed cells, {} cells queued", seeded, pending.len());
        Ok(())
    }

    /// Collapses the lowest-entropy cell, choosing a pattern by relative frequency.
    ///
    /// Returns the collapsed cell index, or None when every cell is collapsed.
    fn observe(
        &mut self,
        cells: &mut Grid<Cell>,
        rng: &mut StdRng,
        pending: &mut PendingRemovals,
    ) -> Result<Option<usize>, WfcError> {
        let Some((x, y, z)) = self.entropy_calculator.find_lowest_entropy(cells) else {
            return Ok(None);
        };
        let index = cells.index_of(x, y, z).ok_or_else(|| {
            WfcError::InternalError(format!("Lowest entropy cell ({x}, {y}, {z}) out of bounds"))
        })?;
        let cell = cells.data.get_mut(index).ok_or_else(|| {
            WfcError::InternalError(format!("Cell index {index} out of range"))
        })?;

        let candidates: Vec<PatternId> = cell.possible_patterns().collect();
        if candidates.is_empty() {
            return Err(WfcError::Contradiction(x, y, z));
        }
        let weights: Vec<f64> = candidates
            .iter()
            .map(|&p| self.table.get(p).map_or(0.0, |pattern| pattern.relative_frequency))
            .collect();
        let dist = WeightedIndex::new(&weights)?;
        let chosen = candidates[dist.sample(rng)];

        debug!(
            "Collapsing cell ({}, {}, {}) to pattern {} out of {}",
            x,
            y,
            z,
            chosen,
            candidates.len()
        );
        let removed = cell.collapse_to(chosen, self.table);
        pending.extend(index, removed);
        self.stats.observations += 1;
        Ok(Some(index))
    }

    fn propagate(
        &mut self,
        cells: &mut Grid<Cell>,
        pending: &mut PendingRemovals,
    ) -> Result<(), WfcError> {
        self.propagator
            .propagate(cells, pending, self.table, &mut self.stats)
            .map_err(WfcError::from)
    }
}

/// `enablers[p][d]`: number of patterns compatible with `p` in direction `d`.
pub fn initial_enablers(table: &PatternTable) -> Vec<EnablerCounts> {
    table
        .iter()
        .map(|pattern| {
            Direction::ALL.map(|d| u32::try_from(pattern.compatible_count(d)).unwrap_or(u32::MAX))
        })
        .collect()
}

/// The collapsed pattern of every cell.
///
/// # Errors
///
/// `WfcError::IncompleteCollapse` if any cell is still open.
pub fn collapsed_patterns(cells: &Grid<Cell>) -> Result<Grid<PatternId>, WfcError> {
    let mut patterns = Vec::with_capacity(cells.len());
    for cell in cells.iter() {
        let pattern = cell
            .collapsed_pattern()
            .ok_or(WfcError::IncompleteCollapse)?;
        patterns.push(pattern);
    }
    Ok(Grid {
        width: cells.width,
        height: cells.height,
        depth: cells.depth,
        data: patterns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::{PatternTableBuilder, WindowShape};

    fn code(v: i32) -> TileCode {
        TileCode(v * 4)
    }

    // Horizontal 2x1x1 windows over the repeating strip 1 2 3 1 2 3.
    fn cycle_table() -> PatternTable {
        let mut builder = PatternTableBuilder::new(WindowShape::new(2, 1, 1));
        for (a, b) in [(1, 2), (2, 3), (3, 1)] {
            builder.observe(vec![code(a), code(b)]).unwrap();
        }
        builder.build().unwrap()
    }

    #[test]
    fn strip_follows_cycle() {
        let table = cycle_table();
        let mut solver = Solver::new(&table, PropagationOrder::Fifo, 7);
        let patterns = solver.generate(6, 1, 1).unwrap();
        let anchors: Vec<i32> = patterns
            .iter()
            .map(|&p| table.get(p).unwrap().anchor().0 / 4)
            .collect();
        for pair in anchors.windows(2) {
            assert_eq!(pair[1], pair[0] % 3 + 1, "strip {anchors:?}");
        }
        let stats = solver.stats();
        assert_eq!(stats.observations, 1);
        assert_eq!(stats.auto_collapses, 5);
    }

    #[test]
    fn pattern_without_vertical_support_contradicts() {
        // Tile 1 under tile 2, never stacked on itself.
        let mut builder = PatternTableBuilder::new(WindowShape::new(1, 2, 1));
        builder.observe(vec![code(1), code(2)]).unwrap();
        let table = builder.build().unwrap();
        let mut solver = Solver::new(&table, PropagationOrder::Fifo, 0);
        assert!(matches!(
            solver.generate(2, 2, 1),
            Err(WfcError::Contradiction(0, 0, 0))
        ));
        // A single layer has no vertical faces to support.
        let flat = solver.generate(3, 1, 2).unwrap();
        assert!(flat.iter().all(|&p| p == 0));
    }

    #[test]
    fn unsupported_patterns_are_pruned_before_observing() {
        // [1 2] has nothing to its left, so only the first cell may keep it.
        let mut builder = PatternTableBuilder::new(WindowShape::new(2, 1, 1));
        builder.observe(vec![code(1), code(2)]).unwrap();
        builder.observe(vec![code(2), code(2)]).unwrap();
        let table = builder.build().unwrap();
        let mut solver = Solver::new(&table, PropagationOrder::Lifo, 5);
        let patterns = solver.generate(4, 1, 1).unwrap();
        let anchors: Vec<i32> = patterns
            .iter()
            .map(|&p| table.get(p).unwrap().anchor().0 / 4)
            .collect();
        assert_eq!(&anchors[1..], &[2, 2, 2]);
        let stats = solver.stats();
        assert_eq!(stats.auto_collapses, 3);
        assert_eq!(stats.observations, 1);
    }

    #[test]
    fn same_seed_same_result() {
        let table = cycle_table();
        let mut solver = Solver::new(&table, PropagationOrder::Lifo, 99);
        let first = solver.generate(4, 3, 2).unwrap();
        let second = solver.generate(4, 3, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_dimension_is_configuration_error() {
        let table = cycle_table();
        let mut solver = Solver::new(&table, PropagationOrder::Fifo, 0);
        assert!(matches!(
            solver.generate(0, 1, 1),
            Err(WfcError::ConfigurationError(_))
        ));
    }

    #[test]
    fn unknown_seed_contradicts() {
        let table = cycle_table();
        let mut solver = Solver::new(&table, PropagationOrder::Fifo, 0);
        let mut seeds: Grid<Option<TileCode>> = Grid::new(3, 1, 1);
        *seeds.get_mut(1, 0, 0).unwrap() = Some(code(9));
        assert!(matches!(
            solver.solve_seeded(&seeds),
            Err(WfcError::Contradiction(1, 0, 0))
        ));
    }

    #[test]
    fn seed_fixes_neighbors() {
        let table = cycle_table();
        let mut solver = Solver::new(&table, PropagationOrder::Fifo, 3);
        let mut seeds: Grid<Option<TileCode>> = Grid::new(3, 1, 1);
        *seeds.get_mut(0, 0, 0).unwrap() = Some(code(2));
        let cells = solver.solve_seeded(&seeds).unwrap();
        let anchors: Vec<i32> = collapsed_patterns(&cells)
            .unwrap()
            .iter()
            .map(|&p| table.get(p).unwrap().anchor().0 / 4)
            .collect();
        assert_eq!(anchors, vec![2, 3, 1]);
        // The seeded cell itself plus the two it forces.
        assert_eq!(solver.stats().auto_collapses, 3);
        assert_eq!(solver.stats().observations, 0);
    }
}
