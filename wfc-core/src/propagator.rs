//! Constraint propagation logic and traits.

use crate::cell::Cell;
use crate::grid::Grid;
use crate::runner::SolveStats;
use crate::PropagationOrder;
use log::{debug, error};
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use thiserror::Error;
use wfc_rules::{Direction, PatternId, PatternTable};

/// Errors that can occur during the constraint propagation phase of WFC.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropagationError {
    /// A cell's admissible set became empty.
    /// Contains the (x, y, z) coordinates of the contradictory cell.
    #[error("Contradiction detected during propagation at ({0}, {1}, {2})")]
    Contradiction(usize, usize, usize),
    /// An internal error within the propagation logic.
    #[error("Internal propagation error: {0}")]
    InternalError(String),
}

/// Pending removals: cell index → pattern ids removed there but not yet propagated.
///
/// Cells are dequeued whole, earliest-inserted first (FIFO) or latest-inserted
/// first (LIFO). Removals added to a cell that is already queued join its entry.
#[derive(Debug, Clone)]
pub struct PendingRemovals {
    order: PropagationOrder,
    queue: VecDeque<usize>,
    removed: HashMap<usize, Vec<PatternId>>,
}

impl PendingRemovals {
    /// Creates an empty queue drained in `order`.
    pub fn new(order: PropagationOrder) -> Self {
        Self {
            order,
            queue: VecDeque::new(),
            removed: HashMap::new(),
        }
    }

    /// Queues the removal of `pattern` at cell `index`.
    pub fn push(&mut self, index: usize, pattern: PatternId) {
        self.extend(index, std::iter::once(pattern));
    }

    /// Queues several removals at cell `index`.
    pub fn extend(&mut self, index: usize, patterns: impl IntoIterator<Item = PatternId>) {
        let entry = self.removed.entry(index).or_insert_with(|| {
            self.queue.push_back(index);
            Vec::new()
        });
        entry.extend(patterns);
    }

    /// Takes the next cell and its removed patterns according to the queue discipline.
    pub fn pop(&mut self) -> Option<(usize, Vec<PatternId>)> {
        let index = match self.order {
            PropagationOrder::Fifo => self.queue.pop_front(),
            PropagationOrder::Lifo => self.queue.pop_back(),
        }?;
        let patterns = self.removed.remove(&index).unwrap_or_default();
        Some((index, patterns))
    }

    /// Number of queued cells.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Trait defining the interface for a constraint propagation algorithm.
///
/// Implementors drain `pending` to a fixpoint, removing unsupported patterns
/// from neighbouring cells and queueing those removals in turn.
pub trait ConstraintPropagator: Debug {
    /// # Errors
    ///
    /// Returns `PropagationError::Contradiction` as soon as a cell's
    /// admissible set becomes empty.
    fn propagate(
        &mut self,
        cells: &mut Grid<Cell>,
        pending: &mut PendingRemovals,
        table: &PatternTable,
        stats: &mut SolveStats,
    ) -> Result<(), PropagationError>;
}

/// Enabler-counting propagator with auto-collapse of singleton cells.
#[derive(Debug, Clone, Default)]
pub struct CpuConstraintPropagator;

impl CpuConstraintPropagator {
    /// Creates the propagator.
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintPropagator for CpuConstraintPropagator {
    fn propagate(
        &mut self,
        cells: &mut Grid<Cell>,
        pending: &mut PendingRemovals,
        table: &PatternTable,
        stats: &mut SolveStats,
    ) -> Result<(), PropagationError> {
        while let Some((index, removed)) = pending.pop() {
            stats.propagation_steps += 1;
            for direction in Direction::ALL {
                let Some(neighbor_index) = cells.neighbor_index(index, direction) else {
                    continue;
                };
                let back = direction.opposite();
                let neighbor = cells.data.get_mut(neighbor_index).ok_or_else(|| {
                    PropagationError::InternalError(format!(
                        "Neighbor index {neighbor_index} out of range"
                    ))
                })?;

                // Collapsed neighbours are still checked: a seeded or
                // auto-collapsed pattern can lose its last support later.
                for &gone in &removed {
                    let pattern = table.get(gone).ok_or_else(|| {
                        PropagationError::InternalError(format!("Unknown pattern id {gone}"))
                    })?;
                    for candidate in pattern.compatible(direction).iter_ones() {
                        if !neighbor.is_possible(candidate)
                            || neighbor.decrement_enabler(candidate, back) > 0
                        {
                            continue;
                        }
                        neighbor.remove(candidate, table);
                        pending.push(neighbor_index, candidate);

                        match neighbor.remaining() {
                            0 => {
                                let (x, y, z) = neighbor.position;
                                error!("Contradiction at ({}, {}, {})", x, y, z);
                                return Err(PropagationError::Contradiction(x, y, z));
                            }
                            1 if !neighbor.is_collapsed() => {
                                let last = neighbor.possible_patterns().next().ok_or_else(|| {
                                    PropagationError::InternalError(
                                        "Singleton cell without a pattern".to_owned(),
                                    )
                                })?;
                                neighbor.mark_collapsed(last);
                                stats.auto_collapses += 1;
                                debug!(
                                    "Auto-collapsed {:?} to pattern {}",
                                    neighbor.position, last
                                );
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_pops_earliest_cell() {
        let mut pending = PendingRemovals::new(PropagationOrder::Fifo);
        pending.push(3, 1);
        pending.push(7, 2);
        pending.push(3, 4);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.pop(), Some((3, vec![1, 4])));
        assert_eq!(pending.pop(), Some((7, vec![2])));
        assert_eq!(pending.pop(), None);
    }

    #[test]
    fn lifo_pops_latest_cell() {
        let mut pending = PendingRemovals::new(PropagationOrder::Lifo);
        pending.extend(3, [1, 2]);
        pending.push(7, 5);
        assert_eq!(pending.pop(), Some((7, vec![5])));
        assert_eq!(pending.pop(), Some((3, vec![1, 2])));
        assert!(pending.is_empty());
    }

    #[test]
    fn requeue_after_pop() {
        let mut pending = PendingRemovals::new(PropagationOrder::Fifo);
        pending.push(1, 0);
        assert_eq!(pending.pop(), Some((1, vec![0])));
        pending.push(1, 2);
        assert_eq!(pending.pop(), Some((1, vec![2])));
    }
}
