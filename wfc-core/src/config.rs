use crate::{BoundaryPolicy, PropagationOrder};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Training and solving options for an [`OverlappingModel`](crate::OverlappingModel).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrainingConfig {
    /// Window extent along every non-flat axis.
    pub pattern_size: usize,
    /// Also observe windows mirrored across x.
    pub enable_reflection: bool,
    /// Also observe windows turned about the vertical axis.
    pub enable_rotation: bool,
    /// Pad non-periodic axes by edge replication instead of truncating.
    pub sandwich_patterns: bool,
    /// Wrap the sample along x and z.
    pub horizontal_periodic: bool,
    /// Wrap the sample along y.
    pub vertical_periodic: bool,
    /// Order in which pending removals drain.
    pub propagation_order: PropagationOrder,
    /// Seed for the solver's random generator.
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            pattern_size: 2,
            enable_reflection: false,
            enable_rotation: false,
            sandwich_patterns: true,
            horizontal_periodic: false,
            vertical_periodic: false,
            propagation_order: PropagationOrder::Fifo,
            seed: 0,
        }
    }
}

impl TrainingConfig {
    /// Creates a new builder for `TrainingConfig`.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Boundary policy used for the horizontal axes (x and z).
    pub fn horizontal_policy(&self) -> BoundaryPolicy {
        BoundaryPolicy::select(self.horizontal_periodic, self.sandwich_patterns)
    }

    /// Boundary policy used for the vertical axis (y).
    pub fn vertical_policy(&self) -> BoundaryPolicy {
        BoundaryPolicy::select(self.vertical_periodic, self.sandwich_patterns)
    }
}

/// Builder for `TrainingConfig`.
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Sets the window extent.
    pub fn pattern_size(mut self, size: usize) -> Self {
        self.config.pattern_size = size;
        self
    }

    /// Toggles mirrored windows.
    pub fn enable_reflection(mut self, enabled: bool) -> Self {
        self.config.enable_reflection = enabled;
        self
    }

    /// Toggles rotated windows.
    pub fn enable_rotation(mut self, enabled: bool) -> Self {
        self.config.enable_rotation = enabled;
        self
    }

    /// Toggles edge padding on non-periodic axes.
    pub fn sandwich_patterns(mut self, enabled: bool) -> Self {
        self.config.sandwich_patterns = enabled;
        self
    }

    /// Toggles wrapping along x and z.
    pub fn horizontal_periodic(mut self, enabled: bool) -> Self {
        self.config.horizontal_periodic = enabled;
        self
    }

    /// Toggles wrapping along y.
    pub fn vertical_periodic(mut self, enabled: bool) -> Self {
        self.config.vertical_periodic = enabled;
        self
    }

    /// Sets the propagation order.
    pub fn propagation_order(mut self, order: PropagationOrder) -> Self {
        self.config.propagation_order = order;
        self
    }

    /// Sets the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Finishes the configuration.
    pub fn build(self) -> TrainingConfig {
        self.config
    }
}
