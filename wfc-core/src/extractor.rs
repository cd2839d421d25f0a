//! Sliding-window pattern mining over a sample grid.

use crate::config::TrainingConfig;
use crate::grid::{Grid, SourceGrid};
use crate::{BoundaryPolicy, WfcError};
use log::{debug, info, warn};
use std::time::Instant;
use wfc_rules::{
    orient_window, Orientation, PatternTable, PatternTableBuilder, RulesError, SymmetryTable,
    TileCode, WindowShape,
};

/// Encodes every sample cell through the tile codec.
///
/// # Errors
///
/// Returns `RulesError::TileIdOutOfRange` for a tile id the codec cannot hold.
pub fn encode_sample<G: SourceGrid + ?Sized>(
    source: &G,
    symmetry: &SymmetryTable,
) -> Result<Grid<TileCode>, RulesError> {
    let (width, height, depth) = (source.width(), source.height(), source.depth());
    let mut data = Vec::with_capacity(width * height * depth);
    for z in 0..depth {
        for y in 0..height {
            for x in 0..width {
                let code = match source.tile(x, y, z) {
                    Some(tile) => TileCode::try_encode(tile, symmetry)?,
                    None => TileCode::EMPTY,
                };
                data.push(code);
            }
        }
    }
    Ok(Grid {
        width,
        height,
        depth,
        data,
    })
}

/// Window shape for a sample of the given extent.
///
/// Axes of extent 1 are flat and use a window extent of 1.
///
/// # Errors
///
/// Returns `RulesError::InvalidPatternSize` for a zero size,
/// `RulesError::EmptySample` for an empty sample and
/// `RulesError::PatternSizeExceedsExtent` when the window does not fit a non-flat axis.
pub fn window_shape(
    pattern_size: usize,
    width: usize,
    height: usize,
    depth: usize,
) -> Result<WindowShape, RulesError> {
    if pattern_size == 0 {
        return Err(RulesError::InvalidPatternSize { size: pattern_size });
    }
    if width == 0 || height == 0 || depth == 0 {
        return Err(RulesError::EmptySample);
    }
    let axis_extent = |axis: char, extent: usize| {
        if extent == 1 {
            Ok(1)
        } else if pattern_size > extent {
            Err(RulesError::PatternSizeExceedsExtent {
                axis,
                size: pattern_size,
                extent,
            })
        } else {
            Ok(pattern_size)
        }
    };
    Ok(WindowShape::new(
        axis_extent('x', width)?,
        axis_extent('y', height)?,
        axis_extent('z', depth)?,
    ))
}

/// One sample axis: its extent, window extent and boundary policy.
#[derive(Debug, Clone, Copy)]
struct Axis {
    extent: usize,
    window: usize,
    policy: BoundaryPolicy,
}

impl Axis {
    fn anchors(self) -> std::ops::Range<usize> {
        match self.policy {
            BoundaryPolicy::Periodic | BoundaryPolicy::Padded => 0..self.extent,
            BoundaryPolicy::Truncated => 0..self.extent + 1 - self.window,
        }
    }

    fn resolve(self, coord: usize) -> usize {
        match self.policy {
            BoundaryPolicy::Periodic => coord % self.extent,
            BoundaryPolicy::Padded => coord.min(self.extent - 1),
            BoundaryPolicy::Truncated => coord,
        }
    }
}

/// Mines the pattern table from `source`.
///
/// Every anchor admitted by the per-axis boundary policy contributes one
/// observation, plus one per augmented orientation.
///
/// # Errors
///
/// Returns a configuration error when the window does not fit the sample.
pub fn extract_patterns<G: SourceGrid + ?Sized>(
    source: &G,
    symmetry: &SymmetryTable,
    config: &TrainingConfig,
) -> Result<PatternTable, WfcError> {
    let start = Instant::now();
    let shape = window_shape(
        config.pattern_size,
        source.width(),
        source.height(),
        source.depth(),
    )?;
    let encoded = encode_sample(source, symmetry)?;

    let horizontal = config.horizontal_policy();
    let axes = [
        Axis {
            extent: encoded.width,
            window: shape.width,
            policy: horizontal,
        },
        Axis {
            extent: encoded.height,
            window: shape.height,
            policy: config.vertical_policy(),
        },
        Axis {
            extent: encoded.depth,
            window: shape.depth,
            policy: horizontal,
        },
    ];

    if config.enable_rotation && !shape.is_square() {
        warn!(
            "Rotation requested for non-square window {}; only half turns are used",
            shape
        );
    }
    let variants = Orientation::variants(shape, config.enable_rotation, config.enable_reflection);
    debug!(
        "Extracting {} windows with {} extra orientations, policies {:?}",
        shape,
        variants.len(),
        axes.map(|a| a.policy)
    );

    let mut builder = PatternTableBuilder::new(shape);
    for az in axes[2].anchors() {
        for ay in axes[1].anchors() {
            for ax in axes[0].anchors() {
                let window = read_window(&encoded, shape, &axes, (ax, ay, az))?;
                for &orientation in &variants {
                    builder.observe(orient_window(&window, shape, orientation, symmetry))?;
                }
                builder.observe(window)?;
            }
        }
    }

    let table = builder.build()?;
    info!(
        "Extracted {} patterns from {} observations ({}x{}x{} sample) in {:?}",
        table.len(),
        table.total_observations(),
        encoded.width,
        encoded.height,
        encoded.depth,
        start.elapsed()
    );
    Ok(table)
}

fn read_window(
    encoded: &Grid<TileCode>,
    shape: WindowShape,
    axes: &[Axis; 3],
    (ax, ay, az): (usize, usize, usize),
) -> Result<Vec<TileCode>, WfcError> {
    let mut cells = Vec::with_capacity(shape.len());
    for dz in 0..shape.depth {
        for dy in 0..shape.height {
            for dx in 0..shape.width {
                let x = axes[0].resolve(ax + dx);
                let y = axes[1].resolve(ay + dy);
                let z = axes[2].resolve(az + dz);
                let code = encoded.get(x, y, z).copied().ok_or_else(|| {
                    WfcError::InternalError(format!(
                        "Window cell ({x}, {y}, {z}) outside the sample"
                    ))
                })?;
                cells.push(code);
            }
        }
    }
    Ok(cells)
}
