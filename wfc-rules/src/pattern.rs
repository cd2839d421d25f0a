use crate::codec::TileCode;
use bitvec::prelude::*;
use std::collections::HashMap;
use std::fmt;

/// Index of a pattern in its [`PatternTable`].
pub type PatternId = usize;

/// One of the six axis-aligned neighbour directions.
///
/// The discriminants follow the usual axis numbering
/// (0:+X, 1:-X, 2:+Y, 3:-Y, 4:+Z, 5:-Z). Y is the vertical axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// +x
    PosX = 0,
    /// -x
    NegX = 1,
    /// +y, upwards
    PosY = 2,
    /// -y
    NegY = 3,
    /// +z
    PosZ = 4,
    /// -z
    NegZ = 5,
}

impl Direction {
    /// Number of directions.
    pub const COUNT: usize = 6;

    /// All directions in axis order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// The four directions lying in the horizontal (x-z) plane.
    pub const HORIZONTAL: [Self; 4] = [Self::PosX, Self::NegX, Self::PosZ, Self::NegZ];

    /// Position in [`Direction::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The direction pointing back.
    pub const fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Unit offset `(dx, dy, dz)`.
    pub const fn offset(self) -> (isize, isize, isize) {
        match self {
            Self::PosX => (1, 0, 0),
            Self::NegX => (-1, 0, 0),
            Self::PosY => (0, 1, 0),
            Self::NegY => (0, -1, 0),
            Self::PosZ => (0, 0, 1),
            Self::NegZ => (0, 0, -1),
        }
    }

    /// True for the four x-z directions.
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Self::PosY | Self::NegY)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PosX => "+x",
            Self::NegX => "-x",
            Self::PosY => "+y",
            Self::NegY => "-y",
            Self::PosZ => "+z",
            Self::NegZ => "-z",
        };
        f.write_str(name)
    }
}

/// Extent of a pattern window along each axis.
///
/// Window cells are stored x fastest, then y, then z; index 0 is the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowShape {
    /// Extent along x.
    pub width: usize,
    /// Extent along y.
    pub height: usize,
    /// Extent along z.
    pub depth: usize,
}

impl WindowShape {
    /// Creates a shape from its three extents.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Number of cells in the window.
    pub fn len(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// True when any extent is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of a local cell; the caller keeps coordinates in range.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        z * self.width * self.height + y * self.width + x
    }

    /// Whether quarter turns about the vertical axis preserve the shape.
    pub fn is_square(&self) -> bool {
        self.width == self.depth
    }
}

impl fmt::Display for WindowShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.depth)
    }
}

/// A tile window observed during training.
///
/// Immutable once the table is built; identity is the content of `cells`.
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Index in the owning table.
    pub id: PatternId,
    /// Encoded tiles spanning the window, in [`WindowShape`] order.
    pub cells: Vec<TileCode>,
    /// Number of observations (including augmented variants).
    pub frequency: u32,
    /// `frequency` over the table's total observations.
    pub relative_frequency: f64,
    /// `log2(relative_frequency)`.
    pub relative_frequency_log2: f64,
    /// `relative_frequency * relative_frequency_log2`, summed for entropy.
    pub freq_times_freq_log2: f64,
    pub(crate) compatibility: [BitVec; Direction::COUNT],
}

impl Pattern {
    /// The anchor-corner tile, used when decoding a collapsed cell.
    pub fn anchor(&self) -> TileCode {
        self.cells.first().copied().unwrap_or_default()
    }

    /// Bitset over pattern ids that may sit next to this pattern in `direction`.
    pub fn compatible(&self, direction: Direction) -> &BitSlice {
        &self.compatibility[direction.index()]
    }

    /// Whether `other` may be placed one step away in `direction`.
    pub fn is_compatible(&self, other: PatternId, direction: Direction) -> bool {
        self.compatible(direction)
            .get(other)
            .map_or(false, |bit| *bit)
    }

    /// Number of patterns compatible in `direction`.
    pub fn compatible_count(&self, direction: Direction) -> usize {
        self.compatible(direction).count_ones()
    }
}

/// Arena of patterns with a content index and embedded compatibility sets.
///
/// Built once per training call and shared read-only across solves.
#[derive(Debug, Clone)]
pub struct PatternTable {
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) index: HashMap<Vec<TileCode>, PatternId>,
    pub(crate) shape: WindowShape,
    pub(crate) total_observations: u64,
}

impl PatternTable {
    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no pattern was recorded.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern with the given id, if any.
    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id)
    }

    /// All patterns, indexed by id.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Iterates patterns in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Looks a pattern up by window content.
    pub fn find(&self, cells: &[TileCode]) -> Option<PatternId> {
        self.index.get(cells).copied()
    }

    /// Window shape shared by every pattern.
    pub fn shape(&self) -> WindowShape {
        self.shape
    }

    /// Total window observations taken, augmented variants included.
    pub fn total_observations(&self) -> u64 {
        self.total_observations
    }

    /// Ids of patterns whose anchor equals `code`.
    pub fn with_anchor(&self, code: TileCode) -> impl Iterator<Item = PatternId> + '_ {
        self.patterns
            .iter()
            .filter(move |p| p.anchor() == code)
            .map(|p| p.id)
    }

    /// Whether `b` may sit one step from `a` in `direction`.
    pub fn check(&self, a: PatternId, b: PatternId, direction: Direction) -> bool {
        self.get(a)
            .map_or(false, |pattern| pattern.is_compatible(b, direction))
    }

    /// Diagnostic snapshot of the table.
    pub fn summary(&self) -> PatternSummary {
        PatternSummary {
            pattern_count: self.len(),
            total_observations: self.total_observations,
            shape: self.shape,
            entries: self
                .patterns
                .iter()
                .map(|p| PatternSummaryEntry {
                    id: p.id,
                    anchor: p.anchor(),
                    frequency: p.frequency,
                    relative_frequency: p.relative_frequency,
                    compatible_counts: Direction::ALL.map(|d| p.compatible_count(d)),
                })
                .collect(),
        }
    }
}

/// Per-pattern line of a [`PatternSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSummaryEntry {
    /// Pattern id.
    pub id: PatternId,
    /// Anchor tile code.
    pub anchor: TileCode,
    /// Observation count.
    pub frequency: u32,
    /// Share of all observations.
    pub relative_frequency: f64,
    /// Compatible pattern count per direction, in [`Direction::ALL`] order.
    pub compatible_counts: [usize; Direction::COUNT],
}

/// Diagnostic introspection of a trained table.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternSummary {
    /// Number of distinct patterns.
    pub pattern_count: usize,
    /// Total window observations.
    pub total_observations: u64,
    /// Window shape.
    pub shape: WindowShape,
    /// One entry per pattern, in id order.
    pub entries: Vec<PatternSummaryEntry>,
}

impl fmt::Display for PatternSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} patterns ({} window) from {} observations",
            self.pattern_count, self.shape, self.total_observations
        )?;
        for entry in &self.entries {
            let tile = entry.anchor.decode();
            writeln!(
                f,
                "  #{:<4} anchor {}r{}{} freq {:>5} ({:.4}) compat {:?}",
                entry.id,
                tile.id.0,
                tile.rotation,
                if tile.reflected { "m" } else { "" },
                entry.frequency,
                entry.relative_frequency,
                entry.compatible_counts
            )?;
        }
        Ok(())
    }
}
