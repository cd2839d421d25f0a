use crate::codec::MAX_TILE_ID;
use crate::RulesError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Represents a unique identifier for a tile in the tile catalog.
///
/// Id 0 is reserved as the "empty" sentinel used by partial grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileId(pub u32);

impl TileId {
    /// The sentinel id marking a cell that should be filled in by the solver.
    pub const EMPTY: Self = Self(0);

    /// Returns true for the empty sentinel.
    pub fn is_empty(self) -> bool {
        self == Self::EMPTY
    }
}

/// A placed tile: catalog id plus orientation.
///
/// An orientation `(reflected, rotation)` means the base image is first mirrored
/// across the x axis (when `reflected`) and then turned `rotation` quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tile {
    /// Catalog id.
    pub id: TileId,
    /// Quarter turns, in `0..4` when built through [`Tile::new`].
    pub rotation: u8,
    /// Mirrored across the x axis before rotating.
    pub reflected: bool,
}

impl Tile {
    /// Creates a tile, wrapping `rotation` into `0..4`.
    pub fn new(id: TileId, rotation: u8, reflected: bool) -> Self {
        Self {
            id,
            rotation: rotation % 4,
            reflected,
        }
    }

    /// A tile in its base orientation.
    pub fn plain(id: u32) -> Self {
        Self::new(TileId(id), 0, false)
    }

    /// The empty sentinel tile.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns this tile turned by `quarter_turns` additional quarter turns.
    #[must_use]
    pub fn rotated(self, quarter_turns: u8) -> Self {
        Self::new(self.id, self.rotation % 4 + quarter_turns % 4, self.reflected)
    }

    /// Returns this tile mirrored across the x axis.
    ///
    /// Mirroring after `r` quarter turns equals mirroring first and turning `-r`.
    #[must_use]
    pub fn mirrored(self) -> Self {
        Self::new(self.id, (4 - self.rotation % 4) % 4, !self.reflected)
    }
}

/// Rotational/reflective self-similarity class of a tile image.
///
/// Parsing accepts the conventional single-letter names (`X`, `I`, `\`, `T`,
/// `L`, `F`) as well as the long names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SymmetryClass {
    /// No symmetry: all eight orientations are distinct.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "F", alias = "none"))]
    None,
    /// Invariant under every rotation and reflection.
    #[cfg_attr(feature = "serde", serde(alias = "X", alias = "full"))]
    Full,
    /// Straight-line symmetry: half turns and mirroring leave it unchanged.
    #[cfg_attr(feature = "serde", serde(alias = "I", alias = "axis"))]
    Axis,
    /// Diagonal symmetry: half turns leave it unchanged, mirroring equals a quarter turn.
    #[cfg_attr(feature = "serde", serde(alias = "\\", alias = "diagonal"))]
    Diagonal,
    /// Mirroring leaves it unchanged; the four rotations are distinct.
    #[cfg_attr(feature = "serde", serde(alias = "t"))]
    T,
    /// Mirroring equals a quarter turn; the four rotations are distinct.
    #[cfg_attr(feature = "serde", serde(alias = "l"))]
    L,
}

impl SymmetryClass {
    /// Number of physically distinct orientations of a tile of this class.
    pub fn orientation_count(self) -> usize {
        match self {
            Self::None => 8,
            Self::T | Self::L => 4,
            Self::Axis | Self::Diagonal => 2,
            Self::Full => 1,
        }
    }

    /// Reduces an orientation to its canonical `(index, reflected)` pair.
    ///
    /// Only the asymmetric class keeps the reflection flag.
    pub fn reduce(self, rotation: u8, reflected: bool) -> (u8, bool) {
        let r = rotation % 4;
        let f = u8::from(reflected);
        match self {
            Self::None => (r, reflected),
            Self::Full => (0, false),
            Self::Axis => (r % 2, false),
            Self::Diagonal => ((r + f) % 2, false),
            Self::T => (r, false),
            Self::L => ((r + f) % 4, false),
        }
    }
}

impl fmt::Display for SymmetryClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::None => "F",
            Self::Full => "X",
            Self::Axis => "I",
            Self::Diagonal => "\\",
            Self::T => "T",
            Self::L => "L",
        };
        f.write_str(letter)
    }
}

impl FromStr for SymmetryClass {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" | "None" | "none" => Ok(Self::None),
            "X" | "Full" | "full" => Ok(Self::Full),
            "I" | "Axis" | "axis" => Ok(Self::Axis),
            "\\" | "Diagonal" | "diagonal" => Ok(Self::Diagonal),
            "T" | "t" => Ok(Self::T),
            "L" | "l" => Ok(Self::L),
            other => Err(RulesError::UnknownSymmetry(other.to_owned())),
        }
    }
}

/// Maps tile ids to their symmetry class, as supplied by a tile catalog.
///
/// Ids missing from the table are treated as asymmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetryTable {
    classes: HashMap<TileId, SymmetryClass>,
}

impl SymmetryTable {
    /// Creates a table from an id → class mapping.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::EmptyCatalog` if `classes` is empty and
    /// `RulesError::TileIdOutOfRange` for ids above [`MAX_TILE_ID`].
    pub fn new(classes: HashMap<TileId, SymmetryClass>) -> Result<Self, RulesError> {
        if classes.is_empty() {
            return Err(RulesError::EmptyCatalog);
        }
        if let Some(id) = classes.keys().find(|id| id.0 > MAX_TILE_ID) {
            return Err(RulesError::TileIdOutOfRange { id: id.0 });
        }
        Ok(Self { classes })
    }

    /// Creates a table from `(id, class)` pairs; later duplicates win.
    ///
    /// # Errors
    ///
    /// Returns `RulesError::EmptyCatalog` if no pairs are given.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, RulesError>
    where
        I: IntoIterator<Item = (TileId, SymmetryClass)>,
    {
        Self::new(pairs.into_iter().collect())
    }

    /// Looks up the class of `id`, defaulting to `SymmetryClass::None`.
    pub fn class_of(&self, id: TileId) -> SymmetryClass {
        self.classes.get(&id).copied().unwrap_or_default()
    }

    /// Number of catalogued tiles.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false for a constructed table.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
