use crate::codec::TileCode;
use crate::pattern::WindowShape;
use crate::types::SymmetryTable;

/// A rotation about the vertical axis optionally preceded by a mirror across x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Orientation {
    /// Quarter turns about y, in `0..4`.
    pub quarter_turns: u8,
    /// Mirror across x before turning.
    pub mirrored: bool,
}

impl Orientation {
    /// Leaves a window unchanged.
    pub const IDENTITY: Self = Self {
        quarter_turns: 0,
        mirrored: false,
    };

    /// Creates an orientation, wrapping `quarter_turns` into `0..4`.
    pub fn new(quarter_turns: u8, mirrored: bool) -> Self {
        Self {
            quarter_turns: quarter_turns % 4,
            mirrored,
        }
    }

    /// The non-identity orientations selected by the augmentation flags.
    ///
    /// Quarter turns are only offered for square windows; a non-square window
    /// falls back to the half turn.
    pub fn variants(shape: WindowShape, rotation: bool, reflection: bool) -> Vec<Self> {
        let turns: &[u8] = match (rotation, shape.is_square()) {
            (false, _) => &[0],
            (true, true) => &[0, 1, 2, 3],
            (true, false) => &[0, 2],
        };
        let mirrors: &[bool] = if reflection { &[false, true] } else { &[false] };
        mirrors
            .iter()
            .flat_map(|&mirrored| turns.iter().map(move |&t| Self::new(t, mirrored)))
            .filter(|o| *o != Self::IDENTITY)
            .collect()
    }
}

/// Re-orients a window and every tile inside it.
///
/// The window content is first mirrored across x (when requested) and then
/// turned about y; each contained tile is transformed the same way and
/// re-canonicalized. Odd quarter turns require a square x-z footprint and are
/// applied as half turns otherwise.
pub fn orient_window(
    cells: &[TileCode],
    shape: WindowShape,
    orientation: Orientation,
    symmetry: &SymmetryTable,
) -> Vec<TileCode> {
    let mut current = cells.to_vec();
    if orientation.mirrored {
        current = mirror_x(&current, shape);
    }
    match orientation.quarter_turns % 4 {
        0 => {}
        turns if shape.is_square() => {
            for _ in 0..turns {
                current = quarter_turn(&current, shape);
            }
        }
        _ => current = half_turn(&current, shape),
    }
    let tile_turns = if shape.is_square() {
        orientation.quarter_turns % 4
    } else if orientation.quarter_turns % 4 == 0 {
        0
    } else {
        2
    };
    current
        .into_iter()
        .map(|code| code.transformed(tile_turns, orientation.mirrored, symmetry))
        .collect()
}

fn mirror_x(cells: &[TileCode], shape: WindowShape) -> Vec<TileCode> {
    remap(shape, |x, y, z| cells[shape.index(shape.width - 1 - x, y, z)])
}

fn half_turn(cells: &[TileCode], shape: WindowShape) -> Vec<TileCode> {
    remap(shape, |x, y, z| {
        cells[shape.index(shape.width - 1 - x, y, shape.depth - 1 - z)]
    })
}

// Moves the cell at (x, z) to (n - 1 - z, x).
fn quarter_turn(cells: &[TileCode], shape: WindowShape) -> Vec<TileCode> {
    let n = shape.width;
    remap(shape, |x, y, z| cells[shape.index(z, y, n - 1 - x)])
}

fn remap(shape: WindowShape, mut source: impl FnMut(usize, usize, usize) -> TileCode) -> Vec<TileCode> {
    let mut out = Vec::with_capacity(shape.len());
    for z in 0..shape.depth {
        for y in 0..shape.height {
            for x in 0..shape.width {
                out.push(source(x, y, z));
            }
        }
    }
    out
}
