use wfc_rules::{Direction, Tile};

/// Dense 3-D array addressed by `(x, y, z)` with x fastest, then y, then z.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    /// Extent along x.
    pub width: usize,
    /// Extent along y.
    pub height: usize,
    /// Extent along z.
    pub depth: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        let size = width * height * depth;
        let data = vec![T::default(); size];
        Self {
            width,
            height,
            depth,
            data,
        }
    }
}

impl<T> Grid<T> {
    /// Creates a grid by evaluating `f` at every coordinate in storage order.
    pub fn from_fn(
        width: usize,
        height: usize,
        depth: usize,
        mut f: impl FnMut(usize, usize, usize) -> T,
    ) -> Self {
        let mut data = Vec::with_capacity(width * height * depth);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    data.push(f(x, y, z));
                }
            }
        }
        Self {
            width,
            height,
            depth,
            data,
        }
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        self.index_of(x, y, z).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> Option<&mut T> {
        self.index_of(x, y, z)
            .and_then(move |idx| self.data.get_mut(idx))
    }

    /// Calculates the 1D index for the given 3D coordinates.
    /// Returns None if the coordinates are out of bounds.
    pub fn index_of(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        if x < self.width && y < self.height && z < self.depth {
            Some(z * self.width * self.height + y * self.width + x)
        } else {
            None
        }
    }

    /// Inverse of [`index_of`](Self::index_of).
    pub fn coords_of(&self, index: usize) -> (usize, usize, usize) {
        let layer = self.width * self.height;
        let z = index / layer;
        let rest = index % layer;
        (rest % self.width, rest / self.width, z)
    }

    /// Index of the in-bounds neighbour of `index` in `direction`, if any.
    pub fn neighbor_index(&self, index: usize, direction: Direction) -> Option<usize> {
        let (x, y, z) = self.coords_of(index);
        let (dx, dy, dz) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        let nz = z.checked_add_signed(dz)?;
        self.index_of(nx, ny, nz)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when any extent is zero.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Elements in storage order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// Same dimensions, each element mapped through `f`.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Grid<U> {
        Grid {
            width: self.width,
            height: self.height,
            depth: self.depth,
            data: self.data.iter().map(f).collect(),
        }
    }
}

/// A tile grid supplied by an editing surface.
pub trait SourceGrid {
    /// Extent along x.
    fn width(&self) -> usize;
    /// Extent along y.
    fn height(&self) -> usize;
    /// Extent along z.
    fn depth(&self) -> usize;
    /// The tile at `(x, y, z)`, or None when out of bounds.
    fn tile(&self, x: usize, y: usize, z: usize) -> Option<Tile>;
    /// Replaces the tile at `(x, y, z)`; returns false when out of bounds.
    fn set_tile(&mut self, x: usize, y: usize, z: usize, tile: Tile) -> bool;
}

/// Grid of placed tiles: the sample, partial and output grid type.
pub type TileGrid = Grid<Tile>;

impl SourceGrid for TileGrid {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn tile(&self, x: usize, y: usize, z: usize) -> Option<Tile> {
        self.get(x, y, z).copied()
    }

    fn set_tile(&mut self, x: usize, y: usize, z: usize, tile: Tile) -> bool {
        self.get_mut(x, y, z).map(|cell| *cell = tile).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_round_trip() {
        let grid: Grid<u8> = Grid::new(3, 4, 5);
        for index in 0..grid.len() {
            let (x, y, z) = grid.coords_of(index);
            assert_eq!(grid.index_of(x, y, z), Some(index));
        }
    }

    #[test]
    fn neighbor_index_respects_bounds() {
        let grid: Grid<u8> = Grid::new(2, 1, 2);
        let origin = grid.index_of(0, 0, 0).unwrap();
        assert_eq!(grid.neighbor_index(origin, Direction::PosX), Some(1));
        assert_eq!(grid.neighbor_index(origin, Direction::NegX), None);
        assert_eq!(grid.neighbor_index(origin, Direction::PosY), None);
        assert_eq!(grid.neighbor_index(origin, Direction::PosZ), Some(2));
    }

    #[test]
    fn tile_grid_source_access() {
        let mut grid = TileGrid::new(2, 2, 1);
        assert!(grid.set_tile(1, 1, 0, Tile::plain(4)));
        assert!(!grid.set_tile(2, 0, 0, Tile::plain(4)));
        assert_eq!(grid.tile(1, 1, 0), Some(Tile::plain(4)));
        assert_eq!(grid.tile(0, 0, 0), Some(Tile::empty()));
        assert_eq!(SourceGrid::width(&grid), 2);
    }
}
