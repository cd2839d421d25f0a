use wfc_core::{Grid, SourceGrid, TileGrid};
use wfc_rules::{Direction, Tile};

#[test]
fn test_grid_new() {
    let grid: Grid<u32> = Grid::new(3, 2, 4);
    assert_eq!(grid.width, 3);
    assert_eq!(grid.height, 2);
    assert_eq!(grid.depth, 4);
    assert_eq!(grid.len(), 24);
    assert!(grid.iter().all(|&v| v == 0));
}

#[test]
fn test_grid_layout_is_x_fastest() {
    let grid = Grid::from_fn(3, 2, 2, |x, y, z| (x, y, z));
    assert_eq!(grid.index_of(1, 0, 0), Some(1));
    assert_eq!(grid.index_of(0, 1, 0), Some(3));
    assert_eq!(grid.index_of(0, 0, 1), Some(6));
    assert_eq!(grid.get(2, 1, 1), Some(&(2, 1, 1)));
    assert_eq!(grid.get(3, 0, 0), None);
}

#[test]
fn test_grid_get_mut() {
    let mut grid: Grid<u8> = Grid::new(2, 2, 2);
    *grid.get_mut(1, 1, 1).unwrap() = 9;
    assert_eq!(grid.get(1, 1, 1), Some(&9));
    assert!(grid.get_mut(2, 0, 0).is_none());
}

#[test]
fn test_neighbors_stop_at_edges() {
    let grid: Grid<u8> = Grid::new(2, 2, 2);
    let corner = grid.index_of(1, 1, 1).unwrap();
    assert_eq!(grid.neighbor_index(corner, Direction::PosX), None);
    assert_eq!(grid.neighbor_index(corner, Direction::PosY), None);
    assert_eq!(grid.neighbor_index(corner, Direction::PosZ), None);
    assert_eq!(grid.neighbor_index(corner, Direction::NegX), grid.index_of(0, 1, 1));
    assert_eq!(grid.neighbor_index(corner, Direction::NegY), grid.index_of(1, 0, 1));
    assert_eq!(grid.neighbor_index(corner, Direction::NegZ), grid.index_of(1, 1, 0));
}

#[test]
fn test_tile_grid_defaults_to_empty() {
    let grid = TileGrid::new(2, 1, 2);
    assert_eq!(grid.tile(1, 0, 1), Some(Tile::empty()));
    assert!(grid.tile(1, 0, 1).unwrap().id.is_empty());
    assert_eq!(grid.tile(0, 1, 0), None);
}

#[test]
fn test_map_keeps_shape_and_order() {
    let grid = Grid::from_fn(2, 3, 2, |x, y, z| x + 10 * y + 100 * z);
    let doubled = grid.map(|v| v * 2);
    assert_eq!((doubled.width, doubled.height, doubled.depth), (2, 3, 2));
    assert_eq!(doubled.get(1, 2, 1), Some(&422));
    assert_eq!(doubled.iter().count(), grid.len());
}
