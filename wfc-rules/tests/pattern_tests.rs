use wfc_rules::{
    orient_window, Direction, Orientation, PatternTableBuilder, RulesError, SymmetryClass,
    SymmetryTable, Tile, TileCode, TileId, WindowShape,
};

fn catalog() -> SymmetryTable {
    SymmetryTable::from_pairs([
        (TileId(1), SymmetryClass::Full),
        (TileId(2), SymmetryClass::L),
    ])
    .unwrap()
}

fn code(id: u32, rotation: u8) -> TileCode {
    TileCode::encode(Tile::new(TileId(id), rotation, false), &catalog())
}

#[test]
fn test_builder_counts_and_statistics() {
    let mut builder = PatternTableBuilder::new(WindowShape::new(2, 1, 1));
    let a = vec![code(1, 0), code(2, 0)];
    let b = vec![code(2, 0), code(1, 0)];
    assert_eq!(builder.observe(a.clone()).unwrap(), 0);
    assert_eq!(builder.observe(b.clone()).unwrap(), 1);
    assert_eq!(builder.observe(a.clone()).unwrap(), 0);
    assert_eq!(builder.total_observations(), 3);

    let table = builder.build().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.find(&a), Some(0));
    let first = table.get(0).unwrap();
    assert_eq!(first.frequency, 2);
    assert!((first.relative_frequency - 2.0 / 3.0).abs() < 1e-12);
    assert!((first.relative_frequency_log2 - (2.0_f64 / 3.0).log2()).abs() < 1e-12);
    assert!(
        (first.freq_times_freq_log2 - first.relative_frequency * first.relative_frequency_log2)
            .abs()
            < 1e-12
    );
}

#[test]
fn test_compatibility_along_shared_column() {
    let mut builder = PatternTableBuilder::new(WindowShape::new(2, 1, 1));
    builder.observe(vec![code(1, 0), code(2, 0)]).unwrap();
    builder.observe(vec![code(2, 0), code(1, 0)]).unwrap();
    builder.observe(vec![code(2, 0), code(2, 0)]).unwrap();
    let table = builder.build().unwrap();

    // [1 2] may be followed by anything starting with 2.
    assert!(table.check(0, 1, Direction::PosX));
    assert!(table.check(0, 2, Direction::PosX));
    assert!(!table.check(0, 0, Direction::PosX));
    // Height and depth are 1, so there is nothing to disagree on.
    for dir in [Direction::PosY, Direction::NegY, Direction::PosZ, Direction::NegZ] {
        assert_eq!(table.get(0).unwrap().compatible_count(dir), 3);
    }
}

#[test]
fn test_anchor_lookup() {
    let mut builder = PatternTableBuilder::new(WindowShape::new(2, 1, 1));
    builder.observe(vec![code(1, 0), code(2, 0)]).unwrap();
    builder.observe(vec![code(2, 1), code(1, 0)]).unwrap();
    builder.observe(vec![code(1, 0), code(1, 0)]).unwrap();
    let table = builder.build().unwrap();
    assert_eq!(table.with_anchor(code(1, 0)).collect::<Vec<_>>(), vec![0, 2]);
    assert_eq!(table.with_anchor(code(2, 1)).collect::<Vec<_>>(), vec![1]);
    assert_eq!(table.with_anchor(code(2, 0)).count(), 0);
}

#[test]
fn test_summary_reports_every_pattern() {
    let mut builder = PatternTableBuilder::new(WindowShape::new(1, 1, 2));
    builder.observe(vec![code(1, 0), code(2, 3)]).unwrap();
    builder.observe(vec![code(2, 3), code(1, 0)]).unwrap();
    let summary = builder.build().unwrap().summary();
    assert_eq!(summary.pattern_count, 2);
    assert_eq!(summary.total_observations, 2);
    assert_eq!(summary.entries[1].anchor, code(2, 3));
    let text = summary.to_string();
    assert!(text.starts_with("2 patterns"));
    assert!(text.contains("anchor 2r3"));
}

#[test]
fn test_empty_builder_fails() {
    let builder = PatternTableBuilder::new(WindowShape::new(2, 2, 2));
    assert_eq!(builder.build().unwrap_err(), RulesError::EmptySample);
}

#[test]
fn test_rotated_window_tiles_are_reoriented() {
    let shape = WindowShape::new(2, 1, 2);
    // L tile in the corner, full tiles elsewhere.
    let window = vec![code(2, 0), code(1, 0), code(1, 0), code(1, 0)];
    let turned = orient_window(&window, shape, Orientation::new(1, false), &catalog());
    let l_tiles: Vec<Tile> = turned
        .iter()
        .map(|c| c.decode())
        .filter(|t| t.id == TileId(2))
        .collect();
    assert_eq!(l_tiles, vec![Tile::new(TileId(2), 1, false)]);
    assert_eq!(turned.iter().filter(|c| **c == code(1, 0)).count(), 3);
}

#[test]
fn test_symmetry_names_parse() {
    for (name, class) in [
        ("X", SymmetryClass::Full),
        ("I", SymmetryClass::Axis),
        ("\\", SymmetryClass::Diagonal),
        ("T", SymmetryClass::T),
        ("L", SymmetryClass::L),
        ("F", SymmetryClass::None),
    ] {
        assert_eq!(name.parse::<SymmetryClass>().unwrap(), class);
    }
    assert!(matches!(
        "Q".parse::<SymmetryClass>(),
        Err(RulesError::UnknownSymmetry(_))
    ));
}
