use crate::error::AppError;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use wfc_core::TileGrid;
use wfc_rules::{Tile, TileId, MAX_TILE_ID};

/// Parses one cell token: `id`, `idrR` or `idrRm`; `.` is the empty tile.
pub fn parse_tile(token: &str) -> Result<Tile, String> {
    if token == "." {
        return Ok(Tile::empty());
    }
    let (body, reflected) = match token.strip_suffix('m') {
        Some(body) => (body, true),
        None => (token, false),
    };
    let (id, rotation) = match body.split_once('r') {
        Some((id, rotation)) => {
            let rotation: u8 = rotation
                .parse()
                .map_err(|_| format!("invalid rotation in '{token}'"))?;
            if rotation > 3 {
                return Err(format!("rotation {rotation} out of range in '{token}'"));
            }
            (id, rotation)
        }
        None if reflected => return Err(format!("reflection without rotation in '{token}'")),
        None => (body, 0),
    };
    let id: u32 = id
        .parse()
        .map_err(|_| format!("invalid tile id in '{token}'"))?;
    if id > MAX_TILE_ID {
        return Err(format!("tile id {id} exceeds the maximum {MAX_TILE_ID} in '{token}'"));
    }
    Ok(Tile::new(TileId(id), rotation, reflected))
}

/// Text form of one tile, the inverse of [`parse_tile`].
pub fn format_tile(tile: Tile) -> String {
    match (tile.rotation, tile.reflected) {
        (0, false) => tile.id.0.to_string(),
        (r, false) => format!("{}r{}", tile.id.0, r),
        (r, true) => format!("{}r{}m", tile.id.0, r),
    }
}

/// Parses a grid: blank-line separated y layers, one z row per line,
/// whitespace-separated x cells. `#` starts a comment line.
pub fn parse_grid(text: &str) -> Result<TileGrid, AppError> {
    let mut layers: Vec<Vec<Vec<Tile>>> = Vec::new();
    let mut current: Vec<Vec<Tile>> = Vec::new();
    let mut width = None;

    for (number, line) in text.lines().enumerate() {
        let line_no = number + 1;
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            continue;
        }
        if trimmed.is_empty() {
            if !current.is_empty() {
                layers.push(std::mem::take(&mut current));
            }
            continue;
        }
        let row = trimmed
            .split_whitespace()
            .map(parse_tile)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| AppError::Parse {
                line: line_no,
                message,
            })?;
        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(AppError::Parse {
                    line: line_no,
                    message: format!("expected {w} cells, found {}", row.len()),
                })
            }
            Some(_) => {}
        }
        current.push(row);
        if let Some(first) = layers.first() {
            if current.len() > first.len() {
                return Err(AppError::Parse {
                    line: line_no,
                    message: format!("layer has more than {} rows", first.len()),
                });
            }
        }
    }
    if !current.is_empty() {
        layers.push(current);
    }

    let (Some(width), Some(first)) = (width, layers.first()) else {
        return Err(AppError::Parse {
            line: 0,
            message: "grid is empty".to_owned(),
        });
    };
    let depth = first.len();
    if let Some(short) = layers.iter().position(|layer| layer.len() != depth) {
        return Err(AppError::Parse {
            line: 0,
            message: format!("layer {short} has {} rows, expected {depth}", layers[short].len()),
        });
    }

    let height = layers.len();
    Ok(TileGrid::from_fn(width, height, depth, |x, y, z| {
        layers[y][z][x]
    }))
}

/// Renders a grid in the format read by [`parse_grid`].
pub fn format_grid(grid: &TileGrid) -> String {
    let mut text = String::new();
    for y in 0..grid.height {
        if y > 0 {
            // Separator between y layers
            text.push('\n');
        }
        for z in 0..grid.depth {
            let row: Vec<String> = (0..grid.width)
                .filter_map(|x| grid.get(x, y, z).copied().map(format_tile))
                .collect();
            text.push_str(&row.join(" "));
            text.push('\n');
        }
    }
    text
}

/// Reads a grid file in the text format.
pub fn load_grid_from_file(path: &Path) -> Result<TileGrid> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read grid file: {:?}", path))?;
    let grid = parse_grid(&text).with_context(|| format!("Invalid grid file: {:?}", path))?;
    log::info!(
        "Loaded {}x{}x{} grid from {:?}",
        grid.width,
        grid.height,
        grid.depth,
        path
    );
    Ok(grid)
}

/// Saves a generated grid to a file in the text format.
pub fn save_grid_to_file(grid: &TileGrid, output_path: &Path) -> Result<()> {
    log::info!("Attempting to save grid to {:?}...", output_path);

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {:?}", output_path))?;
    let mut writer = io::BufWriter::new(file);
    writer
        .write_all(format_grid(grid).as_bytes())
        .with_context(|| format!("Failed to write grid to {:?}", output_path))?;
    writer
        .flush()
        .context("Failed to flush writer for output file")?;
    log::info!("Successfully saved grid to {:?}", output_path);

    Ok(())
}
