use thiserror::Error;

use crate::constants::{PORTAL_BAND_BOTTOM, PORTAL_BAND_TOP, REFERENCE_LAYOUT, TILE_SIZE};
use crate::types::{Body, CellKind, GhostVariant, Vec2, WorldInit};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("layout has no rows")]
    Empty,
    #[error("row {row} is {found} cells wide, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown tile character {ch:?} at row {row}, column {col}")]
    UnknownCharacter { ch: char, row: usize, col: usize },
    #[error("layout has no player spawn")]
    MissingPlayerSpawn,
    #[error("duplicate spawn marker {marker:?} at row {row}, column {col}")]
    DuplicateSpawn { marker: char, row: usize, col: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostSpawn {
    pub variant: GhostVariant,
    pub position: Vec2,
}

/// Parsed, immutable board. Positions are pixel coordinates of a tile's top-left corner.
#[derive(Clone, Debug)]
pub struct Level {
    pub columns: i32,
    pub rows: i32,
    pub tile_size: i32,
    pub tiles: Vec<String>,
    pub player_spawn: Vec2,
    pub ghost_spawns: Vec<GhostSpawn>,
    pub food_cells: Vec<Vec2>,
    cells: Vec<CellKind>,
}

impl Level {
    pub fn reference() -> Result<Self, MapError> {
        parse_tile_map(&REFERENCE_LAYOUT)
    }

    pub fn width(&self) -> i32 {
        self.columns * self.tile_size
    }

    pub fn height(&self) -> i32 {
        self.rows * self.tile_size
    }

    pub fn cell(&self, col: i32, row: i32) -> Option<CellKind> {
        if col < 0 || row < 0 || col >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get((row * self.columns + col) as usize).copied()
    }

    pub fn is_wall(&self, col: i32, row: i32) -> bool {
        self.cell(col, row) == Some(CellKind::Wall)
    }

    /// True when `body` shares interior area with any wall tile.
    pub fn overlaps_wall(&self, body: &Body) -> bool {
        if body.width <= 0 || body.height <= 0 {
            return false;
        }
        let t = self.tile_size;
        let first_col = body.x.div_euclid(t);
        let last_col = (body.right() - 1).div_euclid(t);
        let first_row = body.y.div_euclid(t);
        let last_row = (body.bottom() - 1).div_euclid(t);
        (first_row..=last_row)
            .any(|row| (first_col..=last_col).any(|col| self.is_wall(col, row)))
    }

    pub fn contains(&self, body: &Body) -> bool {
        body.x >= 0 && body.y >= 0 && body.right() <= self.width() && body.bottom() <= self.height()
    }

    pub fn in_portal_band(&self, y: i32) -> bool {
        (PORTAL_BAND_TOP..=PORTAL_BAND_BOTTOM).contains(&y)
    }
}

pub fn parse_tile_map<S: AsRef<str>>(rows: &[S]) -> Result<Level, MapError> {
    let Some(first) = rows.first() else {
        return Err(MapError::Empty);
    };
    let expected = first.as_ref().chars().count();
    if expected == 0 {
        return Err(MapError::Empty);
    }

    let mut cells = Vec::with_capacity(expected * rows.len());
    let mut player_spawn = None;
    let mut ghost_spawns: Vec<GhostSpawn> = Vec::new();
    let mut food_cells = Vec::new();

    for (row, line) in rows.iter().enumerate() {
        let line = line.as_ref();
        let found = line.chars().count();
        if found != expected {
            return Err(MapError::RaggedRow {
                row,
                found,
                expected,
            });
        }
        for (col, ch) in line.chars().enumerate() {
            let position = Vec2 {
                x: col as i32 * TILE_SIZE,
                y: row as i32 * TILE_SIZE,
            };
            let kind = match ch {
                'X' => CellKind::Wall,
                'O' => CellKind::PortalOpen,
                ' ' => {
                    food_cells.push(position);
                    CellKind::Open
                }
                'P' => {
                    if player_spawn.is_some() {
                        return Err(MapError::DuplicateSpawn {
                            marker: ch,
                            row,
                            col,
                        });
                    }
                    player_spawn = Some(position);
                    food_cells.push(position);
                    CellKind::Open
                }
                _ => {
                    let variant = GhostVariant::from_marker(ch)
                        .ok_or(MapError::UnknownCharacter { ch, row, col })?;
                    if ghost_spawns.iter().any(|spawn| spawn.variant == variant) {
                        return Err(MapError::DuplicateSpawn {
                            marker: ch,
                            row,
                            col,
                        });
                    }
                    ghost_spawns.push(GhostSpawn { variant, position });
                    CellKind::Open
                }
            };
            cells.push(kind);
        }
    }

    let player_spawn = player_spawn.ok_or(MapError::MissingPlayerSpawn)?;
    Ok(Level {
        columns: expected as i32,
        rows: rows.len() as i32,
        tile_size: TILE_SIZE,
        tiles: rows.iter().map(|row| row.as_ref().to_string()).collect(),
        player_spawn,
        ghost_spawns,
        food_cells,
        cells,
    })
}

pub fn to_world_init(level: &Level) -> WorldInit {
    WorldInit {
        columns: level.columns,
        rows: level.rows,
        tile_size: level.tile_size,
        tiles: level.tiles.clone(),
        portal_band: (PORTAL_BAND_TOP, PORTAL_BAND_BOTTOM),
    }
}
