//! Immutable tile map that tells enemies which way to walk.

use path_defence_core::{Direction, GridPosition, PathGrid, Position};

/// Contents of a single map tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Walkable tile that sends enemies in the recorded direction.
    Path(Direction),
    /// Scenery that enemies never enter.
    Terrain,
}

impl Tile {
    /// Direction recorded on the tile, if it is part of the path.
    #[must_use]
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::Path(direction) => Some(direction),
            Self::Terrain => None,
        }
    }
}

/// Reasons a map layout can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// Tiles must have a positive side length.
    #[error("tile size must be positive")]
    ZeroTileSize,
    /// The layout did not contain a single row.
    #[error("map layout contains no rows")]
    Empty,
    /// A row was shorter or longer than the first row.
    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A glyph did not describe any known tile.
    #[error("unknown tile glyph '{glyph}' at column {column}, row {row}")]
    UnknownGlyph {
        /// The unrecognised character.
        glyph: char,
        /// Zero-based column of the glyph.
        column: usize,
        /// Zero-based row of the glyph.
        row: usize,
    },
    /// No tile was marked as the enemy entry point.
    #[error("map layout has no start tile")]
    MissingStart,
    /// More than one tile was marked as the enemy entry point.
    #[error("second start tile at column {column}, row {row}")]
    DuplicateStart {
        /// Zero-based column of the second start tile.
        column: usize,
        /// Zero-based row of the second start tile.
        row: usize,
    },
    /// The layout does not fit the coordinate space.
    #[error("map layout exceeds the supported dimensions")]
    TooLarge,
}

/// Grid of tiles with a single entry point.
///
/// Layouts are parsed from text rows where `>`, `<`, `^` and `v` are path
/// tiles, the uppercase letters `R`, `L`, `U` and `D` mark the start tile
/// together with its direction, and `.` or `#` are terrain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    columns: u32,
    rows: u32,
    tile_size: u32,
    tiles: Vec<Tile>,
    start: GridPosition,
}

impl TileMap {
    /// Parses a text layout into a map with square tiles of `tile_size`.
    ///
    /// Blank lines are skipped and every row is trimmed, so layouts can be
    /// embedded in indented configuration strings.
    pub fn parse(layout: &str, tile_size: u32) -> Result<Self, MapError> {
        if tile_size == 0 {
            return Err(MapError::ZeroTileSize);
        }

        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(MapError::Empty);
        };
        let expected = first.chars().count();

        let mut tiles = Vec::with_capacity(expected * rows.len());
        let mut start = None;
        for (row_index, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != expected {
                return Err(MapError::Ragged {
                    row: row_index,
                    expected,
                    found,
                });
            }

            for (column_index, glyph) in row.chars().enumerate() {
                let (tile, is_start) =
                    parse_glyph(glyph).ok_or(MapError::UnknownGlyph {
                        glyph,
                        column: column_index,
                        row: row_index,
                    })?;
                if is_start {
                    if start.is_some() {
                        return Err(MapError::DuplicateStart {
                            column: column_index,
                            row: row_index,
                        });
                    }
                    start = Some((column_index, row_index));
                }
                tiles.push(tile);
            }
        }

        let (start_column, start_row) = start.ok_or(MapError::MissingStart)?;
        let columns = u32::try_from(expected).map_err(|_| MapError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| MapError::TooLarge)?;
        let start = GridPosition::new(
            u32::try_from(start_column).map_err(|_| MapError::TooLarge)?,
            u32::try_from(start_row).map_err(|_| MapError::TooLarge)?,
        );

        Ok(Self {
            columns,
            rows: row_count,
            tile_size,
            tiles,
            start,
        })
    }

    /// Number of tile columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of tile rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile where enemies enter the map.
    #[must_use]
    pub const fn start(&self) -> GridPosition {
        self.start
    }

    /// World position enemies are spawned at.
    #[must_use]
    pub fn start_position(&self) -> Position {
        self.start.to_position(self.tile_size)
    }

    /// Total width of the map in world units.
    #[must_use]
    pub fn width(&self) -> f64 {
        f64::from(self.columns) * f64::from(self.tile_size)
    }

    /// Total height of the map in world units.
    #[must_use]
    pub fn height(&self) -> f64 {
        f64::from(self.rows) * f64::from(self.tile_size)
    }

    /// Tile stored at `at`, if it lies within the map.
    #[must_use]
    pub fn tile(&self, at: GridPosition) -> Option<Tile> {
        self.index(at).and_then(|index| self.tiles.get(index).copied())
    }

    fn index(&self, at: GridPosition) -> Option<usize> {
        if at.column() < self.columns && at.row() < self.rows {
            let row = usize::try_from(at.row()).ok()?;
            let column = usize::try_from(at.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

impl PathGrid for TileMap {
    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn direction_at(&self, position: Position) -> Option<Direction> {
        GridPosition::from_position(position, self.tile_size)
            .and_then(|at| self.tile(at))
            .and_then(Tile::direction)
    }

    fn is_out_of_bounds(&self, position: Position) -> bool {
        let size = f64::from(self.tile_size);
        position.x() <= -size
            || position.y() <= -size
            || position.x() >= self.width()
            || position.y() >= self.height()
    }
}

fn parse_glyph(glyph: char) -> Option<(Tile, bool)> {
    let parsed = match glyph {
        '>' => (Tile::Path(Direction::Right), false),
        '<' => (Tile::Path(Direction::Left), false),
        '^' => (Tile::Path(Direction::Up), false),
        'v' => (Tile::Path(Direction::Down), false),
        'R' => (Tile::Path(Direction::Right), true),
        'L' => (Tile::Path(Direction::Left), true),
        'U' => (Tile::Path(Direction::Up), true),
        'D' => (Tile::Path(Direction::Down), true),
        '.' | '#' => (Tile::Terrain, false),
        _ => return None,
    };
    Some(parsed)
}
