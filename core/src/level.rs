//! Level layout, path and wave descriptors.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, EnemyKind};

/// Player health used when a level does not specify one.
pub const DEFAULT_START_HEALTH: u32 = 10;

/// Money used when a level does not specify an amount.
pub const DEFAULT_START_MONEY: u32 = 100;

/// Classification of a single tile of the level grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Nothing here.
    #[default]
    Empty,
    /// Towers may be placed here.
    Buildable,
    /// Enemies walk here.
    Path,
    /// Decoration that blocks both towers and enemies.
    Obstacle,
    /// Enemy spawn point.
    Start,
    /// Enemy destination.
    End,
}

impl TileKind {
    /// Reports whether enemies may traverse the tile.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Path | Self::Start | Self::End)
    }

    /// Parses the ASCII glyph used by [`TileGrid::from_ascii`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            ' ' => Some(Self::Empty),
            '.' => Some(Self::Buildable),
            '=' => Some(Self::Path),
            '#' => Some(Self::Obstacle),
            'S' => Some(Self::Start),
            'E' => Some(Self::End),
            _ => None,
        }
    }
}

/// Rectangular matrix of tiles, immutable once a level is loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    columns: u32,
    rows: u32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Builds a grid from rows of tiles.
    ///
    /// Every row must contain the same, non-zero number of tiles.
    pub fn from_rows(rows: Vec<Vec<TileKind>>) -> Result<Self, LevelError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(LevelError::Ragged {
                    row: index,
                    expected,
                    actual: row.len(),
                });
            }
            tiles.extend_from_slice(row);
        }

        Ok(Self {
            columns: u32::try_from(expected).map_err(|_| LevelError::TooLarge)?,
            rows: u32::try_from(rows.len()).map_err(|_| LevelError::TooLarge)?,
            tiles,
        })
    }

    /// Builds a grid from ASCII art, one string per row.
    ///
    /// Glyphs: `' '` empty, `.` buildable, `=` path, `#` obstacle, `S` start
    /// and `E` end.
    pub fn from_ascii<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let parsed = rows
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.as_ref()
                    .chars()
                    .enumerate()
                    .map(|(column, glyph)| {
                        TileKind::from_glyph(glyph).ok_or(LevelError::UnknownGlyph {
                            row,
                            column,
                            glyph,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(parsed)
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Tile stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<TileKind> {
        if !self.contains(cell) {
            return None;
        }
        let index = cell.row() as usize * self.columns as usize + cell.column() as usize;
        self.tiles.get(index).copied()
    }

    /// Iterator over every cell and its tile in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (CellCoord, TileKind)> + '_ {
        let columns = self.columns.max(1);
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let index = index as u32;
            (CellCoord::new(index % columns, index / columns), *tile)
        })
    }

    /// Last cell in row-major order holding the provided tile kind.
    #[must_use]
    pub fn locate(&self, kind: TileKind) -> Option<CellCoord> {
        self.cells()
            .filter(|(_, tile)| *tile == kind)
            .map(|(cell, _)| cell)
            .last()
    }
}

/// Ordered waypoints from the start tile to the end tile, inclusive.
///
/// Adjacent waypoints differ by exactly one orthogonal step. An empty path
/// marks a level without a route and therefore without play.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path {
    waypoints: Vec<CellCoord>,
}

impl Path {
    /// Wraps the provided waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<CellCoord>) -> Self {
        Self { waypoints }
    }

    /// Waypoints in walking order.
    #[must_use]
    pub fn waypoints(&self) -> &[CellCoord] {
        &self.waypoints
    }

    /// Waypoint at the provided index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<CellCoord> {
        self.waypoints.get(index).copied()
    }

    /// Number of waypoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the path holds no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}

/// Timed batch of spawns of a single archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveDescriptor {
    /// Archetype every spawn of the wave uses.
    pub kind: EnemyKind,
    /// Number of enemies in the wave.
    pub count: u32,
    /// Delay between consecutive spawns in milliseconds.
    pub interval_ms: u64,
}

impl WaveDescriptor {
    /// Creates a new wave descriptor.
    #[must_use]
    pub const fn new(kind: EnemyKind, count: u32, interval_ms: u64) -> Self {
        Self {
            kind,
            count,
            interval_ms,
        }
    }

    /// Delay between consecutive spawns.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Everything the simulation needs to host a level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDefinition {
    /// Title shown to the player.
    pub name: String,
    /// Tile layout.
    pub grid: TileGrid,
    /// Waves in the order they are played.
    pub waves: Vec<WaveDescriptor>,
    /// Player health at the start of the level.
    pub start_health: u32,
    /// Money at the start of the level.
    pub start_money: u32,
}

impl LevelDefinition {
    /// Creates a level using the default starting health and money.
    #[must_use]
    pub fn new(name: impl Into<String>, grid: TileGrid, waves: Vec<WaveDescriptor>) -> Self {
        Self {
            name: name.into(),
            grid,
            waves,
            start_health: DEFAULT_START_HEALTH,
            start_money: DEFAULT_START_MONEY,
        }
    }

    /// Overrides the starting health; zero keeps the default.
    #[must_use]
    pub fn with_start_health(mut self, health: u32) -> Self {
        self.start_health = if health == 0 {
            DEFAULT_START_HEALTH
        } else {
            health
        };
        self
    }

    /// Overrides the starting money; zero keeps the default.
    #[must_use]
    pub fn with_start_money(mut self, money: u32) -> Self {
        self.start_money = if money == 0 {
            DEFAULT_START_MONEY
        } else {
            money
        };
        self
    }
}

/// Errors raised while assembling a tile grid.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The grid has no rows or no columns.
    #[error("level grid must contain at least one tile")]
    Empty,
    /// A row is shorter or longer than the first row.
    #[error("row {row} has {actual} tiles but {expected} were expected")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        actual: usize,
    },
    /// ASCII art contains a glyph with no tile meaning.
    #[error("unknown tile glyph '{glyph}' at row {row}, column {column}")]
    UnknownGlyph {
        /// Row of the glyph.
        row: usize,
        /// Column of the glyph.
        column: usize,
        /// Offending character.
        glyph: char,
    },
    /// The grid dimensions do not fit into cell coordinates.
    #[error("level grid is too large")]
    TooLarge,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_grid_maps_glyphs_to_tiles() {
        let grid = TileGrid::from_ascii(&["S=.", "#=E"]).expect("valid grid");
        assert_eq!(grid.columns(), 3);
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.tile(CellCoord::new(0, 0)), Some(TileKind::Start));
        assert_eq!(grid.tile(CellCoord::new(2, 0)), Some(TileKind::Buildable));
        assert_eq!(grid.tile(CellCoord::new(0, 1)), Some(TileKind::Obstacle));
        assert_eq!(grid.tile(CellCoord::new(2, 1)), Some(TileKind::End));
        assert_eq!(grid.tile(CellCoord::new(3, 0)), None);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let error = TileGrid::from_ascii(&["S==", "=E"]).expect_err("ragged grid");
        assert_eq!(
            error,
            LevelError::Ragged {
                row: 1,
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn unknown_glyphs_are_rejected() {
        let error = TileGrid::from_ascii(&["S=x"]).expect_err("unknown glyph");
        assert_eq!(
            error,
            LevelError::UnknownGlyph {
                row: 0,
                column: 2,
                glyph: 'x',
            }
        );
    }

    #[test]
    fn empty_grid_is_rejected() {
        let rows: [&str; 0] = [];
        assert_eq!(TileGrid::from_ascii(&rows), Err(LevelError::Empty));
        assert_eq!(TileGrid::from_ascii(&[""]), Err(LevelError::Empty));
    }

    #[test]
    fn locate_returns_last_match_in_row_major_order() {
        let grid = TileGrid::from_ascii(&["S.S", "..E"]).expect("valid grid");
        assert_eq!(grid.locate(TileKind::Start), Some(CellCoord::new(2, 0)));
        assert_eq!(grid.locate(TileKind::End), Some(CellCoord::new(2, 1)));
        assert_eq!(grid.locate(TileKind::Path), None);
    }

    #[test]
    fn zero_start_values_keep_defaults() {
        let grid = TileGrid::from_ascii(&["SE"]).expect("valid grid");
        let level = LevelDefinition::new("test", grid, Vec::new())
            .with_start_health(0)
            .with_start_money(250);
        assert_eq!(level.start_health, DEFAULT_START_HEALTH);
        assert_eq!(level.start_money, 250);
    }

    #[test]
    fn wave_interval_converts_milliseconds() {
        let wave = WaveDescriptor::new(EnemyKind::Fast, 2, 1500);
        assert_eq!(wave.interval(), Duration::from_millis(1500));
    }
}
