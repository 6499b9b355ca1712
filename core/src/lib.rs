#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tile Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The simulation loop submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

mod archetypes;
mod level;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use archetypes::{
    Archetypes, Color, ConfigError, EnemyKind, EnemyStats, TowerKind, TowerStats,
};
pub use level::{
    LevelDefinition, LevelError, Path, TileGrid, TileKind, WaveDescriptor, DEFAULT_START_HEALTH,
    DEFAULT_START_MONEY,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Tile Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the active level, resetting enemies, towers and the economy.
    LoadLevel {
        /// Level that becomes active.
        level: LevelDefinition,
    },
    /// Advances tower cooldowns, visual decay and the in-wave clock.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enters the path at its first waypoint.
    SpawnEnemy {
        /// Archetype of the enemy to create.
        kind: EnemyKind,
    },
    /// Requests that a tower shoots the provided enemy.
    FireTower {
        /// Tower taking the shot.
        tower: TowerId,
        /// Enemy receiving the damage.
        target: EnemyId,
    },
    /// Moves every enemy along the path and reaps killed or leaked enemies.
    AdvanceEnemies {
        /// Duration of simulated time the enemies travel for.
        dt: Duration,
    },
    /// Marks a wave as in progress and resets the wave kill tally.
    BeginWave {
        /// One-based number of the wave that starts.
        wave: u32,
        /// Total number of waves in the level.
        total: u32,
    },
    /// Ends the wave in progress and pays out the wave-clear bonus.
    CompleteWave,
    /// Ends the match as a victory and computes the final score.
    DeclareVictory,
    /// Requests placement of a tower on the provided cell.
    PlaceTower {
        /// Type of tower to construct.
        kind: TowerKind,
        /// Cell the tower occupies.
        cell: CellCoord,
    },
    /// Drops the active level along with every enemy and tower.
    ClearSession,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a playable level became active.
    LevelLoaded {
        /// Number of tile columns in the level grid.
        columns: u32,
        /// Number of tile rows in the level grid.
        rows: u32,
        /// Number of waypoints on the extracted path.
        path_length: usize,
        /// Number of waves the level schedules.
        total_waves: u32,
    },
    /// Reports that the loaded level has no route from start to end.
    PathUnavailable,
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier allocated to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
    },
    /// Confirms that a tower was placed into the world.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Type of tower that was placed.
        kind: TowerKind,
        /// Cell occupied by the tower.
        cell: CellCoord,
        /// Money deducted for the tower.
        cost: u32,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Type of tower requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower hit an enemy.
    TowerFired {
        /// Tower that fired.
        tower: TowerId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage dealt by the shot.
        damage: u32,
    },
    /// Reports that an enemy was destroyed by towers.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Archetype of the destroyed enemy.
        kind: EnemyKind,
        /// Money credited for the kill.
        bounty: u32,
    },
    /// Reports that an enemy reached the end of the path.
    EnemyLeaked {
        /// Identifier of the leaked enemy.
        enemy: EnemyId,
        /// Archetype of the leaked enemy.
        kind: EnemyKind,
        /// Health the player lost.
        damage: u32,
    },
    /// Announces that the player's health reached zero.
    PlayerDefeated,
    /// Announces that a wave started.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
        /// Total number of waves in the level.
        total: u32,
    },
    /// Announces that the wave in progress was cleared.
    WaveCleared {
        /// One-based number of the wave.
        wave: u32,
        /// Money paid out as the wave-clear bonus.
        bonus: u32,
    },
    /// Announces that the final wave was cleared with the player alive.
    MatchWon {
        /// Breakdown of the final score.
        score: ScoreBreakdown,
    },
    /// Confirms that the active level and every unit were dropped.
    SessionCleared,
}

/// Lifecycle of the match hosted by the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    /// No level is loaded.
    #[default]
    Idle,
    /// A level is loaded and gameplay advances.
    Playing,
    /// A level is loaded but has no route from start to end.
    Unplayable,
    /// The player's health reached zero.
    Defeated,
    /// Every wave was cleared with the player alive.
    Victorious,
}

impl MatchState {
    /// Reports whether the match reached a terminal state.
    #[must_use]
    pub const fn is_over(self) -> bool {
        matches!(self, Self::Defeated | Self::Victorious)
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier of a level, used to key per-level best scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(u32);

impl LevelId {
    /// Creates a new level identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the level identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid tile expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Continuous position of the cell's center.
    #[must_use]
    pub fn center(self) -> WorldPoint {
        WorldPoint::new(self.column as f32 + 0.5, self.row as f32 + 0.5)
    }
}

/// Continuous position measured in tile units.
///
/// `x` grows with the column index and `y` with the row index, so the center
/// of tile `(column, row)` sits at `(column + 0.5, row + 0.5)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WorldPoint {
    /// Horizontal coordinate in tiles.
    pub x: f32,
    /// Vertical coordinate in tiles.
    pub y: f32,
}

impl WorldPoint {
    /// Creates a new point from tile-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Current position in tile units.
    pub position: WorldPoint,
    /// Index of the waypoint the enemy walks toward.
    pub waypoint: usize,
    /// Remaining health.
    pub health: u32,
    /// Health the enemy spawned with.
    pub max_health: u32,
    /// Drawing radius in tiles.
    pub radius: f32,
    /// Drawing color.
    pub color: Color,
    /// Indicates whether the enemy still participates in gameplay.
    pub alive: bool,
    /// Indicates whether the enemy finished by reaching the end of the path.
    pub reached_end: bool,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower that was constructed.
    pub kind: TowerKind,
    /// Cell occupied by the tower.
    pub cell: CellCoord,
    /// Targeting radius in tiles.
    pub range: f32,
    /// Damage dealt per shot.
    pub damage: u32,
    /// Time left until the tower may fire again.
    pub ready_in: Duration,
    /// Enemy hit by the most recent shot, kept while the laser fades.
    pub target: Option<EnemyId>,
    /// Laser intensity in `0.0..=1.0`, used by presentation only.
    pub laser: f32,
}

impl TowerSnapshot {
    /// Reports whether the tower's cooldown elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready_in.is_zero()
    }
}

/// Read-only snapshot describing all towers placed within the level.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshots sorted by tower identifier.
    #[must_use]
    pub fn as_slice(&self) -> &[TowerSnapshot] {
        &self.snapshots
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Target chosen for a ready tower during the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower that will fire.
    pub tower: TowerId,
    /// Enemy the tower aims at.
    pub enemy: EnemyId,
}

/// Breakdown of the score awarded when the final wave is cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Remaining health as a rounded percentage of the starting health.
    pub health_percent: u32,
    /// Points from remaining health (`health_percent * 50`).
    pub health_points: u64,
    /// Points from money in the bank (`money * 2`).
    pub money_points: u64,
    /// Points from finishing quickly (`max(0, 10000 - seconds * 50)`, floored).
    pub time_points: u64,
    /// Sum of every component.
    pub total: u64,
}

/// Player-facing summary of the session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HudSnapshot {
    /// Remaining player health.
    pub health: u32,
    /// Health the level started with.
    pub max_health: u32,
    /// Money available for towers.
    pub money: u32,
    /// One-based number of the latest wave, zero before the first wave.
    pub wave: u32,
    /// Number of waves in the level.
    pub total_waves: u32,
    /// Indicates whether a wave is currently in progress.
    pub wave_in_progress: bool,
    /// Value of the enemies killed during the current wave.
    pub wave_kill_value: u32,
    /// Lifecycle of the match.
    pub state: MatchState,
    /// Final score once the match was won.
    pub score: Option<ScoreBreakdown>,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// No match is in progress.
    #[error("towers can only be placed while a match is in progress")]
    Inactive,
    /// The requested cell lies outside the tile grid.
    #[error("cell lies outside the level grid")]
    OutOfBounds,
    /// The requested tile does not accept towers.
    #[error("tile is not buildable")]
    NotBuildable,
    /// Another tower already occupies the requested cell.
    #[error("tile is already occupied by a tower")]
    Occupied,
    /// The player cannot pay for the tower.
    #[error("tower costs {cost} but only {available} is available")]
    Unaffordable {
        /// Price of the requested tower.
        cost: u32,
        /// Money the player holds.
        available: u32,
    },
}
