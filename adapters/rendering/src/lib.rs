#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tile Defence adapters.
//!
//! Adapters never read the simulation directly while drawing. They capture a
//! [`Scene`] once per frame, which maps every tile, enemy, tower and laser
//! into screen space through a [`TileGridPresentation`].

use std::time::Duration;

use anyhow::Result as AnyResult;
use glam::Vec2;
use thiserror::Error;
use tile_defence_core::{
    CellCoord, EnemyId, HudSnapshot, MatchState, TileKind, TowerId, TowerKind, WorldPoint,
};
use tile_defence_simulation::Simulation;
use tile_defence_world::query;

/// Padding, in pixels, kept between the board and the viewport edge.
pub const BOARD_PADDING: f32 = 20.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

impl From<tile_defence_core::Color> for Color {
    fn from(color: tile_defence_core::Color) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Fill color used for each tile kind.
#[must_use]
pub const fn tile_color(kind: TileKind) -> Color {
    match kind {
        TileKind::Empty => Color::from_rgb_u8(0x22, 0x22, 0x22),
        TileKind::Buildable => Color::from_rgb_u8(0x4a, 0x6b, 0x3c),
        TileKind::Path => Color::from_rgb_u8(0xc2, 0xa4, 0x6c),
        TileKind::Obstacle => Color::from_rgb_u8(0x5a, 0x5a, 0x5a),
        TileKind::Start => Color::from_rgb_u8(0x2e, 0xcc, 0x71),
        TileKind::End => Color::from_rgb_u8(0xe7, 0x4c, 0x3c),
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position in screen pixels, if the cursor is inside the viewport.
    pub cursor: Option<Vec2>,
    /// Tower kind the player asked to build at the cursor on this frame.
    pub place_tower: Option<TowerKind>,
    /// Whether the player asked for the next wave on this frame.
    pub start_wave: bool,
}

impl FrameInput {
    /// Resolves the placement request against the board, if both a tower kind
    /// and a cursor over a tile are present.
    #[must_use]
    pub fn placement(&self, grid: &TileGridPresentation) -> Option<(TowerKind, CellCoord)> {
        let kind = self.place_tower?;
        let cell = grid.cell_at(self.cursor?)?;
        Some((kind, cell))
    }
}

/// Decision returned by the per-frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Stop the backend loop after this frame.
    Exit,
}

/// Placement of the tile board inside the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Edge length of a single tile in pixels.
    pub tile_length: f32,
    /// Screen position of the board's top-left corner.
    pub origin: Vec2,
}

impl TileGridPresentation {
    /// Creates a new presentation descriptor for the tile board.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        origin: Vec2,
    ) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !(tile_length > 0.0 && tile_length.is_finite()) {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
            origin,
        })
    }

    /// Fits the largest square board that leaves `padding` pixels free inside
    /// the viewport and centers it.
    pub fn fit_square(
        columns: u32,
        rows: u32,
        viewport: Vec2,
        padding: f32,
    ) -> Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }

        let side = viewport.min_element() - padding;
        if side <= 0.0 {
            return Err(RenderingError::ViewportTooSmall {
                width: viewport.x,
                height: viewport.y,
            });
        }

        let tile_length = side / columns.max(rows) as f32;
        let board = Vec2::new(columns as f32, rows as f32) * tile_length;
        Self::new(columns, rows, tile_length, (viewport - board) * 0.5)
    }

    /// Width of the board in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Height of the board in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Maps a tile-unit position to screen pixels.
    #[must_use]
    pub fn to_screen(&self, point: WorldPoint) -> Vec2 {
        self.origin + Vec2::new(point.x, point.y) * self.tile_length
    }

    /// Screen position of a tile's center.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        self.to_screen(cell.center())
    }

    /// Tile under the provided screen position, if any.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let local = (position - self.origin) / self.tile_length;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }

        let column = local.x.floor() as u32;
        let row = local.y.floor() as u32;
        (column < self.columns && row < self.rows).then(|| CellCoord::new(column, row))
    }
}

/// Tile presented on the board.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TilePresentation {
    /// Cell the tile occupies.
    pub cell: CellCoord,
    /// Kind of tile.
    pub kind: TileKind,
    /// Fill color.
    pub color: Color,
}

/// Enemy presented as a filled circle with a health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Circle center in pixels.
    pub center: Vec2,
    /// Circle radius in pixels.
    pub radius: f32,
    /// Fill color.
    pub color: Color,
    /// Remaining health as a fraction of the maximum.
    pub health_fraction: f32,
}

/// Tower presented at its tile center, together with its reach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerPresentation {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Kind of tower.
    pub kind: TowerKind,
    /// Tower center in pixels.
    pub center: Vec2,
    /// Range circle radius in pixels.
    pub range_radius: f32,
    /// Fill color.
    pub color: Color,
}

/// Fading laser between a tower and the enemy it last shot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LaserPresentation {
    /// Tower that fired.
    pub tower: TowerId,
    /// Enemy that was hit.
    pub enemy: EnemyId,
    /// Start of the beam in pixels.
    pub from: Vec2,
    /// End of the beam in pixels.
    pub to: Vec2,
    /// Beam color including the fading opacity.
    pub color: Color,
}

/// Read-only snapshot of everything a frame draws.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Board placement inside the viewport.
    pub tile_grid: TileGridPresentation,
    /// Name of the level being played, if any.
    pub level_name: Option<String>,
    /// Every tile of the active level in row-major order.
    pub tiles: Vec<TilePresentation>,
    /// Enemies ordered by identifier.
    pub enemies: Vec<EnemyPresentation>,
    /// Towers ordered by identifier.
    pub towers: Vec<TowerPresentation>,
    /// Active laser beams.
    pub lasers: Vec<LaserPresentation>,
    /// Player-facing counters.
    pub hud: HudSnapshot,
}

impl Scene {
    /// Captures the current state of the simulation.
    #[must_use]
    pub fn capture(simulation: &Simulation, tile_grid: TileGridPresentation) -> Self {
        let mut scene = Self {
            tile_grid,
            level_name: None,
            tiles: Vec::new(),
            enemies: Vec::new(),
            towers: Vec::new(),
            lasers: Vec::new(),
            hud: simulation.hud(),
        };
        scene.refresh(simulation);
        scene
    }

    /// Re-captures the simulation into the existing buffers.
    pub fn refresh(&mut self, simulation: &Simulation) {
        let world = simulation.world();
        let grid = self.tile_grid;

        self.level_name = query::level_name(world).map(str::to_owned);
        self.hud = simulation.hud();

        self.tiles.clear();
        if let Some(tiles) = query::tile_grid(world) {
            self.tiles
                .extend(tiles.cells().map(|(cell, kind)| TilePresentation {
                    cell,
                    kind,
                    color: tile_color(kind),
                }));
        }

        let enemies = simulation.enemies();
        self.enemies.clear();
        self.enemies.extend(enemies.iter().map(|enemy| {
            let health_fraction = if enemy.max_health == 0 {
                0.0
            } else {
                enemy.health as f32 / enemy.max_health as f32
            };
            EnemyPresentation {
                id: enemy.id,
                center: grid.to_screen(enemy.position),
                radius: enemy.radius * grid.tile_length,
                color: enemy.color.into(),
                health_fraction,
            }
        }));

        let archetypes = query::archetypes(world);
        self.towers.clear();
        self.lasers.clear();
        for tower in simulation.towers().iter() {
            let color = Color::from(archetypes.tower(tower.kind).color);
            let center = grid.cell_center(tower.cell);
            self.towers.push(TowerPresentation {
                id: tower.id,
                kind: tower.kind,
                center,
                range_radius: tower.range * grid.tile_length,
                color,
            });

            let Some(target) = tower.target.filter(|_| tower.laser > 0.0) else {
                continue;
            };
            if let Some(enemy) = self.enemies.iter().find(|enemy| enemy.id == target) {
                self.lasers.push(LaserPresentation {
                    tower: tower.id,
                    enemy: target,
                    from: center,
                    to: enemy.center,
                    color: color.lighten(0.5).with_alpha(tower.laser),
                });
            }
        }
    }

    /// Reports whether the match shown by the scene has ended.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.hud.state.is_over()
    }

    /// Headline summarising the match state for overlays.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self.hud.state {
            MatchState::Idle => "Choose a level",
            MatchState::Playing => "Defend the path",
            MatchState::Victorious => "Victory!",
            MatchState::Defeated => "Game over",
            MatchState::Unplayable => "Level has no path",
        }
    }
}

/// Static frame configuration handed to a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title displayed by the window or terminal.
    pub window_title: String,
    /// Color used to clear the frame before drawing.
    pub clear_color: Color,
    /// Scene presented on the first frame.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tile Defence scenes.
pub trait RenderingBackend {
    /// Runs the backend until `update_scene` asks to exit or the backend stops.
    ///
    /// The callback receives the frame's host delta time and input, and must
    /// leave the scene describing the state to draw.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl;
}

/// Errors that can occur when configuring rendering primitives.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum RenderingError {
    /// The board has no tiles to present.
    #[error("board must have at least one column and row (received {columns}x{rows})")]
    EmptyGrid {
        /// Number of requested columns.
        columns: u32,
        /// Number of requested rows.
        rows: u32,
    },
    /// Tile edge length was not a positive finite number.
    #[error("tile_length must be positive (received {tile_length})")]
    InvalidTileLength {
        /// Requested edge length.
        tile_length: f32,
    },
    /// The viewport leaves no room for the board after padding.
    #[error("viewport {width}x{height} is too small for the board")]
    ViewportTooSmall {
        /// Viewport width in pixels.
        width: f32,
        /// Viewport height in pixels.
        height: f32,
    },
}
