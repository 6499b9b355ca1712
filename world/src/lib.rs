#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Tile Defence.

mod economy;
mod enemies;
mod navigation;
mod towers;

use std::mem;

use tile_defence_core::{
    Archetypes, CellCoord, Command, EnemyId, EnemyKind, Event, LevelDefinition, MatchState, Path,
    TileGrid, TowerId, TowerKind, DEFAULT_START_HEALTH, DEFAULT_START_MONEY, WELCOME_BANNER,
};
use tracing::{debug, error, info, warn};

use economy::Economy;
use enemies::Enemy;
use towers::TowerRegistry;

pub use navigation::find_path;

/// Level currently hosted by the world.
#[derive(Debug)]
struct ActiveLevel {
    name: String,
    grid: TileGrid,
    path: Path,
}

/// Represents the authoritative Tile Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    archetypes: Archetypes,
    level: Option<ActiveLevel>,
    enemies: Vec<Enemy>,
    towers: TowerRegistry,
    economy: Economy,
    state: MatchState,
    next_enemy_id: EnemyId,
}

impl World {
    /// Creates an idle world using the built-in archetype tables.
    #[must_use]
    pub fn new() -> Self {
        Self::with_archetypes(Archetypes::default())
    }

    /// Creates an idle world that spawns units from the provided tables.
    #[must_use]
    pub fn with_archetypes(archetypes: Archetypes) -> Self {
        Self {
            banner: WELCOME_BANNER,
            archetypes,
            level: None,
            enemies: Vec::new(),
            towers: TowerRegistry::new(),
            economy: Economy::default(),
            state: MatchState::Idle,
            next_enemy_id: EnemyId::new(0),
        }
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().wrapping_add(1));
        id
    }

    fn load_level(&mut self, level: LevelDefinition, out_events: &mut Vec<Event>) {
        let path = find_path(&level.grid);
        let total_waves = u32::try_from(level.waves.len()).unwrap_or(u32::MAX);

        self.enemies.clear();
        self.towers.clear();
        self.next_enemy_id = EnemyId::new(0);
        self.economy = Economy::new(
            or_default(level.start_health, DEFAULT_START_HEALTH),
            or_default(level.start_money, DEFAULT_START_MONEY),
            total_waves,
        );

        if path.is_empty() {
            warn!(level = %level.name, "level has no route from start to end");
            self.state = MatchState::Unplayable;
            out_events.push(Event::PathUnavailable);
        } else {
            info!(
                level = %level.name,
                path_length = path.len(),
                total_waves,
                "level loaded"
            );
            self.state = MatchState::Playing;
            out_events.push(Event::LevelLoaded {
                columns: level.grid.columns(),
                rows: level.grid.rows(),
                path_length: path.len(),
                total_waves,
            });
        }

        self.level = Some(ActiveLevel {
            name: level.name,
            grid: level.grid,
            path,
        });
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, out_events: &mut Vec<Event>) {
        let playable = self
            .level
            .as_ref()
            .is_some_and(|level| !level.path.is_empty());
        if self.state != MatchState::Playing || !playable {
            return;
        }

        let id = self.allocate_enemy_id();
        let stats = self.archetypes.enemy(kind);
        let Some(level) = self.level.as_ref() else {
            return;
        };
        self.enemies.push(Enemy::spawn(id, kind, stats, &level.path));
        out_events.push(Event::EnemySpawned { enemy: id, kind });
    }

    fn fire_tower(&mut self, tower: TowerId, target: EnemyId, out_events: &mut Vec<Event>) {
        let Some(state) = self.towers.get_mut(tower) else {
            return;
        };
        if !state.is_ready() {
            return;
        }
        let Some(enemy) = self
            .enemies
            .iter_mut()
            .find(|enemy| enemy.id() == target && enemy.is_alive())
        else {
            return;
        };

        let range = state.stats.range;
        if state.cell.center().distance_squared(enemy.position()) > range * range {
            return;
        }

        let damage = state.stats.damage;
        enemy.take_damage(damage);
        state.record_shot(target);
        out_events.push(Event::TowerFired {
            tower,
            enemy: target,
            damage,
        });
    }

    fn advance_enemies(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        let Some(level) = self.level.as_ref() else {
            return;
        };
        for enemy in &mut self.enemies {
            enemy.update(dt, &level.path);
        }

        let (remaining, finished): (Vec<Enemy>, Vec<Enemy>) =
            mem::take(&mut self.enemies).into_iter().partition(Enemy::is_alive);
        self.enemies = remaining;

        for enemy in finished {
            let stats = enemy.stats();
            if enemy.reached_end() {
                let defeated = self.economy.apply_leak(stats.damage);
                out_events.push(Event::EnemyLeaked {
                    enemy: enemy.id(),
                    kind: enemy.kind(),
                    damage: stats.damage,
                });
                if defeated && self.state == MatchState::Playing {
                    info!("player health depleted");
                    self.state = MatchState::Defeated;
                    out_events.push(Event::PlayerDefeated);
                }
            } else {
                self.economy.credit_kill(stats.bounty);
                out_events.push(Event::EnemyKilled {
                    enemy: enemy.id(),
                    kind: enemy.kind(),
                    bounty: stats.bounty,
                });
            }
        }
    }

    fn place_tower(&mut self, kind: TowerKind, cell: CellCoord, out_events: &mut Vec<Event>) {
        let stats = match query::placement_check(self, kind, cell) {
            Ok(stats) => stats,
            Err(reason) => {
                debug!(%kind, ?cell, %reason, "tower placement rejected");
                out_events.push(Event::TowerPlacementRejected { kind, cell, reason });
                return;
            }
        };

        if !self.economy.spend(stats.cost) {
            error!(
                %kind,
                cost = stats.cost,
                money = self.economy.money,
                "funds vanished after placement validation"
            );
            debug_assert!(false, "placement validated funds that were not available");
            return;
        }

        let tower = self.towers.insert(kind, cell, stats);
        out_events.push(Event::TowerPlaced {
            tower,
            kind,
            cell,
            cost: stats.cost,
        });
    }

    fn clear_session(&mut self) {
        self.level = None;
        self.enemies.clear();
        self.towers.clear();
        self.economy = Economy::default();
        self.state = MatchState::Idle;
        self.next_enemy_id = EnemyId::new(0);
    }
}

/// Zero starting values are treated as unset.
fn or_default(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { level } => world.load_level(level, out_events),
        Command::Tick { dt } => {
            world.towers.cool_down(dt);
            if world.state == MatchState::Playing && world.economy.wave_in_progress {
                world.economy.elapsed = world.economy.elapsed.saturating_add(dt);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::FireTower { tower, target } => {
            if world.state == MatchState::Playing {
                world.fire_tower(tower, target, out_events);
            }
        }
        Command::AdvanceEnemies { dt } => {
            if world.state == MatchState::Playing {
                world.advance_enemies(dt.as_secs_f32(), out_events);
            }
        }
        Command::BeginWave { wave, total } => {
            if world.state != MatchState::Playing {
                return;
            }
            info!(wave, total, "wave started");
            world.economy.begin_wave(wave, total);
            out_events.push(Event::WaveStarted { wave, total });
        }
        Command::CompleteWave => {
            if world.state != MatchState::Playing || !world.economy.wave_in_progress {
                return;
            }
            let bonus = world.economy.complete_wave();
            let wave = world.economy.wave;
            info!(wave, bonus, "wave cleared");
            out_events.push(Event::WaveCleared { wave, bonus });
        }
        Command::DeclareVictory => {
            if world.state != MatchState::Playing {
                return;
            }
            let economy = &mut world.economy;
            let score = economy::victory_score(
                economy.health,
                economy.max_health,
                economy.money,
                economy.elapsed,
            );
            economy.score = Some(score);
            world.state = MatchState::Victorious;
            info!(total = score.total, "match won");
            out_events.push(Event::MatchWon { score });
        }
        Command::PlaceTower { kind, cell } => world.place_tower(kind, cell, out_events),
        Command::ClearSession => {
            world.clear_session();
            out_events.push(Event::SessionCleared);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tile_defence_core::{
        Archetypes, CellCoord, EnemyView, HudSnapshot, MatchState, Path, PlacementError,
        TileGrid, TileKind, TowerId, TowerKind, TowerStats, TowerView,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Lifecycle of the hosted match.
    #[must_use]
    pub fn match_state(world: &World) -> MatchState {
        world.state
    }

    /// Player-facing summary of health, money and wave progress.
    #[must_use]
    pub fn hud(world: &World) -> HudSnapshot {
        world.economy.hud(world.state)
    }

    /// Title of the active level.
    #[must_use]
    pub fn level_name(world: &World) -> Option<&str> {
        world.level.as_ref().map(|level| level.name.as_str())
    }

    /// Tile layout of the active level.
    #[must_use]
    pub fn tile_grid(world: &World) -> Option<&TileGrid> {
        world.level.as_ref().map(|level| &level.grid)
    }

    /// Route enemies walk in the active level.
    #[must_use]
    pub fn path(world: &World) -> Option<&Path> {
        world.level.as_ref().map(|level| &level.path)
    }

    /// Captures a read-only view of the enemies on the path.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of enemies that are still alive.
    #[must_use]
    pub fn enemy_count(world: &World) -> usize {
        world.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Captures a read-only view of every placed tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.snapshots())
    }

    /// Number of towers placed in the active level.
    #[must_use]
    pub fn tower_count(world: &World) -> usize {
        world.towers.len()
    }

    /// Identifier of the tower occupying the provided cell, if any.
    #[must_use]
    pub fn tower_at(world: &World, cell: CellCoord) -> Option<TowerId> {
        world.towers.tower_at(cell)
    }

    /// Reports whether a wave is currently in progress.
    #[must_use]
    pub fn wave_in_progress(world: &World) -> bool {
        world.economy.wave_in_progress
    }

    /// Archetype tables the world spawns units from.
    #[must_use]
    pub fn archetypes(world: &World) -> &Archetypes {
        &world.archetypes
    }

    /// Validates a placement request without mutating the world.
    ///
    /// Returns the stats the tower would be built with.
    pub fn placement_check(
        world: &World,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<TowerStats, PlacementError> {
        if world.state != MatchState::Playing {
            return Err(PlacementError::Inactive);
        }
        let grid = tile_grid(world).ok_or(PlacementError::Inactive)?;
        match grid.tile(cell) {
            None => return Err(PlacementError::OutOfBounds),
            Some(TileKind::Buildable) => {}
            Some(_) => return Err(PlacementError::NotBuildable),
        }
        if world.towers.tower_at(cell).is_some() {
            return Err(PlacementError::Occupied);
        }

        let stats = world.archetypes.tower(kind);
        if stats.cost > world.economy.money {
            return Err(PlacementError::Unaffordable {
                cost: stats.cost,
                available: world.economy.money,
            });
        }
        Ok(stats)
    }
}
