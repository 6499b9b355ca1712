#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick-driven simulation loop that wires the world to its systems.
//!
//! Every [`Simulation::update`] advances the match in a fixed order: the
//! world clock ticks, the wave scheduler releases enemies, towers pick and
//! shoot targets, enemies walk and finished enemies are reaped, and finally
//! wave completion and victory are resolved.

mod scores;

use std::time::Duration;

use thiserror::Error;
use tile_defence_core::{
    Archetypes, CellCoord, Command, EnemyView, Event, HudSnapshot, LevelDefinition, LevelId,
    MatchState, PlacementError, TowerId, TowerKind, TowerTarget, TowerView,
};
use tile_defence_system_spawning::{WaveScheduler, WaveStatus};
use tile_defence_system_tower_combat::TowerCombat;
use tile_defence_system_tower_targeting::TowerTargeting;
use tile_defence_world::{self as world, query, World};
use tracing::{debug, info, warn};

pub use scores::HighScores;

/// Host time between clearing a wave and the automatic start of the next.
pub const AUTO_WAVE_DELAY: Duration = Duration::from_secs(2);

/// Reasons a simulation request may be refused.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SimulationError {
    /// No level is loaded.
    #[error("no level is loaded")]
    NoActiveLevel,
    /// The loaded level has no route from start to end.
    #[error("the loaded level has no route from start to end")]
    Unplayable,
    /// The match already ended in victory or defeat.
    #[error("the match is over")]
    MatchOver,
    /// A wave is already in progress.
    #[error("a wave is already in progress")]
    WaveInProgress,
    /// Every wave of the level was started already.
    #[error("no more waves")]
    NoMoreWaves,
    /// The requested speed multiplier is not a positive finite number.
    #[error("speed multiplier must be positive and finite, got {0}")]
    InvalidSpeed(f32),
}

/// Owns the world, the systems and the session state around them.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    high_scores: HighScores,
    active_level: Option<LevelId>,
    speed: f32,
    auto_wave: bool,
    auto_wave_in: Option<Duration>,
    events: Vec<Event>,
    targets: Vec<TowerTarget>,
    commands: Vec<Command>,
}

impl Simulation {
    /// Creates an idle simulation using the built-in archetype tables.
    #[must_use]
    pub fn new() -> Self {
        Self::with_archetypes(Archetypes::default())
    }

    /// Creates an idle simulation that spawns units from the provided tables.
    #[must_use]
    pub fn with_archetypes(archetypes: Archetypes) -> Self {
        Self {
            world: World::with_archetypes(archetypes),
            scheduler: WaveScheduler::new(),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            high_scores: HighScores::new(),
            active_level: None,
            speed: 1.0,
            auto_wave: false,
            auto_wave_in: None,
            events: Vec::new(),
            targets: Vec::new(),
            commands: Vec::new(),
        }
    }

    /// Replaces the active level, dropping every unit of the previous one.
    ///
    /// A level without a route loads into [`MatchState::Unplayable`]; the
    /// resulting state is returned.
    pub fn load_level(&mut self, id: LevelId, level: LevelDefinition) -> MatchState {
        self.events.clear();
        self.scheduler.load(&level.waves);
        self.auto_wave_in = None;
        self.active_level = Some(id);
        world::apply(&mut self.world, Command::LoadLevel { level }, &mut self.events);
        query::match_state(&self.world)
    }

    /// Advances the match by `dt` of host time.
    ///
    /// The step is scaled by the speed multiplier. Nothing happens unless the
    /// match is being played.
    pub fn update(&mut self, dt: Duration) {
        self.events.clear();
        if query::match_state(&self.world) != MatchState::Playing {
            return;
        }

        self.resolve_auto_wave(dt);

        let dt = scale(dt, self.speed);
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        self.scheduler.handle(&self.events, &mut self.commands);
        self.flush_commands();

        let towers = query::tower_view(&self.world);
        let enemies = query::enemy_view(&self.world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        self.combat.handle(&towers, &self.targets, &mut self.commands);
        self.flush_commands();

        world::apply(
            &mut self.world,
            Command::AdvanceEnemies { dt },
            &mut self.events,
        );

        self.resolve_wave_completion();
    }

    /// Places a tower, paying its cost.
    pub fn place_tower(
        &mut self,
        kind: TowerKind,
        cell: CellCoord,
    ) -> Result<TowerId, PlacementError> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::PlaceTower { kind, cell },
            &mut events,
        );

        let outcome = events
            .iter()
            .find_map(|event| match *event {
                Event::TowerPlaced { tower, .. } => Some(Ok(tower)),
                Event::TowerPlacementRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::Inactive));
        self.events = events;
        outcome
    }

    /// Starts the next wave of the active level.
    pub fn start_wave(&mut self) -> Result<WaveStatus, SimulationError> {
        self.events.clear();
        match query::match_state(&self.world) {
            MatchState::Idle => return Err(SimulationError::NoActiveLevel),
            MatchState::Unplayable => return Err(SimulationError::Unplayable),
            MatchState::Defeated | MatchState::Victorious => {
                return Err(SimulationError::MatchOver)
            }
            MatchState::Playing => {}
        }
        if query::wave_in_progress(&self.world) {
            return Err(SimulationError::WaveInProgress);
        }

        let status = self
            .scheduler
            .start_next_wave()
            .ok_or(SimulationError::NoMoreWaves)?;
        self.auto_wave_in = None;
        world::apply(
            &mut self.world,
            Command::BeginWave {
                wave: status.current,
                total: status.total,
            },
            &mut self.events,
        );
        Ok(status)
    }

    /// Sets the multiplier applied to every update step.
    pub fn set_speed(&mut self, speed: f32) -> Result<(), SimulationError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SimulationError::InvalidSpeed(speed));
        }
        self.speed = speed;
        Ok(())
    }

    /// Enables or disables starting waves automatically after a clear.
    ///
    /// Disabling cancels a pending automatic start.
    pub fn set_auto_wave(&mut self, enabled: bool) {
        self.auto_wave = enabled;
        if !enabled {
            self.auto_wave_in = None;
        }
    }

    /// Leaves the level, dropping enemies, towers and pending spawns.
    ///
    /// High scores survive.
    pub fn go_home(&mut self) {
        self.events.clear();
        self.scheduler.clear();
        self.auto_wave_in = None;
        self.active_level = None;
        world::apply(&mut self.world, Command::ClearSession, &mut self.events);
    }

    /// Lifecycle of the match.
    #[must_use]
    pub fn state(&self) -> MatchState {
        query::match_state(&self.world)
    }

    /// Player-facing summary of the session.
    #[must_use]
    pub fn hud(&self) -> HudSnapshot {
        query::hud(&self.world)
    }

    /// Snapshot of the enemies on the path.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of every placed tower.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Wave scheduler driving the active level.
    #[must_use]
    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    /// Identifier of the active level.
    #[must_use]
    pub fn active_level(&self) -> Option<LevelId> {
        self.active_level
    }

    /// Best victory score recorded for the level during this session.
    #[must_use]
    pub fn high_score(&self, level: LevelId) -> Option<u64> {
        self.high_scores.best(level)
    }

    /// Every best score recorded during this session.
    #[must_use]
    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Events emitted by the most recent request.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Reports whether waves start automatically.
    #[must_use]
    pub fn auto_wave(&self) -> bool {
        self.auto_wave
    }

    /// Host time left until the next wave starts automatically.
    #[must_use]
    pub fn auto_wave_pending(&self) -> Option<Duration> {
        self.auto_wave_in
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    fn resolve_auto_wave(&mut self, host_dt: Duration) {
        let Some(remaining) = self.auto_wave_in else {
            return;
        };
        let remaining = remaining.saturating_sub(host_dt);
        if !remaining.is_zero() {
            self.auto_wave_in = Some(remaining);
            return;
        }

        self.auto_wave_in = None;
        if query::wave_in_progress(&self.world) {
            return;
        }
        match self.start_wave() {
            Ok(status) => debug!(wave = status.current, "wave started automatically"),
            Err(error) => warn!(%error, "automatic wave start skipped"),
        }
    }

    fn resolve_wave_completion(&mut self) {
        if query::match_state(&self.world) != MatchState::Playing
            || !query::wave_in_progress(&self.world)
            || self.scheduler.is_spawning()
            || query::enemy_count(&self.world) > 0
        {
            return;
        }

        world::apply(&mut self.world, Command::CompleteWave, &mut self.events);

        if self.scheduler.is_last_wave() {
            world::apply(&mut self.world, Command::DeclareVictory, &mut self.events);
            self.record_victory();
        } else if self.auto_wave {
            self.auto_wave_in = Some(AUTO_WAVE_DELAY);
        }
    }

    fn record_victory(&mut self) {
        let Some(level) = self.active_level else {
            return;
        };
        let Some(score) = self.hud().score else {
            return;
        };
        if self.high_scores.record(level, score.total) {
            info!(level = level.get(), score = score.total, "new high score");
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

fn scale(dt: Duration, speed: f32) -> Duration {
    Duration::try_from_secs_f64(dt.as_secs_f64() * f64::from(speed)).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{EnemyKind, TileGrid, WaveDescriptor};

    fn corridor(waves: Vec<WaveDescriptor>) -> LevelDefinition {
        let grid = TileGrid::from_ascii(&["......", "S====E", "......"]).expect("valid grid");
        LevelDefinition::new("corridor", grid, waves)
    }

    #[test]
    fn speed_must_be_positive_and_finite() {
        let mut simulation = Simulation::new();

        assert_eq!(
            simulation.set_speed(0.0),
            Err(SimulationError::InvalidSpeed(0.0))
        );
        assert!(simulation.set_speed(f32::NAN).is_err());
        assert!(simulation.set_speed(-2.0).is_err());
        assert_eq!(simulation.speed(), 1.0);

        simulation.set_speed(3.0).expect("valid speed");
        assert_eq!(simulation.speed(), 3.0);
    }

    #[test]
    fn scaling_multiplies_the_step() {
        assert_eq!(
            scale(Duration::from_millis(100), 2.0),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn starting_waves_requires_a_playable_level() {
        let mut simulation = Simulation::new();
        assert_eq!(simulation.start_wave(), Err(SimulationError::NoActiveLevel));

        let blocked = TileGrid::from_ascii(&["S.E"]).expect("valid grid");
        let state = simulation.load_level(
            LevelId::new(9),
            LevelDefinition::new("blocked", blocked, Vec::new()),
        );
        assert_eq!(state, MatchState::Unplayable);
        assert_eq!(simulation.start_wave(), Err(SimulationError::Unplayable));
    }

    #[test]
    fn second_start_during_wave_is_refused() {
        let mut simulation = Simulation::new();
        let _ = simulation.load_level(
            LevelId::new(1),
            corridor(vec![
                WaveDescriptor::new(EnemyKind::Basic, 1, 1000),
                WaveDescriptor::new(EnemyKind::Basic, 1, 1000),
            ]),
        );

        let status = simulation.start_wave().expect("first wave starts");
        assert_eq!(status.current, 1);
        assert_eq!(simulation.start_wave(), Err(SimulationError::WaveInProgress));
    }

    #[test]
    fn disabling_auto_wave_cancels_pending_start() {
        let mut simulation = Simulation::new();
        simulation.set_auto_wave(true);
        simulation.auto_wave_in = Some(AUTO_WAVE_DELAY);

        simulation.set_auto_wave(false);

        assert_eq!(simulation.auto_wave_pending(), None);
    }
}
