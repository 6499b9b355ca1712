#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Tile Defence level without a window.

mod headless;
mod placement;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use glam::Vec2;
use tile_defence_core::{Archetypes, LevelId, MatchState};
use tile_defence_rendering::{
    Color, FrameControl, Presentation, RenderingBackend, Scene, TileGridPresentation,
    BOARD_PADDING,
};
use tile_defence_simulation::{Simulation, SimulationError};
use tile_defence_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{headless::HeadlessBackend, placement::TowerPlacement};

#[derive(Parser, Debug)]
#[command(
    name = "tile-defence",
    version,
    about = "Play a Tile Defence level headlessly with scripted towers"
)]
struct CliArgs {
    /// Built-in level to play (1-based).
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Tower to build before the first wave, as `kind@column,row`. Repeatable.
    #[arg(long = "tower", value_name = "KIND@COLUMN,ROW")]
    towers: Vec<TowerPlacement>,

    /// Game speed multiplier applied to every tick.
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Start each following wave automatically after a short delay.
    #[arg(long)]
    auto_waves: bool,

    /// Host time step per frame, in milliseconds.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Host time after which the run gives up.
    #[arg(long, default_value_t = 600)]
    max_seconds: u64,

    /// TOML file overriding the built-in enemy and tower archetypes.
    #[arg(long, value_name = "PATH")]
    archetypes: Option<PathBuf>,

    /// Viewport edge the board is fitted into, in pixels.
    #[arg(long, default_value_t = 800.0)]
    viewport: f32,
}

/// Entry point for the Tile Defence command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be positive");

    let mut simulation = Simulation::with_archetypes(load_archetypes(args.archetypes.as_ref())?);
    println!("{}", query::welcome_banner(simulation.world()));

    let level_id = LevelId::new(args.level);
    let level = tile_defence_levels::load(level_id)
        .with_context(|| format!("loading built-in level {}", args.level))?;
    let (columns, rows) = (level.grid.columns(), level.grid.rows());
    let level_name = level.name.clone();

    if simulation.load_level(level_id, level) != MatchState::Playing {
        bail!("{level_name} cannot be played: no path from start to end");
    }
    simulation.set_speed(args.speed).context("applying --speed")?;
    simulation.set_auto_wave(args.auto_waves);

    for placement in &args.towers {
        let tower = simulation
            .place_tower(placement.kind, placement.cell)
            .with_context(|| format!("placing {placement}"))?;
        info!(%placement, tower = tower.get(), "tower placed");
    }

    let grid = TileGridPresentation::fit_square(
        columns,
        rows,
        Vec2::splat(args.viewport),
        BOARD_PADDING,
    )
    .context("fitting the board into the viewport")?;
    let presentation = Presentation::new(
        format!("Tile Defence - {level_name}"),
        Color::from_rgb_u8(0x1a, 0x1a, 0x2e),
        Scene::capture(&simulation, grid),
    );

    let tick = Duration::from_millis(args.tick_ms);
    let max_frames = args.max_seconds.saturating_mul(1_000) / args.tick_ms;
    HeadlessBackend::new(tick, max_frames).run(presentation, |dt, input, scene| {
        if let Some((kind, cell)) = input.placement(&scene.tile_grid) {
            if let Err(error) = simulation.place_tower(kind, cell) {
                warn!(%error, %kind, "tower placement rejected");
            }
        }
        if input.start_wave || awaiting_wave(&simulation) {
            start_wave(&mut simulation);
        }

        simulation.update(dt);
        scene.refresh(&simulation);

        if scene.is_over() {
            FrameControl::Exit
        } else {
            FrameControl::Continue
        }
    })?;

    print_summary(&simulation, &level_name, level_id);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_archetypes(path: Option<&PathBuf>) -> Result<Archetypes> {
    let Some(path) = path else {
        return Ok(Archetypes::default());
    };

    let source = fs::read_to_string(path)
        .with_context(|| format!("reading archetypes from {}", path.display()))?;
    Archetypes::from_toml_str(&source)
        .with_context(|| format!("parsing archetypes from {}", path.display()))
}

/// Headless runs send the next wave as soon as the field is clear, unless an
/// automatic start is already counting down.
fn awaiting_wave(simulation: &Simulation) -> bool {
    simulation.state() == MatchState::Playing
        && !simulation.hud().wave_in_progress
        && simulation.auto_wave_pending().is_none()
}

fn start_wave(simulation: &mut Simulation) {
    match simulation.start_wave() {
        Ok(status) => info!(wave = status.current, total = status.total, "wave started"),
        Err(SimulationError::NoMoreWaves) => {}
        Err(error) => warn!(%error, "wave could not be started"),
    }
}

fn print_summary(simulation: &Simulation, level_name: &str, level_id: LevelId) {
    let hud = simulation.hud();
    let outcome = match hud.state {
        MatchState::Victorious => "victory",
        MatchState::Defeated => "defeat",
        _ => "unfinished",
    };

    println!("{level_name}: {outcome}");
    println!(
        "  wave {}/{}  health {}/{}  money {}",
        hud.wave, hud.total_waves, hud.health, hud.max_health, hud.money
    );
    if let Some(score) = hud.score {
        println!(
            "  score {} (health {}% = {}, money {}, time {})",
            score.total,
            score.health_percent,
            score.health_points,
            score.money_points,
            score.time_points
        );
    }
    if let Some(best) = simulation.high_score(level_id) {
        println!("  best {best}");
    }
}
