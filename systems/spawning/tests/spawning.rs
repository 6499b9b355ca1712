use std::time::Duration;

use tile_defence_core::{Command, EnemyKind, Event, LevelDefinition, TileGrid, WaveDescriptor};
use tile_defence_system_spawning::{SchedulerPhase, WaveScheduler, WaveStatus};
use tile_defence_world::{self as world, query, World};

fn tick(millis: u64) -> Event {
    Event::TimeAdvanced {
        dt: Duration::from_millis(millis),
    }
}

fn two_wave_scheduler() -> WaveScheduler {
    let mut scheduler = WaveScheduler::new();
    scheduler.load(&[
        WaveDescriptor::new(EnemyKind::Basic, 3, 2000),
        WaveDescriptor::new(EnemyKind::Fast, 2, 1000),
    ]);
    scheduler
}

#[test]
fn spawns_are_released_one_interval_apart() {
    let mut scheduler = two_wave_scheduler();
    let _ = scheduler.start_next_wave();
    let mut commands = Vec::new();

    scheduler.handle(&[tick(100)], &mut commands);
    assert_eq!(commands.len(), 1, "first spawn is immediate");

    scheduler.handle(&[tick(1_000)], &mut commands);
    assert_eq!(commands.len(), 1, "interval has not elapsed yet");

    scheduler.handle(&[tick(1_000)], &mut commands);
    assert_eq!(commands.len(), 2);

    scheduler.handle(&[tick(2_000)], &mut commands);
    assert_eq!(commands.len(), 3);
    assert!(!scheduler.is_spawning());

    scheduler.handle(&[tick(10_000)], &mut commands);
    assert_eq!(commands.len(), 3, "drained wave stays silent");
    assert!(commands.iter().all(|command| *command
        == Command::SpawnEnemy {
            kind: EnemyKind::Basic
        }));
}

#[test]
fn large_steps_release_at_most_one_enemy() {
    let mut scheduler = two_wave_scheduler();
    let _ = scheduler.start_next_wave();
    let mut commands = Vec::new();

    scheduler.handle(&[tick(60_000)], &mut commands);

    assert_eq!(commands.len(), 1);
    assert_eq!(scheduler.pending_spawns(), 2);
}

#[test]
fn phases_follow_wave_progress() {
    let mut scheduler = two_wave_scheduler();
    let mut commands = Vec::new();
    assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    assert_eq!(scheduler.current_wave(), 0);

    let _ = scheduler.start_next_wave();
    assert_eq!(scheduler.phase(), SchedulerPhase::Spawning { wave: 1 });

    for _ in 0..3 {
        scheduler.handle(&[tick(2_000)], &mut commands);
    }
    assert_eq!(scheduler.phase(), SchedulerPhase::Drained { wave: 1 });
    assert!(!scheduler.is_last_wave());

    assert_eq!(
        scheduler.start_next_wave(),
        Some(WaveStatus {
            current: 2,
            total: 2
        })
    );
    assert!(scheduler.is_last_wave());
    for _ in 0..2 {
        scheduler.handle(&[tick(1_000)], &mut commands);
    }
    assert_eq!(scheduler.phase(), SchedulerPhase::AllWavesComplete);
    assert_eq!(
        commands.last(),
        Some(&Command::SpawnEnemy {
            kind: EnemyKind::Fast
        })
    );
}

#[test]
fn exhausted_scheduler_keeps_answering_no_more_waves() {
    let mut scheduler = two_wave_scheduler();
    let _ = scheduler.start_next_wave();
    let _ = scheduler.start_next_wave();

    assert_eq!(scheduler.start_next_wave(), None);
    assert_eq!(scheduler.start_next_wave(), None);
    assert_eq!(scheduler.current_wave(), 2);
    assert_eq!(scheduler.pending_spawns(), 2, "sentinel leaves the queue alone");
}

#[test]
fn clearing_forgets_every_wave() {
    let mut scheduler = two_wave_scheduler();
    let _ = scheduler.start_next_wave();

    scheduler.clear();

    assert!(!scheduler.is_spawning());
    assert_eq!(scheduler.total_waves(), 0);
    assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    assert_eq!(scheduler.start_next_wave(), None);
}

#[test]
fn spawn_commands_place_enemies_in_the_world() {
    let grid = TileGrid::from_ascii(&["S==E"]).expect("valid grid");
    let waves = vec![WaveDescriptor::new(EnemyKind::Swarm, 4, 100)];
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelDefinition::new("corridor", grid, waves.clone()),
        },
        &mut events,
    );

    let mut scheduler = WaveScheduler::new();
    scheduler.load(&waves);
    let _ = scheduler.start_next_wave();

    for _ in 0..4 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        let mut commands = Vec::new();
        scheduler.handle(&events, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }

    let enemies = query::enemy_view(&world).into_vec();
    assert_eq!(enemies.len(), 4);
    assert!(enemies.iter().all(|enemy| enemy.kind == EnemyKind::Swarm));
    assert!(!scheduler.is_spawning());
}
