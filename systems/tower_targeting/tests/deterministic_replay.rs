use std::time::Duration;

use tile_defence_core::{
    CellCoord, Command, EnemyId, EnemyKind, Event, LevelDefinition, TileGrid, TowerId,
    TowerKind, TowerTarget,
};
use tile_defence_system_tower_targeting::TowerTargeting;
use tile_defence_world::{self as world, query, World};

#[test]
fn deterministic_replay_focuses_the_weakest_enemy() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");

    assert_eq!(
        first[0],
        vec![target(0, 1), target(1, 1)],
        "both towers focus the swarm enemy while it survives the first shot"
    );
    assert_eq!(
        first[1],
        vec![target(0, 1), target(1, 0)],
        "second tower skips the enemy the first tower finishes"
    );
    for targets in &first[2..] {
        assert_eq!(targets, &vec![target(0, 0), target(1, 0)]);
    }
}

fn target(tower: u32, enemy: u32) -> TowerTarget {
    TowerTarget {
        tower: TowerId::new(tower),
        enemy: EnemyId::new(enemy),
    }
}

fn replay() -> Vec<Vec<TowerTarget>> {
    let grid = TileGrid::from_ascii(&[
        "........", //
        "S======E", //
        "........",
    ])
    .expect("valid grid");
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            level: LevelDefinition::new("replay", grid, Vec::new()).with_start_money(500),
        },
        &mut events,
    );
    for cell in [CellCoord::new(1, 0), CellCoord::new(1, 2)] {
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Rapid,
                cell,
            },
            &mut events,
        );
    }
    for kind in [EnemyKind::Heavy, EnemyKind::Swarm] {
        world::apply(&mut world, Command::SpawnEnemy { kind }, &mut events);
    }

    let mut targeting = TowerTargeting::new();
    let mut targets = Vec::new();
    let mut assignments = Vec::new();

    for _ in 0..6 {
        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            &mut targets,
        );
        assignments.push(targets.clone());

        let mut events: Vec<Event> = Vec::new();
        for target in &targets {
            world::apply(
                &mut world,
                Command::FireTower {
                    tower: target.tower,
                    target: target.enemy,
                },
                &mut events,
            );
        }
        for command in [
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            Command::AdvanceEnemies {
                dt: Duration::from_millis(50),
            },
        ] {
            world::apply(&mut world, command, &mut events);
        }
    }

    assignments
}
