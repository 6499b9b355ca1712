#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use tile_defence_core::{EnemyId, EnemyView, TowerTarget, TowerView, WorldPoint};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes targets for every ready tower.
    ///
    /// Each ready tower picks the alive enemy with the lowest health inside
    /// its range, preferring the earliest spawn on ties. Towers are visited
    /// in identifier order and every planned shot is deducted from the
    /// working copy of the enemy's health, so later towers never aim at an
    /// enemy an earlier tower already finishes this tick.
    ///
    /// The output buffer is cleared before populating it with the latest
    /// assignments.
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TowerTarget>) {
        out.clear();

        if towers.iter().next().is_none() || enemies.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in towers.iter().filter(|tower| tower.is_ready()) {
            let origin = tower.cell.center();
            let max_distance = tower.range * tower.range;

            let mut best: Option<usize> = None;
            for (index, candidate) in self.enemy_workspace.iter().enumerate() {
                if candidate.health == 0 {
                    continue;
                }
                if origin.distance_squared(candidate.position) > max_distance {
                    continue;
                }

                match best {
                    Some(existing) if !candidate.precedes(&self.enemy_workspace[existing]) => {}
                    _ => best = Some(index),
                }
            }

            if let Some(index) = best {
                let candidate = &mut self.enemy_workspace[index];
                candidate.health = candidate.health.saturating_sub(tower.damage);
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: candidate.id,
                });
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView) {
        self.enemy_workspace.clear();
        self.enemy_workspace.reserve(enemies.len());

        for snapshot in enemies.iter().filter(|snapshot| snapshot.alive) {
            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                health: snapshot.health,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: WorldPoint,
    health: u32,
}

impl EnemyCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.health != other.health {
            return self.health < other.health;
        }

        self.id < other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tile_defence_core::{
        CellCoord, Color, EnemyKind, EnemySnapshot, TowerId, TowerKind, TowerSnapshot,
    };

    fn tower(id: u32, cell: (u32, u32), range: f32, damage: u32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::Basic,
            cell: CellCoord::new(cell.0, cell.1),
            range,
            damage,
            ready_in: Duration::ZERO,
            target: None,
            laser: 0.0,
        }
    }

    fn enemy(id: u32, position: (f32, f32), health: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKind::Basic,
            position: WorldPoint::new(position.0, position.1),
            waypoint: 1,
            health,
            max_health: 100,
            radius: 0.3,
            color: Color::from_rgb(0xe7, 0x4c, 0x3c),
            alive: true,
            reached_end: false,
        }
    }

    fn run(towers: Vec<TowerSnapshot>, enemies: Vec<EnemySnapshot>) -> Vec<TowerTarget> {
        let mut system = TowerTargeting::new();
        let mut out = Vec::new();
        system.handle(
            &TowerView::from_snapshots(towers),
            &EnemyView::from_snapshots(enemies),
            &mut out,
        );
        out
    }

    #[test]
    fn lowest_health_enemy_in_range_is_chosen() {
        let out = run(
            vec![tower(0, (2, 2), 3.0, 20)],
            vec![enemy(0, (3.5, 2.5), 50), enemy(1, (1.5, 2.5), 10)],
        );

        assert_eq!(
            out,
            vec![TowerTarget {
                tower: TowerId::new(0),
                enemy: EnemyId::new(1),
            }]
        );
    }

    #[test]
    fn enemy_outside_range_is_ignored() {
        let out = run(
            vec![tower(0, (0, 0), 2.5, 8)],
            vec![enemy(0, (5.5, 0.5), 10)],
        );

        assert!(out.is_empty());
    }

    #[test]
    fn range_boundary_is_inclusive() {
        let out = run(
            vec![tower(0, (0, 0), 3.0, 8)],
            vec![enemy(0, (3.5, 0.5), 10)],
        );

        assert_eq!(out.len(), 1);
    }

    #[test]
    fn cooling_towers_do_not_aim() {
        let mut cooling = tower(0, (0, 0), 3.0, 20);
        cooling.ready_in = Duration::from_millis(200);

        let out = run(vec![cooling], vec![enemy(0, (0.5, 1.5), 10)]);

        assert!(out.is_empty());
    }

    #[test]
    fn ties_prefer_the_earliest_spawn() {
        let out = run(
            vec![tower(0, (2, 2), 3.0, 20)],
            vec![enemy(7, (3.5, 2.5), 40), enemy(3, (1.5, 2.5), 40)],
        );

        assert_eq!(out[0].enemy, EnemyId::new(3));
    }

    #[test]
    fn finished_enemies_are_not_candidates() {
        let mut dead = enemy(0, (0.5, 1.5), 0);
        dead.alive = false;

        let out = run(
            vec![tower(0, (0, 0), 3.0, 20)],
            vec![dead, enemy(1, (1.5, 0.5), 90)],
        );

        assert_eq!(out[0].enemy, EnemyId::new(1));
    }

    #[test]
    fn planned_kills_redirect_later_towers() {
        let out = run(
            vec![tower(0, (0, 0), 3.0, 20), tower(1, (0, 2), 3.0, 20)],
            vec![enemy(0, (0.5, 1.5), 15), enemy(1, (1.5, 1.5), 60)],
        );

        assert_eq!(
            out,
            vec![
                TowerTarget {
                    tower: TowerId::new(0),
                    enemy: EnemyId::new(0),
                },
                TowerTarget {
                    tower: TowerId::new(1),
                    enemy: EnemyId::new(1),
                },
            ]
        );
    }

    #[test]
    fn wounded_enemy_keeps_attracting_fire_until_lethal() {
        let out = run(
            vec![tower(0, (0, 0), 3.0, 10), tower(1, (0, 2), 3.0, 10)],
            vec![enemy(0, (0.5, 1.5), 25), enemy(1, (1.5, 1.5), 30)],
        );

        assert!(out.iter().all(|target| target.enemy == EnemyId::new(0)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn output_is_cleared_between_runs() {
        let mut system = TowerTargeting::new();
        let mut out = vec![TowerTarget {
            tower: TowerId::new(99),
            enemy: EnemyId::new(99),
        }];

        system.handle(
            &TowerView::from_snapshots(Vec::new()),
            &EnemyView::from_snapshots(vec![enemy(0, (0.5, 0.5), 10)]),
            &mut out,
        );

        assert!(out.is_empty());
    }
}
