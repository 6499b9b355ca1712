#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits firing commands from targeting data.

use tile_defence_core::{Command, TowerId, TowerSnapshot, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
    fired: Vec<TowerId>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireTower` entries for towers ready to fire.
    ///
    /// Targets naming unknown or cooling towers are skipped, and a tower
    /// fires at most once per call.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        let snapshots = towers.as_slice();
        if snapshots.is_empty() {
            return;
        }

        self.scratch.clear();
        self.fired.clear();

        for target in tower_targets {
            let Some(snapshot) = find_tower(snapshots, target.tower) else {
                continue;
            };
            if !snapshot.is_ready() || self.fired.contains(&target.tower) {
                continue;
            }

            self.fired.push(target.tower);
            self.scratch.push(Command::FireTower {
                tower: target.tower,
                target: target.enemy,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_tower(snapshots: &[TowerSnapshot], tower: TowerId) -> Option<&TowerSnapshot> {
    snapshots
        .binary_search_by_key(&tower, |snapshot| snapshot.id)
        .ok()
        .map(|index| &snapshots[index])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tile_defence_core::{CellCoord, EnemyId, TowerKind};

    #[test]
    fn firing_respects_cooldown_readiness() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            snapshot(5, Duration::ZERO),
            snapshot(2, Duration::ZERO),
        ]);
        let targets = vec![target(2, 4), target(5, 1)];
        let mut out = Vec::new();

        system.handle(&towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![
                Command::FireTower {
                    tower: TowerId::new(2),
                    target: EnemyId::new(4),
                },
                Command::FireTower {
                    tower: TowerId::new(5),
                    target: EnemyId::new(1),
                },
            ],
        );
    }

    #[test]
    fn non_ready_or_missing_towers_are_skipped() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![
            snapshot(3, Duration::from_millis(250)),
            snapshot(8, Duration::ZERO),
        ]);
        let targets = vec![target(3, 9), target(8, 2), target(42, 3)];
        let mut out = Vec::new();

        system.handle(&towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireTower {
                tower: TowerId::new(8),
                target: EnemyId::new(2),
            }],
        );
    }

    #[test]
    fn towers_fire_at_most_once_per_call() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let targets = vec![target(1, 4), target(1, 5)];
        let mut out = Vec::new();

        system.handle(&towers, &targets, &mut out);

        assert_eq!(
            out,
            vec![Command::FireTower {
                tower: TowerId::new(1),
                target: EnemyId::new(4),
            }],
        );
    }

    #[test]
    fn output_buffer_is_appended_not_replaced() {
        let mut system = TowerCombat::new();
        let towers = TowerView::from_snapshots(vec![snapshot(1, Duration::ZERO)]);
        let mut out = vec![Command::CompleteWave];

        system.handle(&towers, &[target(1, 0)], &mut out);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Command::CompleteWave);
    }

    fn snapshot(tower: u32, ready_in: Duration) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(tower),
            kind: TowerKind::Basic,
            cell: CellCoord::new(tower, 0),
            range: 3.0,
            damage: 20,
            ready_in,
            target: None,
            laser: 0.0,
        }
    }

    fn target(tower: u32, enemy: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            enemy: EnemyId::new(enemy),
        }
    }
}
