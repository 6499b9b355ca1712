//! Authoritative tower state management utilities.

use std::{collections::BTreeMap, time::Duration};

use tile_defence_core::{CellCoord, EnemyId, TowerId, TowerKind, TowerSnapshot, TowerStats};

/// Rate at which the laser indicator fades, in intensity per second.
const LASER_FADE_PER_SECOND: f32 = 5.0;

/// Tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    /// Identifier allocated by the world for the tower.
    pub(crate) id: TowerId,
    /// Kind of tower that was constructed.
    pub(crate) kind: TowerKind,
    /// Cell occupied by the tower.
    pub(crate) cell: CellCoord,
    /// Stat record captured at construction.
    pub(crate) stats: TowerStats,
    ready_in: Duration,
    target: Option<EnemyId>,
    laser: f32,
}

impl TowerState {
    /// Reports whether the cooldown elapsed.
    pub(crate) fn is_ready(&self) -> bool {
        self.ready_in.is_zero()
    }

    /// Records a shot at the provided enemy and restarts the cooldown.
    pub(crate) fn record_shot(&mut self, target: EnemyId) {
        self.ready_in = self.stats.cooldown();
        self.target = Some(target);
        self.laser = 1.0;
    }

    /// Counts the cooldown and laser down. The target is kept until the next shot.
    fn cool_down(&mut self, dt: Duration) {
        self.ready_in = self.ready_in.saturating_sub(dt);
        self.laser = (self.laser - dt.as_secs_f32() * LASER_FADE_PER_SECOND).max(0.0);
    }

    fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
            range: self.stats.range,
            damage: self.stats.damage,
            ready_in: self.ready_in,
            target: self.target,
            laser: self.laser,
        }
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_tower_id: TowerId,
}

impl TowerRegistry {
    /// Creates an empty tower registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_tower_id: TowerId::new(0),
        }
    }

    /// Inserts a ready-to-fire tower and returns its identifier.
    pub(crate) fn insert(&mut self, kind: TowerKind, cell: CellCoord, stats: TowerStats) -> TowerId {
        let id = self.next_tower_id;
        self.next_tower_id = TowerId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                cell,
                stats,
                ready_in: Duration::ZERO,
                target: None,
                laser: 0.0,
            },
        );
        id
    }

    /// Identifier of the tower occupying the cell, if any.
    pub(crate) fn tower_at(&self, cell: CellCoord) -> Option<TowerId> {
        self.entries
            .values()
            .find(|tower| tower.cell == cell)
            .map(|tower| tower.id)
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Advances every cooldown and laser fade by `dt`.
    pub(crate) fn cool_down(&mut self, dt: Duration) {
        for tower in self.entries.values_mut() {
            tower.cool_down(dt);
        }
    }

    pub(crate) fn snapshots(&self) -> Vec<TowerSnapshot> {
        self.entries.values().map(TowerState::snapshot).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Removes every tower and restarts identifier allocation.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_tower_id = TowerId::new(0);
    }
}
