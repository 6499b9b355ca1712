//! Enemy state machine: walking the path, taking damage, finishing.

use tile_defence_core::{EnemyId, EnemyKind, EnemySnapshot, EnemyStats, Path, WorldPoint};

/// Single enemy walking the level path.
///
/// An enemy is `Advancing` while it is alive and has a waypoint ahead. It
/// becomes `Finished` either by reaching the last waypoint (a leak,
/// `reached_end == true`) or by losing all health (a kill,
/// `reached_end == false`). Both outcomes clear `alive`.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
    stats: EnemyStats,
    position: WorldPoint,
    waypoint: usize,
    target: Option<WorldPoint>,
    health: u32,
    alive: bool,
    reached_end: bool,
}

impl Enemy {
    /// Places a new enemy on the first waypoint, facing the second one.
    pub(crate) fn spawn(id: EnemyId, kind: EnemyKind, stats: EnemyStats, path: &Path) -> Self {
        let position = path.get(0).map(|cell| cell.center()).unwrap_or_default();
        let mut enemy = Self {
            id,
            kind,
            stats,
            position,
            waypoint: 0,
            target: None,
            health: stats.health,
            alive: true,
            reached_end: false,
        };
        enemy.advance_target(path);
        enemy
    }

    pub(crate) fn id(&self) -> EnemyId {
        self.id
    }

    pub(crate) fn kind(&self) -> EnemyKind {
        self.kind
    }

    pub(crate) fn stats(&self) -> &EnemyStats {
        &self.stats
    }

    pub(crate) fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive
    }

    pub(crate) fn reached_end(&self) -> bool {
        self.reached_end
    }

    /// Moves toward the current waypoint for `dt` seconds.
    ///
    /// Crosses at most one waypoint per call: when the remaining distance is
    /// within reach the enemy snaps exactly onto the waypoint and only then
    /// picks the next one.
    pub(crate) fn update(&mut self, dt: f32, path: &Path) {
        if !self.alive {
            return;
        }
        let Some(target) = self.target else {
            return;
        };

        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let distance = (dx * dx + dy * dy).sqrt();
        let step = self.stats.speed * dt;

        if distance <= step {
            self.position = target;
            self.advance_target(path);
        } else {
            self.position.x += dx / distance * step;
            self.position.y += dy / distance * step;
        }
    }

    /// Subtracts health, killing the enemy once it reaches zero.
    pub(crate) fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.alive = false;
        }
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            waypoint: self.waypoint,
            health: self.health,
            max_health: self.stats.health,
            radius: self.stats.radius,
            color: self.stats.color,
            alive: self.alive,
            reached_end: self.reached_end,
        }
    }

    fn advance_target(&mut self, path: &Path) {
        match path.get(self.waypoint + 1) {
            Some(cell) => {
                self.waypoint += 1;
                self.target = Some(cell.center());
            }
            None => {
                self.target = None;
                self.reached_end = true;
                self.alive = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_defence_core::{Archetypes, CellCoord};

    fn straight_path(length: u32) -> Path {
        Path::new((0..length).map(|column| CellCoord::new(column, 0)).collect())
    }

    fn basic(path: &Path) -> Enemy {
        let stats = Archetypes::default().enemy(EnemyKind::Basic);
        Enemy::spawn(EnemyId::new(0), EnemyKind::Basic, stats, path)
    }

    #[test]
    fn spawns_on_first_waypoint_center() {
        let path = straight_path(3);
        let enemy = basic(&path);

        assert_eq!(enemy.position(), WorldPoint::new(0.5, 0.5));
        assert_eq!(enemy.snapshot().waypoint, 1);
        assert!(enemy.is_alive());
    }

    #[test]
    fn large_step_snaps_onto_waypoint_without_overshoot() {
        let path = straight_path(3);
        let mut enemy = basic(&path);

        enemy.update(10.0, &path);

        assert_eq!(enemy.position(), WorldPoint::new(1.5, 0.5));
        assert_eq!(enemy.snapshot().waypoint, 2);
        assert!(enemy.is_alive());
    }

    #[test]
    fn small_step_moves_along_direction() {
        let path = straight_path(3);
        let mut enemy = basic(&path);

        enemy.update(0.25, &path);

        let position = enemy.position();
        assert!((position.x - 1.0).abs() < 1e-6);
        assert!((position.y - 0.5).abs() < 1e-6);
        assert_eq!(enemy.snapshot().waypoint, 1);
    }

    #[test]
    fn crosses_at_most_one_waypoint_per_update() {
        let path = straight_path(5);
        let mut enemy = basic(&path);

        enemy.update(100.0, &path);
        assert_eq!(enemy.position(), WorldPoint::new(1.5, 0.5));

        enemy.update(100.0, &path);
        assert_eq!(enemy.position(), WorldPoint::new(2.5, 0.5));
    }

    #[test]
    fn reaching_final_waypoint_marks_leak() {
        let path = straight_path(2);
        let mut enemy = basic(&path);

        enemy.update(10.0, &path);

        assert_eq!(enemy.position(), WorldPoint::new(1.5, 0.5));
        assert!(!enemy.is_alive());
        assert!(enemy.reached_end());
    }

    #[test]
    fn lethal_damage_marks_kill_not_leak() {
        let path = straight_path(3);
        let mut enemy = basic(&path);

        enemy.take_damage(60);
        assert!(enemy.is_alive());
        assert_eq!(enemy.snapshot().health, 40);

        enemy.take_damage(60);
        assert_eq!(enemy.snapshot().health, 0);
        assert!(!enemy.is_alive());
        assert!(!enemy.reached_end());
    }

    #[test]
    fn finished_enemy_no_longer_moves() {
        let path = straight_path(3);
        let mut enemy = basic(&path);
        enemy.take_damage(u32::MAX);

        enemy.update(10.0, &path);

        assert_eq!(enemy.position(), WorldPoint::new(0.5, 0.5));
    }

    #[test]
    fn single_waypoint_path_finishes_on_spawn() {
        let path = straight_path(1);
        let enemy = basic(&path);

        assert!(!enemy.is_alive());
        assert!(enemy.reached_end());
    }
}
