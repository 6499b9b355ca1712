//! Player health, money, wave tally and scoring.

use std::time::Duration;

use tile_defence_core::{HudSnapshot, MatchState, ScoreBreakdown};

const HEALTH_POINTS_PER_PERCENT: u64 = 50;
const MONEY_POINTS_PER_UNIT: u64 = 2;
const TIME_POINTS_BUDGET: f64 = 10_000.0;
const TIME_POINTS_PER_SECOND: f64 = 50.0;

/// Session economy owned by the world.
#[derive(Clone, Debug, Default)]
pub(crate) struct Economy {
    pub(crate) health: u32,
    pub(crate) max_health: u32,
    pub(crate) money: u32,
    pub(crate) wave_kill_value: u32,
    /// Simulated time spent inside waves.
    pub(crate) elapsed: Duration,
    pub(crate) wave: u32,
    pub(crate) total_waves: u32,
    pub(crate) wave_in_progress: bool,
    pub(crate) score: Option<ScoreBreakdown>,
}

impl Economy {
    pub(crate) fn new(health: u32, money: u32, total_waves: u32) -> Self {
        Self {
            health,
            max_health: health,
            money,
            total_waves,
            ..Self::default()
        }
    }

    pub(crate) fn credit_kill(&mut self, bounty: u32) {
        self.money = self.money.saturating_add(bounty);
        self.wave_kill_value = self.wave_kill_value.saturating_add(bounty);
    }

    /// Removes health for a leaked enemy and reports whether the player died.
    pub(crate) fn apply_leak(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        self.health == 0
    }

    /// Deducts the amount, refusing when funds are insufficient.
    pub(crate) fn spend(&mut self, amount: u32) -> bool {
        match self.money.checked_sub(amount) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn begin_wave(&mut self, wave: u32, total: u32) {
        self.wave = wave;
        self.total_waves = total;
        self.wave_in_progress = true;
        self.wave_kill_value = 0;
    }

    /// Closes the wave in progress and pays a quarter of its kill value.
    pub(crate) fn complete_wave(&mut self) -> u32 {
        let bonus = wave_bonus(self.wave_kill_value);
        self.money = self.money.saturating_add(bonus);
        self.wave_in_progress = false;
        bonus
    }

    pub(crate) fn hud(&self, state: MatchState) -> HudSnapshot {
        HudSnapshot {
            health: self.health,
            max_health: self.max_health,
            money: self.money,
            wave: self.wave,
            total_waves: self.total_waves,
            wave_in_progress: self.wave_in_progress,
            wave_kill_value: self.wave_kill_value,
            state,
            score: self.score,
        }
    }
}

/// Wave-clear bonus: a quarter of the kill value, rounded down.
pub(crate) fn wave_bonus(kill_value: u32) -> u32 {
    kill_value / 4
}

/// Computes the victory score from the final session state.
pub(crate) fn victory_score(
    health: u32,
    max_health: u32,
    money: u32,
    elapsed: Duration,
) -> ScoreBreakdown {
    let health_percent = if max_health == 0 {
        0
    } else {
        (f64::from(health) * 100.0 / f64::from(max_health)).round() as u32
    };
    let health_points = u64::from(health_percent) * HEALTH_POINTS_PER_PERCENT;
    let money_points = u64::from(money) * MONEY_POINTS_PER_UNIT;
    let time_points = (TIME_POINTS_BUDGET - elapsed.as_secs_f64() * TIME_POINTS_PER_SECOND)
        .max(0.0)
        .floor() as u64;

    ScoreBreakdown {
        health_percent,
        health_points,
        money_points,
        time_points,
        total: health_points + money_points + time_points,
    }
}
