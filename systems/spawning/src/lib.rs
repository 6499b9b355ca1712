#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler responsible for emitting enemy spawn commands.

use std::{collections::VecDeque, time::Duration};

use tile_defence_core::{Command, EnemyKind, Event, WaveDescriptor};
use tracing::debug;

/// Progress reported when a wave starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// One-based number of the wave that started.
    pub current: u32,
    /// Number of waves in the level.
    pub total: u32,
}

/// Coarse lifecycle of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// No wave has been started since the last load.
    Idle,
    /// Spawns of the wave are still pending.
    Spawning {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Every spawn of a non-final wave was emitted.
    Drained {
        /// One-based number of the wave.
        wave: u32,
    },
    /// Every spawn of the final wave was emitted.
    AllWavesComplete,
}

/// Pure system that releases the enemies of the current wave over time.
#[derive(Debug, Default)]
pub struct WaveScheduler {
    waves: Vec<WaveDescriptor>,
    current: Option<usize>,
    queue: VecDeque<EnemyKind>,
    spawn_timer: Duration,
    spawn_interval: Duration,
}

impl WaveScheduler {
    /// Creates a scheduler without any waves.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the wave list and rewinds to before the first wave.
    pub fn load(&mut self, waves: &[WaveDescriptor]) {
        self.waves = waves.to_vec();
        self.current = None;
        self.queue.clear();
        self.spawn_timer = Duration::ZERO;
        self.spawn_interval = Duration::ZERO;
    }

    /// Drops every wave and pending spawn.
    pub fn clear(&mut self) {
        self.load(&[]);
    }

    /// Queues the spawns of the next wave.
    ///
    /// Returns `None` once every wave was started, on every later call, and
    /// leaves the scheduler untouched in that case. The first spawn of a
    /// started wave happens on the next time step.
    pub fn start_next_wave(&mut self) -> Option<WaveStatus> {
        let next = self.current.map_or(0, |index| index + 1);
        let wave = *self.waves.get(next)?;

        self.current = Some(next);
        self.queue = std::iter::repeat(wave.kind)
            .take(wave.count as usize)
            .collect();
        self.spawn_interval = wave.interval();
        self.spawn_timer = Duration::ZERO;

        let status = WaveStatus {
            current: wave_number(next),
            total: self.total_waves(),
        };
        debug!(
            wave = status.current,
            kind = %wave.kind,
            count = wave.count,
            "wave queued"
        );
        Some(status)
    }

    /// Consumes events to emit spawn commands.
    ///
    /// Every `TimeAdvanced` event counts the spawn timer down; when it runs
    /// out a single enemy is released and the timer restarts at the wave's
    /// interval.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            let Event::TimeAdvanced { dt } = event else {
                continue;
            };
            if self.queue.is_empty() {
                return;
            }

            self.spawn_timer = self.spawn_timer.saturating_sub(*dt);
            if !self.spawn_timer.is_zero() {
                continue;
            }
            if let Some(kind) = self.queue.pop_front() {
                out.push(Command::SpawnEnemy { kind });
                self.spawn_timer = self.spawn_interval;
            }
        }
    }

    /// Reports whether spawns of the current wave are still pending.
    #[must_use]
    pub fn is_spawning(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Reports whether the current wave is the final one.
    ///
    /// A level without waves counts as being on its last wave.
    #[must_use]
    pub fn is_last_wave(&self) -> bool {
        match self.current {
            Some(index) => index + 1 >= self.waves.len(),
            None => self.waves.is_empty(),
        }
    }

    /// One-based number of the current wave, zero before the first wave.
    #[must_use]
    pub fn current_wave(&self) -> u32 {
        self.current.map_or(0, wave_number)
    }

    /// Number of waves loaded.
    #[must_use]
    pub fn total_waves(&self) -> u32 {
        u32::try_from(self.waves.len()).unwrap_or(u32::MAX)
    }

    /// Number of spawns left in the current wave.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.queue.len()
    }

    /// Coarse lifecycle of the scheduler.
    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        let Some(index) = self.current else {
            return SchedulerPhase::Idle;
        };
        let wave = wave_number(index);
        if self.is_spawning() {
            SchedulerPhase::Spawning { wave }
        } else if self.is_last_wave() {
            SchedulerPhase::AllWavesComplete
        } else {
            SchedulerPhase::Drained { wave }
        }
    }
}

fn wave_number(index: usize) -> u32 {
    u32::try_from(index.saturating_add(1)).unwrap_or(u32::MAX)
}
