//! Seasonal spawning state machine for mature females.
//!
//! ```text
//!   WaitingForSeason ──(day of year enters season)──▶ CountingDown
//!         ▲                                                │
//!         └──────────────(season ends)─────────────────────┘
//! ```
//!
//! While counting down, `time_to_spawn` (days) decreases every step. When it
//! drops below zero one batch is released. Batch spawners then wait
//! `recovery_period` more days (carrying the overshoot); single spawners wait
//! for the next season.

use serde::{Deserialize, Serialize};

use crate::context::RandomSource;

/// Spawning parameters of a stage that releases offspring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawningParams {
    /// 1-based day of year the season opens.
    pub first_day_spawning: f64,
    /// Season length in days.
    pub length_spawning_season: f64,
    /// Days between batches for batch spawners.
    pub recovery_period: f64,
    /// Countdown (days) set when the season opens.
    pub initial_spawn_delay: f64,
    /// Draw the initial countdown uniformly from `[0, initial_spawn_delay)`.
    pub randomize_spawn_time: bool,
    /// Spawns repeatedly within a season.
    pub batch_spawner: bool,
}

impl SpawningParams {
    /// True when `day_of_year` lies in `[first, first + length)`, wrapping at year end.
    pub fn in_season(&self, day_of_year: f64, days_in_year: f64) -> bool {
        let offset = (day_of_year - self.first_day_spawning).rem_euclid(days_in_year);
        offset < self.length_spawning_season
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnPhase {
    WaitingForSeason,
    CountingDown,
}

/// Per-entity spawning state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawningState {
    pub phase: SpawnPhase,
    /// Days until the next batch; infinite once a single spawner has spawned.
    pub time_to_spawn: f64,
    /// Countdown length the current wait started from, for gonad development.
    pub countdown_length: f64,
    /// Batches released over the entity's life.
    pub batches: u32,
}

impl Default for SpawningState {
    fn default() -> Self {
        Self {
            phase: SpawnPhase::WaitingForSeason,
            time_to_spawn: f64::INFINITY,
            countdown_length: 0.0,
            batches: 0,
        }
    }
}

impl SpawningState {
    /// Advance by `dt_days`. Returns true if a batch is due this step.
    ///
    /// The countdown starts on the step the season opens and is first
    /// decremented on the following step.
    pub fn advance(
        &mut self,
        params: &SpawningParams,
        day_of_year: f64,
        days_in_year: f64,
        dt_days: f64,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let in_season = params.in_season(day_of_year, days_in_year);
        match self.phase {
            SpawnPhase::WaitingForSeason => {
                if in_season {
                    let delay = if params.randomize_spawn_time {
                        rng.uniform(0.0, params.initial_spawn_delay)
                    } else {
                        params.initial_spawn_delay
                    };
                    self.phase = SpawnPhase::CountingDown;
                    self.time_to_spawn = delay;
                    self.countdown_length = delay;
                }
                false
            }
            SpawnPhase::CountingDown => {
                if !in_season {
                    self.phase = SpawnPhase::WaitingForSeason;
                    self.time_to_spawn = f64::INFINITY;
                    self.countdown_length = 0.0;
                    return false;
                }
                self.time_to_spawn -= dt_days;
                if self.time_to_spawn >= 0.0 {
                    return false;
                }
                self.batches += 1;
                if params.batch_spawner {
                    self.time_to_spawn += params.recovery_period;
                    self.countdown_length = params.recovery_period;
                } else {
                    self.time_to_spawn = f64::INFINITY;
                    self.countdown_length = 0.0;
                }
                true
            }
        }
    }

    /// Gonad maturity in `[0, 1]`: how far the current countdown has run.
    pub fn gonad_stage(&self) -> f64 {
        if self.phase != SpawnPhase::CountingDown || !self.time_to_spawn.is_finite() {
            return 0.0;
        }
        if self.countdown_length <= 0.0 {
            return 1.0;
        }
        (1.0 - self.time_to_spawn / self.countdown_length).clamp(0.0, 1.0)
    }
}
