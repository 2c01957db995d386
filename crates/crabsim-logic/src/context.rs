//! Injected run context: random stream, calendar and lineage ids.
//!
//! Nothing here is global. The driver owns one of each and lends them to
//! every entity step, so a seeded run is reproducible end to end.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Seconds in one simulation day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Odd multiplier used to spread per-entity seeds across the stream space.
const STREAM_DERIVATION_PRIME: u64 = 0x9E37_79B9_7F4A_7C15;

/// Any 400 consecutive Gregorian years hold 97 leap days.
const DAYS_PER_GREGORIAN_CYCLE: f64 = 146_097.0;

// ============================================================================
// RANDOM SOURCE
// ============================================================================

/// Source of the variates used for stochastic development and diffusion.
pub trait RandomSource {
    /// Standard normal variate, N(0, 1).
    fn normal(&mut self) -> f64;

    /// Uniform variate on `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64;
}

/// ChaCha-backed random stream seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha12Rng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Independent stream for one entity, for drivers that step entities in parallel.
    pub fn for_entity(base_seed: u64, entity_id: u64) -> Self {
        Self::new(base_seed.wrapping_add(entity_id.wrapping_mul(STREAM_DERIVATION_PRIME)))
    }
}

impl RandomSource for SeededRandom {
    fn normal(&mut self) -> f64 {
        // Box-Muller; u1 is kept off zero so ln() stays finite.
        let u1: f64 = self.rng.gen::<f64>().max(f64::MIN_POSITIVE);
        let u2: f64 = self.rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..hi)
    }
}

// ============================================================================
// CALENDAR
// ============================================================================

/// Maps an epoch offset in seconds onto the civil calendar.
///
/// `epoch_day_of_year` is 1-based and may be fractional (1.5 = noon on Jan 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub epoch_year: i32,
    pub epoch_day_of_year: f64,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            epoch_year: 2000,
            epoch_day_of_year: 1.0,
        }
    }
}

impl Calendar {
    pub fn new(epoch_year: i32, epoch_day_of_year: f64) -> Self {
        Self {
            epoch_year,
            epoch_day_of_year,
        }
    }

    /// Fractional 1-based day of year at `offset_seconds` after the epoch.
    pub fn day_of_year(&self, offset_seconds: f64) -> f64 {
        self.resolve(offset_seconds).1
    }

    /// Calendar year at `offset_seconds` after the epoch.
    pub fn year(&self, offset_seconds: f64) -> i32 {
        self.resolve(offset_seconds).0
    }

    /// A non-finite offset resolves to the epoch year and a NaN day, which
    /// the stepper rejects as a domain error.
    fn resolve(&self, offset_seconds: f64) -> (i32, f64) {
        // zero-based days since Jan 1 of the epoch year
        let days = self.epoch_day_of_year - 1.0 + offset_seconds / SECONDS_PER_DAY;
        if !days.is_finite() {
            return (self.epoch_year, f64::NAN);
        }

        // whole 400-year cycles first; the walk below then covers < 400 years
        let cycles = days.div_euclid(DAYS_PER_GREGORIAN_CYCLE);
        let mut days = days.rem_euclid(DAYS_PER_GREGORIAN_CYCLE);
        let shift = (cycles * 400.0).clamp(i32::MIN as f64, i32::MAX as f64) as i32;
        let mut year = self.epoch_year.saturating_add(shift);
        while days >= days_in_year(year) {
            days -= days_in_year(year);
            year = year.saturating_add(1);
        }
        (year, days + 1.0)
    }
}

/// Number of days in a Gregorian year.
pub fn days_in_year(year: i32) -> f64 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366.0
    } else {
        365.0
    }
}

// ============================================================================
// LINEAGE IDS
// ============================================================================

/// Hands out entity ids that are unique for the run.
pub trait LineageIds {
    fn next_id(&mut self) -> u64;
}

/// Monotonic id counter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    /// Counter whose first issued id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Id the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl LineageIds for SequentialIds {
    fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

// ============================================================================
// STEP CONTEXT
// ============================================================================

/// Everything an entity may read (or draw from) while it steps.
pub struct StepContext<'a> {
    /// Seconds since the calendar epoch at the start of the step.
    pub time: f64,
    pub rng: &'a mut dyn RandomSource,
    pub calendar: &'a Calendar,
    pub ids: &'a mut dyn LineageIds,
}

impl<'a> StepContext<'a> {
    pub fn new(
        time: f64,
        rng: &'a mut dyn RandomSource,
        calendar: &'a Calendar,
        ids: &'a mut dyn LineageIds,
    ) -> Self {
        Self {
            time,
            rng,
            calendar,
            ids,
        }
    }

    pub fn day_of_year(&self) -> f64 {
        self.calendar.day_of_year(self.time)
    }
}
