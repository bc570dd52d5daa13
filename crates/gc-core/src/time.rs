//! Simulation time model.
//!
//! # Design
//!
//! The stepper counts whole timesteps with an integer `Tick`.  Trajectory
//! records, however, carry absolute timestamps as fractional days since an
//! epoch, so `SimClock` maps ticks onto that axis:
//!
//!   now_days = start_days + tick * step_days
//!
//! Keeping the step counter integral means the number of timesteps in a run
//! is exact no matter how small `step_days` is.

use std::fmt;

/// Seconds in one day; trajectory timestamps and durations are in days.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute timestep counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// `true` every `interval` ticks (never when `interval` is 0).
    #[inline]
    pub fn is_every(self, interval: u64) -> bool {
        interval > 0 && self.0 % interval == 0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Converts between tick counts and absolute time in days.
#[derive(Clone, Debug)]
pub struct SimClock {
    /// Absolute time (days since the trajectory epoch) of tick 0.
    pub start_days: f64,
    /// Length of one timestep in days.
    pub step_days: f64,
    /// The current tick, advanced by [`SimClock::advance`].
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(start_days: f64, step_days: f64) -> Self {
        Self { start_days, step_days, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick and return the new absolute time.
    #[inline]
    pub fn advance(&mut self) -> f64 {
        self.current_tick = self.current_tick + 1;
        self.now_days()
    }

    /// Absolute time of `tick`.
    #[inline]
    pub fn time_at(&self, tick: Tick) -> f64 {
        self.start_days + tick.0 as f64 * self.step_days
    }

    /// Absolute time of the current tick.
    #[inline]
    pub fn now_days(&self) -> f64 {
        self.time_at(self.current_tick)
    }

    /// Simulated days since tick 0.
    #[inline]
    pub fn elapsed_days(&self) -> f64 {
        self.current_tick.0 as f64 * self.step_days
    }

    /// Elapsed time as (day, hour, minute, second), for log lines.
    pub fn elapsed_dhms(&self) -> (u64, u32, u32, u32) {
        let total_secs = (self.elapsed_days() * SECONDS_PER_DAY).round().max(0.0) as u64;
        let days = total_secs / 86_400;
        let hours = ((total_secs % 86_400) / 3_600) as u32;
        let minutes = ((total_secs % 3_600) / 60) as u32;
        let seconds = (total_secs % 60) as u32;
        (days, hours, minutes, seconds)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (d, h, m, s) = self.elapsed_dhms();
        write!(f, "{} (day {} {:02}:{:02}:{:02})", self.current_tick, d, h, m, s)
    }
}
