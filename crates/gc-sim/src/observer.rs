//! Simulation observer trait for progress reporting and data collection.

use gc_agent::Population;
use gc_core::Tick;
use gc_spatial::RiskMap;

/// Population-wide figures after one timestep.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepSummary {
    pub tick:           Tick,
    /// Absolute time of the step, in days.
    pub time_days:      f64,
    pub alive:          usize,
    pub dead:           usize,
    pub infected:       usize,
    pub infectious:     usize,
    pub immune:         usize,
    pub confirmed:      usize,
    /// Infections started this step, from any route.
    pub new_infections: usize,
    /// Deaths from disease this step.
    pub deaths:         usize,
    /// Agents that left because their trajectory ended this step.
    pub departures:     usize,
    pub recoveries:     usize,
    /// Logged interactions replayed this step.
    pub interactions:   usize,
    /// Contact-tracing ledger size after the step.
    pub ledger_size:    usize,
}

/// Callbacks invoked by [`Simulation::run`][crate::Simulation::run] at key
/// points in the timestep loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_step_end(&mut self, s: &StepSummary) {
///         if s.tick.is_every(self.interval) {
///             println!("{}: {} infected", s.tick, s.infected);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before a step runs.  `time_days` is the time it will reach.
    fn on_step_start(&mut self, _tick: Tick, _time_days: f64) {}

    /// Called after every step.
    fn on_step_end(&mut self, _summary: &StepSummary) {}

    /// Called every `run.output_interval_steps` steps with read access to
    /// every agent.
    fn on_snapshot(&mut self, _tick: Tick, _population: &Population) {}

    /// Called once after the final step with the normalized risk map.
    fn on_sim_end(&mut self, _final_tick: Tick, _risk: &RiskMap) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
