//! The `Simulation` struct and its timestep loop.

use gc_agent::{ContactLedger, DiseaseParams, Population, StepOutcome, World};
use gc_core::{AgentId, SimClock, SimConfig, SimRng};
use gc_population::InteractionLog;
use gc_spatial::{DualGrid, RiskGrid, RiskMap};
use log::{debug, info};

use crate::transmission::transmit;
use crate::{SimError, SimObserver, SimResult, StepSummary};

/// The main simulation runner.
///
/// Each step runs five phases in order:
///
/// 1. **Clock**: advance one timestep.
/// 2. **Stepping** (optionally parallel with the `parallel` feature): every
///    agent follows its trajectory up to the new time, marks the risk grid
///    if infected and counts its disease timers down.
/// 3. **Interactions**: replay logged proximity events that are now due.
/// 4. **Transmission**: infectious agents expose their cell-mates.
/// 5. **Notification** (every `run.notify_interval_steps`): every agent
///    checks its interaction history against the contact-tracing ledger.
///
/// Phases 3–5 draw from a single [`SimRng`] in ascending agent order, so a
/// seed reproduces a run regardless of thread count.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Simulation {
    pub config: SimConfig,
    pub clock:  SimClock,

    pub(crate) grid:         DualGrid,
    pub(crate) risk:         RiskGrid,
    pub(crate) ledger:       ContactLedger,
    pub(crate) params:       DiseaseParams,
    pub(crate) population:   Population,
    pub(crate) interactions: InteractionLog,
    pub(crate) rng:          SimRng,
    pub(crate) index_case:   AgentId,
}

/// Per-step tallies from the stepping phase.
#[derive(Default)]
struct SteppingTally {
    deaths:     usize,
    departures: usize,
    recoveries: usize,
}

impl Simulation {
    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn grid(&self) -> &DualGrid {
        &self.grid
    }

    pub fn risk(&self) -> &RiskGrid {
        &self.risk
    }

    pub fn ledger(&self) -> &ContactLedger {
        &self.ledger
    }

    pub fn params(&self) -> &DiseaseParams {
        &self.params
    }

    /// The agent infected at start.
    pub fn index_case(&self) -> AgentId {
        self.index_case
    }

    /// `true` once the configured number of steps has run.
    pub fn is_done(&self) -> bool {
        self.clock.current_tick.0 >= self.config.timing.steps
    }

    /// Normalize the risk accumulated so far.
    pub fn risk_map(&self) -> RiskMap {
        self.risk.normalize()
    }

    /// Mutable access to the population with a [`World`] over the shared
    /// services, for scripted scenarios (e.g. confirming a case mid-run).
    pub fn population_mut(&mut self) -> (&mut Population, World<'_>) {
        let world = World {
            grid:   &self.grid,
            risk:   &self.risk,
            ledger: &self.ledger,
            params: &self.params,
        };
        (&mut self.population, world)
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run the remaining configured steps and return the normalized risk map.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RiskMap> {
        info!(
            "running {} steps of {:.6} days from day {:.5} with {} agents",
            self.config.timing.steps.saturating_sub(self.clock.current_tick.0),
            self.clock.step_days,
            self.clock.now_days(),
            self.population.len()
        );
        while !self.is_done() {
            self.step_observed(observer)?;
        }
        let map = self.risk_map();
        let counts = self.population.counts();
        info!(
            "finished at {}: {} alive, {} dead, {} immune, {} hot cells",
            self.clock,
            counts.alive,
            counts.dead,
            counts.immune,
            map.hot_cells()
        );
        observer.on_sim_end(self.clock.current_tick, &map);
        Ok(map)
    }

    /// Run exactly `n` steps from the current position (ignores
    /// `timing.steps`).
    pub fn run_steps<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step_observed(observer)?;
        }
        Ok(())
    }

    fn step_observed<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<StepSummary> {
        let next = self.clock.current_tick + 1;
        observer.on_step_start(next, self.clock.time_at(next));
        let summary = self.step()?;
        observer.on_step_end(&summary);
        if summary.tick.is_every(self.config.run.output_interval_steps) {
            observer.on_snapshot(summary.tick, &self.population);
        }
        Ok(summary)
    }

    /// Advance one timestep.
    pub fn step(&mut self) -> SimResult<StepSummary> {
        let infected_before = self.population.counts().infected;

        // ── Phase 1: clock ────────────────────────────────────────────────
        let t = self.clock.advance();
        let tick = self.clock.current_tick;

        // Explicit field borrows so the borrow checker sees disjoint access.
        let world = World {
            grid:   &self.grid,
            risk:   &self.risk,
            ledger: &self.ledger,
            params: &self.params,
        };
        let population = &mut self.population;
        let rng = &mut self.rng;

        // ── Phase 2: stepping ─────────────────────────────────────────────
        let tally = step_agents(population, t, &world)?;

        // ── Phase 3: logged interactions ──────────────────────────────────
        let mut new_infections = 0;
        let due = self.interactions.take_due(t);
        for event in due {
            if let Some(outcome) = population.interact(event.a, event.b, &world, rng) {
                new_infections += outcome.infected.len();
            }
        }
        let interactions = due.len();

        // ── Phase 4: transmission ─────────────────────────────────────────
        new_infections += transmit(population, &world, rng).len();

        // ── Phase 5: exposure notification ────────────────────────────────
        if tick.is_every(self.config.run.notify_interval_steps) {
            for agent in population.agents_mut() {
                let was_infected = agent.is_infected();
                if agent.check_for_sickness(&world) && !was_infected && agent.is_infected() {
                    new_infections += 1;
                }
            }
        }

        let counts = population.counts();
        let summary = StepSummary {
            tick,
            time_days: t,
            alive: counts.alive,
            dead: counts.dead,
            infected: counts.infected,
            infectious: counts.infectious,
            immune: counts.immune,
            confirmed: counts.confirmed,
            new_infections,
            deaths: tally.deaths,
            departures: tally.departures,
            recoveries: tally.recoveries,
            interactions,
            ledger_size: self.ledger.len(),
        };
        debug!(
            "{tick}: {} infected (+{new_infections}, was {infected_before}), {} alive, ledger {}",
            summary.infected, summary.alive, summary.ledger_size
        );
        Ok(summary)
    }
}

// ── Stepping phase ────────────────────────────────────────────────────────────

/// Step every agent to `t` and tally the outcomes.  Stops at the first
/// trajectory error.
fn step_agents(population: &mut Population, t: f64, world: &World<'_>) -> SimResult<SteppingTally> {
    let outcomes = step_all(population, t, world)?;
    let mut tally = SteppingTally::default();
    for outcome in outcomes {
        match outcome {
            StepOutcome::Died => tally.deaths += 1,
            StepOutcome::TrajectoryEnded => tally.departures += 1,
            StepOutcome::Recovered { .. } => tally.recoveries += 1,
            StepOutcome::Inactive | StepOutcome::Stepped => {}
        }
    }
    Ok(tally)
}

#[cfg(not(feature = "parallel"))]
fn step_all(population: &mut Population, t: f64, world: &World<'_>) -> SimResult<Vec<StepOutcome>> {
    population
        .agents_mut()
        .iter_mut()
        .map(|agent| agent.step_to(t, world).map_err(|e| SimError::stepping(agent.id(), e)))
        .collect()
}

#[cfg(feature = "parallel")]
fn step_all(population: &mut Population, t: f64, world: &World<'_>) -> SimResult<Vec<StepOutcome>> {
    use rayon::prelude::*;

    population
        .agents_mut()
        .par_iter_mut()
        .map(|agent| agent.step_to(t, world).map_err(|e| SimError::stepping(agent.id(), e)))
        .collect()
}
