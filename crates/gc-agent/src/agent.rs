//! The `Agent` state machine.
//!
//! An agent is either *mobile* (follows a recorded trajectory) or
//! *stationary* (a synthetic resident derived from a population raster that
//! never moves).  Both kinds share the same disease life cycle.
//!
//! All mutation of shared state goes through a [`World`]: grid relocation
//! and risk counting are internally synchronised, so `step_to` only needs
//! `&mut self` plus `&World` and can run on many agents in parallel.

use gc_core::{AgentId, AgentRng, GeoPoint, InteractionId};
use gc_spatial::{CellPair, DualGrid, RiskGrid};
use gc_trajectory::{TrajectoryCursor, TrajectoryRecord};
use rand_distr::{Distribution, Normal};

use crate::{AgentError, AgentResult, ContactLedger, DiseaseParams, Health, Stage};

// ── World ─────────────────────────────────────────────────────────────────────

/// Shared simulation services an agent acts against during a timestep.
#[derive(Copy, Clone)]
pub struct World<'a> {
    pub grid:   &'a DualGrid,
    pub risk:   &'a RiskGrid,
    pub ledger: &'a ContactLedger,
    pub params: &'a DiseaseParams,
}

// ── Locomotion ────────────────────────────────────────────────────────────────

/// How an agent gets its position.
#[derive(Debug)]
pub enum Locomotion {
    /// Follows a trajectory.  `fix` is the most recently consumed record.
    Mobile { cursor: TrajectoryCursor, fix: TrajectoryRecord },
    /// Fixed at `point` for the whole run.
    Stationary { point: GeoPoint },
}

/// What happened to an agent during one `step_to`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StepOutcome {
    /// Already dead; nothing happened.
    Inactive,
    /// Still alive.  May have moved or progressed its infection.
    Stepped,
    /// Ran out of trajectory data and left the simulation.
    TrajectoryEnded,
    /// Died at the end of its infectious period.
    Died,
    /// Survived its infection.
    Recovered { immune: bool },
}

// ── Agent ─────────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct Agent {
    id:             AgentId,
    label:          String,
    rng:            AgentRng,
    age:            f64,
    health:         Health,
    cells:          CellPair,
    locomotion:     Locomotion,
    /// Time of the last consumed record (mobile) or last step (stationary).
    clock:          f64,
    confirmed_code: Option<String>,
    history:        Vec<InteractionId>,
}

impl Agent {
    /// Build a mobile agent positioned at the first record of `cursor` and
    /// register it on both grids.
    pub fn mobile(
        id: AgentId,
        mut cursor: TrajectoryCursor,
        age: f64,
        rng: AgentRng,
        grid: &DualGrid,
    ) -> AgentResult<Self> {
        let Some(first) = cursor.advance()? else {
            return Err(AgentError::NoRecords(cursor.label().to_owned()));
        };
        let cells = grid.locate(first.point);
        grid.register(id, cells);
        Ok(Self {
            id,
            label: cursor.label().to_owned(),
            rng,
            age,
            health: Health::default(),
            cells,
            clock: first.time_days,
            locomotion: Locomotion::Mobile { cursor, fix: first },
            confirmed_code: None,
            history: Vec::new(),
        })
    }

    /// Build a stationary agent occupying `cells` and register it on both
    /// grids.  `start_days` is the simulation start time.
    #[allow(clippy::too_many_arguments)]
    pub fn stationary(
        id: AgentId,
        label: impl Into<String>,
        point: GeoPoint,
        cells: CellPair,
        age: f64,
        rng: AgentRng,
        start_days: f64,
        grid: &DualGrid,
    ) -> Self {
        grid.register(id, cells);
        Self {
            id,
            label: label.into(),
            rng,
            age,
            health: Health::default(),
            cells,
            clock: start_days,
            locomotion: Locomotion::Stationary { point },
            confirmed_code: None,
            history: Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Person directory name for mobile agents, raster cell for stationary
    /// ones.
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn set_age(&mut self, age: f64) {
        self.age = age.max(0.0);
    }

    pub fn health(&self) -> &Health {
        &self.health
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.health.stage()
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health.alive
    }

    #[inline]
    pub fn is_infected(&self) -> bool {
        self.health.alive && self.health.infected
    }

    /// Infected and past the incubation period.
    #[inline]
    pub fn is_infectious(&self) -> bool {
        self.health.is_infectious()
    }

    #[inline]
    pub fn is_immune(&self) -> bool {
        self.health.immune
    }

    #[inline]
    pub fn cells(&self) -> CellPair {
        self.cells
    }

    pub fn position(&self) -> GeoPoint {
        match &self.locomotion {
            Locomotion::Mobile { fix, .. } => fix.point,
            Locomotion::Stationary { point } => *point,
        }
    }

    pub fn is_mobile(&self) -> bool {
        matches!(self.locomotion, Locomotion::Mobile { .. })
    }

    pub fn locomotion(&self) -> &Locomotion {
        &self.locomotion
    }

    /// Time of the last consumed record or stationary step, in days.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn confirmed_code(&self) -> Option<&str> {
        self.confirmed_code.as_deref()
    }

    pub fn history(&self) -> &[InteractionId] {
        &self.history
    }

    // ── Life cycle ────────────────────────────────────────────────────────

    /// Advance the agent to absolute time `t` (days).
    ///
    /// Mobile agents consume records until they reach one at or after `t`,
    /// relocating after each.  Every consumed record counts as a tick of
    /// the disease clock: infected agents mark their Grid-A cell on the
    /// risk grid and count their timers down by the time since the
    /// previous record.  Stationary agents tick once per call.  Running out
    /// of records before `t` removes the agent.
    pub fn step_to(&mut self, t: f64, world: &World<'_>) -> AgentResult<StepOutcome> {
        if !self.health.alive {
            return Ok(StepOutcome::Inactive);
        }
        if !self.is_mobile() {
            let elapsed = (t - self.clock).max(0.0);
            self.clock = self.clock.max(t);
            return Ok(self.tick(elapsed, world));
        }

        let mut outcome = StepOutcome::Stepped;
        while self.clock < t {
            let Some(record) = self.next_record(world.grid)? else {
                if let Locomotion::Mobile { cursor, .. } = &self.locomotion {
                    log::debug!(
                        "agent {} ({}) ran out of trajectory at day {t:.5} after {} records in {} segments",
                        self.id,
                        self.label,
                        cursor.consumed(),
                        cursor.segments_loaded()
                    );
                }
                self.leave(world.grid);
                return Ok(StepOutcome::TrajectoryEnded);
            };
            let elapsed = (record.time_days - self.clock).max(0.0);
            self.clock = self.clock.max(record.time_days);
            match self.tick(elapsed, world) {
                StepOutcome::Died => return Ok(StepOutcome::Died),
                recovered @ StepOutcome::Recovered { .. } => outcome = recovered,
                _ => {}
            }
        }
        Ok(outcome)
    }

    /// Consume the next record and move onto its cells.
    fn next_record(&mut self, grid: &DualGrid) -> AgentResult<Option<TrajectoryRecord>> {
        let Locomotion::Mobile { cursor, fix } = &mut self.locomotion else {
            return Ok(None);
        };
        let Some(record) = cursor.advance()? else {
            return Ok(None);
        };
        *fix = record;
        let cells = grid.locate(record.point);
        if cells != self.cells {
            grid.relocate(self.id, self.cells, cells);
            self.cells = cells;
        }
        Ok(Some(record))
    }

    /// One tick of the disease clock at the current position.
    fn tick(&mut self, elapsed: f64, world: &World<'_>) -> StepOutcome {
        if !self.health.infected {
            return StepOutcome::Stepped;
        }
        world.risk.record(self.cells.a);
        self.progress_disease(elapsed, world)
    }

    fn progress_disease(&mut self, elapsed: f64, world: &World<'_>) -> StepOutcome {
        let health = &mut self.health;
        if health.incubation_left > 0.0 {
            health.incubation_left -= elapsed;
            return StepOutcome::Stepped;
        }
        if health.infection_left > 0.0 {
            health.infection_left -= elapsed;
            return StepOutcome::Stepped;
        }

        if self.rng.gen_bool(world.params.fatality_probability(self.age)) {
            log::debug!("agent {} died at day {:.5}", self.id, self.clock);
            self.leave(world.grid);
            return StepOutcome::Died;
        }
        let immune = self.rng.gen_bool(world.params.immunity_prob);
        self.health.clear_infection();
        self.health.immune = immune;
        StepOutcome::Recovered { immune }
    }

    /// Mark dead and drop out of both grids.
    fn leave(&mut self, grid: &DualGrid) {
        self.health.alive = false;
        self.health.clear_infection();
        grid.deregister(self.id, self.cells);
    }

    /// Infect this agent, optionally as a confirmed case.
    ///
    /// Dead and immune agents are unaffected and an infection already in
    /// progress keeps its timers.  A confirmation code is recorded the first
    /// time one is given, and the agent's whole interaction history is then
    /// published to the ledger.  Returns `true` for a new infection.
    pub fn infect(&mut self, code: Option<&str>, world: &World<'_>) -> bool {
        if !self.health.alive {
            return false;
        }
        let newly = self.health.is_susceptible();
        if newly {
            self.health.infected = true;
            self.health.incubation_left = world.params.incubation_days;
            self.health.infection_left = world.params.infection_days;
        }
        if let Some(code) = code {
            if self.confirmed_code.is_none() {
                log::info!(
                    "agent {} ({}) confirmed; publishing {} interactions",
                    self.id,
                    self.label,
                    self.history.len()
                );
                self.confirmed_code = Some(code.to_owned());
                world.ledger.publish(&self.history);
            }
        }
        newly
    }

    /// Append an interaction to the history.  A confirmed agent publishes it
    /// immediately.
    pub fn record_interaction(&mut self, id: InteractionId, ledger: &ContactLedger) {
        self.history.push(id);
        if self.confirmed_code.is_some() {
            ledger.publish(std::iter::once(&id));
        }
    }

    /// Check the history against the ledger.  A match means this agent met a
    /// confirmed case and it becomes infected (if still susceptible).
    /// Returns `true` on a match.
    pub fn check_for_sickness(&mut self, world: &World<'_>) -> bool {
        if !self.health.alive || !world.ledger.intersects(&self.history) {
            return false;
        }
        self.infect(None, world);
        true
    }
}

/// Draw an age from a normal distribution, clamped at zero.
pub fn sample_age(rng: &mut AgentRng, mean: f64, std_dev: f64) -> f64 {
    match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng.inner()).max(0.0),
        Err(_) => mean.max(0.0),
    }
}
