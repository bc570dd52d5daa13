//! Fluent builder for constructing a [`Simulation`].

use gc_agent::{ContactLedger, DiseaseParams, Population, World};
use gc_core::{SimClock, SimConfig, SimRng};
use gc_population::{InteractionLog, earliest_start, load_interactions, load_population, seed_outbreak};
use gc_spatial::{DualGrid, RiskGrid};
use log::info;

use crate::{SimError, SimResult, Simulation};

/// Fluent builder for [`Simulation`].
///
/// # Required inputs
///
/// - [`SimConfig`]: grid, timing, disease parameters, seed.
///
/// # Optional inputs (have defaults)
///
/// | Method                        | Default                                        |
/// |-------------------------------|------------------------------------------------|
/// | `.population(grid, pop)`      | Loaded from `config.population` sources        |
/// | `.interactions(log)`          | Loaded from `population.interactions_csv`, or none |
///
/// # Example
///
/// ```rust,ignore
/// let config = SimConfig::load("config.toml")?;
/// let mut sim = SimBuilder::new(config).build()?;
/// let risk = sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:       SimConfig,
    prepared:     Option<(DualGrid, Population)>,
    interactions: Option<InteractionLog>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, prepared: None, interactions: None }
    }

    /// Supply a population built in code, together with the grid its agents
    /// were registered on.  The grid must match `config.grid`.
    pub fn population(mut self, grid: DualGrid, population: Population) -> Self {
        self.prepared = Some((grid, population));
        self
    }

    /// Supply the logged interactions to replay.
    pub fn interactions(mut self, log: InteractionLog) -> Self {
        self.interactions = Some(log);
        self
    }

    /// Validate the configuration, load whatever was not supplied, bring
    /// every agent to the start time and infect the index case.
    pub fn build(self) -> SimResult<Simulation> {
        let config = self.config;
        config.validate()?;
        let bounds = config.grid.bounds();

        // ── Grid and population ───────────────────────────────────────────
        let (grid, mut population) = match self.prepared {
            Some((grid, population)) => {
                if grid.size() != config.grid.resolution || grid.mapper().bounds() != bounds {
                    return Err(SimError::Config(format!(
                        "supplied grid is {0}x{0}, configuration asks for {1}x{1} over {bounds:?}",
                        grid.size(),
                        config.grid.resolution
                    )));
                }
                (grid, population)
            }
            None => {
                let grid = DualGrid::new(bounds, config.grid.resolution)?;
                let population = load_population(&config, &grid)?;
                (grid, population)
            }
        };

        let interactions = match (self.interactions, &config.population.interactions_csv) {
            (Some(log), _) => log,
            (None, Some(path)) => load_interactions(path, &population)?,
            (None, None) => InteractionLog::default(),
        };

        // ── Clock ─────────────────────────────────────────────────────────
        let start = config.timing.start_days.or(earliest_start(&population)).unwrap_or(0.0);
        let clock = SimClock::new(start, config.timing.step_days);

        // ── Shared services ───────────────────────────────────────────────
        let risk = RiskGrid::new(config.grid.resolution);
        let ledger = ContactLedger::new();
        let params = DiseaseParams::from(&config.disease);
        let mut rng = SimRng::new(config.run.seed);

        let world = World { grid: &grid, risk: &risk, ledger: &ledger, params: &params };
        for agent in population.agents_mut() {
            agent.step_to(start, &world).map_err(|e| SimError::stepping(agent.id(), e))?;
        }
        let index_case = seed_outbreak(&mut population, &config.outbreak, &world, &mut rng)?;

        info!(
            "built simulation: {} agents ({} mobile), {} logged interactions, {}x{} grid",
            population.len(),
            population.iter().filter(|a| a.is_mobile()).count(),
            interactions.len(),
            grid.size(),
            grid.size()
        );

        Ok(Simulation {
            config,
            clock,
            grid,
            risk,
            ledger,
            params,
            population,
            interactions,
            rng,
            index_case,
        })
    }
}
