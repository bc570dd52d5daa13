//! Assembling the initial population.
//!
//! Mobile agents come first (one per person directory, in directory-name
//! order), then stationary agents synthesised from the density raster.  Ids
//! are assigned densely in that order.

use std::path::{Path, PathBuf};

use gc_agent::{Agent, AgentError, Population, sample_age};
use gc_core::{AgentRng, PopulationConfig, SimConfig};
use gc_spatial::{CellPair, DualGrid};
use gc_trajectory::{PltDirectory, TrajectoryCursor, TrajectoryError, TrajectorySource};
use log::{info, warn};

use crate::demographics::{AgeTable, load_demographics};
use crate::raster::{DensityCell, read_raster_dir};
use crate::{PopulationError, PopulationResult};

pub struct PopulationBuilder<'g> {
    grid:              &'g DualGrid,
    seed:              u64,
    age_mean:          f64,
    age_std_dev:       f64,
    density_per_agent: f64,
    ages:              AgeTable,
    population:        Population,
}

impl<'g> PopulationBuilder<'g> {
    pub fn new(grid: &'g DualGrid, seed: u64, config: &PopulationConfig) -> Self {
        Self {
            grid,
            seed,
            age_mean: config.age_mean,
            age_std_dev: config.age_std_dev,
            density_per_agent: config.density_per_agent,
            ages: AgeTable::default(),
            population: Population::new(),
        }
    }

    /// Ages that override sampling, keyed by person label.
    pub fn with_ages(mut self, ages: AgeTable) -> Self {
        self.ages = ages;
        self
    }

    pub fn len(&self) -> usize {
        self.population.len()
    }

    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }

    /// Earliest clock among the mobile agents added so far.
    pub fn earliest_start(&self) -> Option<f64> {
        earliest_start(&self.population)
    }

    /// Add one mobile agent following `source`.
    ///
    /// Returns `Ok(false)` and adds nothing if the source holds no records.
    pub fn add_mobile(&mut self, source: Box<dyn TrajectorySource>) -> PopulationResult<bool> {
        let id = self.population.next_id();
        let mut rng = AgentRng::new(self.seed, id);
        let age = match self.ages.get(source.label()) {
            Some(&age) => age,
            None => sample_age(&mut rng, self.age_mean, self.age_std_dev),
        };
        match Agent::mobile(id, TrajectoryCursor::new(source), age, rng, self.grid) {
            Ok(agent) => {
                self.population.push(agent);
                Ok(true)
            }
            Err(AgentError::NoRecords(label)) => {
                warn!("trajectory {label:?} has no records, skipped");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Add one mobile agent per subdirectory of `root`.  Directories with no
    /// trajectory files are skipped with a warning.  Returns the number added.
    pub fn add_trajectory_root(&mut self, root: &Path) -> PopulationResult<usize> {
        let io_err = |source| PopulationError::Io { path: root.to_path_buf(), source };
        let mut people: Vec<PathBuf> = Vec::new();
        for entry in std::fs::read_dir(root).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_dir() {
                people.push(path);
            }
        }
        people.sort();

        let mut added = 0;
        for person in &people {
            let source = match PltDirectory::open(person) {
                Ok(source) => source,
                Err(TrajectoryError::Empty(dir)) => {
                    warn!("{}: no trajectory files, skipped", dir.display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            if self.add_mobile(Box::new(source))? {
                added += 1;
            }
        }
        info!("loaded {added} mobile agents from {}", root.display());
        Ok(added)
    }

    /// Add the stationary agents standing for `cells`.  Agents of one raster
    /// cell share a Grid-A cell and are spread over the overlapping Grid-B
    /// cells in checkerboard order.  Returns the number added.
    pub fn add_density_cells(&mut self, cells: &[DensityCell], start_days: f64) -> usize {
        let mapper = self.grid.mapper();
        let mut added = 0;
        for cell in cells {
            let a = self.grid.locate(cell.point).a;
            for k in 0..cell.agent_count(self.density_per_agent) {
                let pair = CellPair { a, b: mapper.checkerboard_b(a, k) };
                let id = self.population.next_id();
                let mut rng = AgentRng::new(self.seed, id);
                let age = sample_age(&mut rng, self.age_mean, self.age_std_dev);
                let label = format!("{a}#{k}");
                self.population.push(Agent::stationary(
                    id, label, cell.point, pair, age, rng, start_days, self.grid,
                ));
                added += 1;
            }
        }
        added
    }

    /// Read the raster chunks in `dir` and add their stationary agents.
    pub fn add_raster_dir(&mut self, dir: &Path, start_days: f64) -> PopulationResult<usize> {
        let cells = read_raster_dir(dir, &self.grid.mapper().bounds())?;
        let added = self.add_density_cells(&cells, start_days);
        info!("synthesised {added} stationary agents from {}", dir.display());
        Ok(added)
    }

    /// Fails with [`PopulationError::NoAgents`] if nothing was added.
    pub fn finish(self) -> PopulationResult<Population> {
        if self.population.is_empty() {
            return Err(PopulationError::NoAgents);
        }
        Ok(self.population)
    }
}

/// Earliest clock among the mobile agents of `population`.
pub fn earliest_start(population: &Population) -> Option<f64> {
    population
        .iter()
        .filter(|a| a.is_mobile())
        .map(|a| a.clock())
        .min_by(f64::total_cmp)
}

/// Load everything `config.population` names.
///
/// Stationary agents start at `config.timing.start_days`, or at the
/// earliest mobile start when that is unset.
pub fn load_population(config: &SimConfig, grid: &DualGrid) -> PopulationResult<Population> {
    let pop = &config.population;
    let mut builder = PopulationBuilder::new(grid, config.run.seed, pop);
    if let Some(path) = &pop.demographics_csv {
        builder = builder.with_ages(load_demographics(path)?);
    }
    if let Some(root) = &pop.trajectory_root {
        builder.add_trajectory_root(root)?;
    }
    if let Some(dir) = &pop.raster_dir {
        let start = config.timing.start_days.or(builder.earliest_start()).unwrap_or(0.0);
        builder.add_raster_dir(dir, start)?;
    }
    builder.finish()
}
