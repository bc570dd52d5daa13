//! Run configuration, loaded from TOML.
//!
//! ```toml
//! [grid]
//! resolution = 300
//! min_lat = 39.0
//! max_lat = 40.6
//! min_lon = 116.0
//! max_lon = 117.0
//!
//! [timing]
//! steps = 86400
//! step_days = 0.00001157
//!
//! [population]
//! trajectory_root = "data/Geolife Trajectories 1.3/Data"
//! raster_dir = "data/gpw"
//! density_per_agent = 50.0
//!
//! [run]
//! seed = 42
//! ```
//!
//! Every section except `[grid]` and `[timing]` may be omitted; missing keys
//! fall back to the defaults documented on each field.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::time::SECONDS_PER_DAY;
use crate::{CoreError, CoreResult, GeoBounds};

// ── Sections ──────────────────────────────────────────────────────────────────

/// Geographic extent and resolution of the two spatial grids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cells per side (N).  Both grids are N×N.
    pub resolution: usize,
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GridConfig {
    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::new(self.min_lat, self.max_lat, self.min_lon, self.max_lon)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Number of timesteps to simulate.
    pub steps: u64,
    /// Length of one timestep in days.  Default: one second.
    #[serde(default = "default_step_days")]
    pub step_days: f64,
    /// Absolute start time in days.  `None` starts at the earliest mobile
    /// agent's first record (or 0 without mobile agents).
    #[serde(default)]
    pub start_days: Option<f64>,
}

/// Epidemiological tunables.  The fatality and age heuristics are linear
/// placeholders, not calibrated values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiseaseConfig {
    /// Baseline per-contact transmission probability.
    pub spread_prob: f64,
    /// Days from infection to contagiousness.
    pub incubation_days: f64,
    /// Days from contagiousness to resolution (death or recovery).
    pub infection_days: f64,
    /// Probability that the disease is lethal for an agent of `baseline_age`.
    pub fatality_rate: f64,
    /// Probability of permanent immunity after recovery.
    pub immunity_prob: f64,
    /// Probability that a bystander sharing a cell with an infectious agent
    /// catches the disease during an interaction.
    pub ambient_exposure_prob: f64,
    /// Age at which the fatality draw uses `fatality_rate` unscaled.
    pub baseline_age: f64,
}

impl Default for DiseaseConfig {
    fn default() -> Self {
        Self {
            spread_prob:           0.22,
            incubation_days:       14.0,
            infection_days:        14.0,
            fatality_rate:         0.02,
            immunity_prob:         0.77,
            ambient_exposure_prob: 0.01,
            baseline_age:          37.0,
        }
    }
}

/// Where the initial agent set comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Directory with one sub-directory of trajectory files per person.
    pub trajectory_root: Option<PathBuf>,
    /// Directory with the ASCII population-density raster chunks.
    pub raster_dir: Option<PathBuf>,
    /// Density units per synthesized stationary agent.
    pub density_per_agent: f64,
    pub age_mean: f64,
    pub age_std_dev: f64,
    /// Optional `person,age` CSV overriding sampled ages of mobile agents.
    pub demographics_csv: Option<PathBuf>,
    /// Optional `time_days,agent_a,agent_b` CSV of logged proximity events.
    pub interactions_csv: Option<PathBuf>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            trajectory_root:   None,
            raster_dir:        None,
            density_per_agent: 100.0,
            age_mean:          37.0,
            age_std_dev:       15.0,
            demographics_csv:  None,
            interactions_csv:  None,
        }
    }
}

/// Index-case selection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutbreakConfig {
    /// Agent to infect at start.  `None` picks one uniformly at random.
    pub index_agent: Option<u32>,
    /// Confirmed-case code attached to the index case.
    pub confirmed_code: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,
    /// Worker thread count for the parallel stepping phase.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,
    /// Run the exposure-notification pass every N steps (0 disables it).
    pub notify_interval_steps: u64,
    /// Report a step summary to output every N steps.
    pub output_interval_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed:                  42,
            num_threads:           None,
            notify_interval_steps: 1,
            output_interval_steps: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("output") }
    }
}

fn default_step_days() -> f64 {
    1.0 / SECONDS_PER_DAY
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub timing: TimingConfig,
    #[serde(default)]
    pub disease: DiseaseConfig,
    #[serde(default)]
    pub population: PopulationConfig,
    #[serde(default)]
    pub outbreak: OutbreakConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimConfig {
    /// Read, parse, and validate a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let config: SimConfig =
            toml::from_str(text).map_err(|e| CoreError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations the simulator cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        let g = &self.grid;
        if g.resolution == 0 {
            return Err(CoreError::Config("grid.resolution must be greater than 0".into()));
        }
        if !(g.min_lat < g.max_lat) || !(g.min_lon < g.max_lon) {
            return Err(CoreError::Config(format!(
                "grid bounds are empty or inverted: lat [{}, {}], lon [{}, {}]",
                g.min_lat, g.max_lat, g.min_lon, g.max_lon
            )));
        }
        if !(self.timing.step_days > 0.0) {
            return Err(CoreError::Config("timing.step_days must be positive".into()));
        }

        let d = &self.disease;
        for (name, p) in [
            ("disease.spread_prob", d.spread_prob),
            ("disease.fatality_rate", d.fatality_rate),
            ("disease.immunity_prob", d.immunity_prob),
            ("disease.ambient_exposure_prob", d.ambient_exposure_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::Config(format!("{name} = {p} is not a probability")));
            }
        }
        if d.incubation_days < 0.0 || d.infection_days < 0.0 {
            return Err(CoreError::Config("disease durations must not be negative".into()));
        }
        if !(d.baseline_age > 0.0) {
            return Err(CoreError::Config("disease.baseline_age must be positive".into()));
        }

        let p = &self.population;
        if !(p.density_per_agent > 0.0) {
            return Err(CoreError::Config("population.density_per_agent must be positive".into()));
        }
        if p.age_std_dev < 0.0 {
            return Err(CoreError::Config("population.age_std_dev must not be negative".into()));
        }
        Ok(())
    }
}
