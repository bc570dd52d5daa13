//! synthetic — a self-contained outbreak with no input files.
//!
//! Forty walkers wander a 20×20 grid for two days at ten-minute resolution
//! while three residential blocks supply stationary agents.  Walker 0 is the
//! confirmed index case and a short interaction log replays the contacts it
//! "reported".  Outputs land in `output/synthetic`, and the final risk map is
//! also drawn to the terminal.

use std::path::Path;

use anyhow::Result;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use gc_agent::Stage;
use gc_core::{
    AgentId, DiseaseConfig, GeoBounds, GeoPoint, GridConfig, OutbreakConfig, OutputConfig,
    PopulationConfig, RunConfig, SimConfig, TimingConfig,
};
use gc_output::{CsvWriter, JsonRiskExport, OutputResult, RiskRenderer, SimOutputObserver};
use gc_population::{DensityCell, InteractionLog, PopulationBuilder, ScheduledInteraction};
use gc_sim::SimBuilder;
use gc_spatial::{DualGrid, RiskMap};
use gc_trajectory::{MemorySource, TrajectoryRecord};

// ── Constants ─────────────────────────────────────────────────────────────────

const WALKERS:        usize = 40;
const SEED:           u64   = 7;
const RESOLUTION:     usize = 20;
const STEPS_PER_DAY:  u64   = 144; // 10-minute steps
const DAYS:           u64   = 2;
const OUTPUT_DIR:     &str  = "output/synthetic";

/// Block centres and densities for the stationary population.
const BLOCKS: [(f64, f64, f64); 3] = [(0.2, 0.25, 60.0), (0.5, 0.7, 90.0), (0.8, 0.3, 40.0)];

// ── Scenario ──────────────────────────────────────────────────────────────────

fn config() -> SimConfig {
    SimConfig {
        grid: GridConfig {
            resolution: RESOLUTION,
            min_lat:    0.0,
            max_lat:    1.0,
            min_lon:    0.0,
            max_lon:    1.0,
        },
        timing: TimingConfig {
            steps:      STEPS_PER_DAY * DAYS,
            step_days:  1.0 / STEPS_PER_DAY as f64,
            start_days: Some(0.0),
        },
        disease: DiseaseConfig {
            incubation_days: 0.5,
            infection_days:  1.0,
            ..DiseaseConfig::default()
        },
        population: PopulationConfig {
            density_per_agent: 10.0,
            ..PopulationConfig::default()
        },
        outbreak: OutbreakConfig {
            index_agent:    Some(0),
            confirmed_code: Some("SYN-0001".to_owned()),
        },
        run: RunConfig {
            seed:                  SEED,
            notify_interval_steps: 6,
            output_interval_steps: STEPS_PER_DAY / 4,
            ..RunConfig::default()
        },
        output: OutputConfig { dir: OUTPUT_DIR.into() },
    }
}

/// A bounded random walk, one fix per step.  Every fifth walker leaves the
/// area halfway through.
fn walk(i: usize, rng: &mut SmallRng) -> Vec<TrajectoryRecord> {
    let fixes = if i % 5 == 4 { STEPS_PER_DAY * DAYS / 2 } else { STEPS_PER_DAY * DAYS + 1 };
    let (mut lat, mut lon): (f64, f64) = (rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9));
    (0..fixes)
        .map(|k| {
            lat = (lat + rng.gen_range(-0.02..0.02)).clamp(0.0, 1.0);
            lon = (lon + rng.gen_range(-0.02..0.02)).clamp(0.0, 1.0);
            TrajectoryRecord::new(lat, lon, 0.0, k as f64 / STEPS_PER_DAY as f64)
        })
        .collect()
}

fn blocks() -> Vec<DensityCell> {
    BLOCKS
        .iter()
        .map(|&(lat, lon, density)| DensityCell { point: GeoPoint::new(lat, lon), density })
        .collect()
}

/// Contacts the index case reports during the first day.
fn reported_contacts() -> InteractionLog {
    InteractionLog::new(
        (1..=4)
            .map(|k| ScheduledInteraction {
                time_days: k as f64 * 0.2,
                a:         AgentId(0),
                b:         AgentId(k * 3),
            })
            .collect(),
    )
}

// ── Terminal heatmap ──────────────────────────────────────────────────────────

/// Draws the risk map with one character per cell, north at the top.
struct AsciiHeatmap;

impl RiskRenderer for AsciiHeatmap {
    fn render(&mut self, risk: &RiskMap, _bounds: GeoBounds) -> OutputResult<()> {
        const SHADES: &[u8] = b" .:-=+*#%@";
        let rows: Vec<&[u8]> = risk.rows().collect();
        for row in rows.iter().rev() {
            let line: String = row
                .iter()
                .map(|&v| SHADES[v as usize * (SHADES.len() - 1) / 255] as char)
                .collect();
            println!("  |{line}|");
        }
        Ok(())
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = config();
    println!("=== synthetic — geocontagion ===");
    println!("Walkers: {WALKERS}  |  Days: {DAYS}  |  Seed: {SEED}");
    println!();

    // 1. Population.
    let grid = DualGrid::new(config.grid.bounds(), config.grid.resolution)?;
    let mut builder = PopulationBuilder::new(&grid, SEED, &config.population);
    let mut rng = SmallRng::seed_from_u64(SEED);
    for i in 0..WALKERS {
        let source = MemorySource::single(format!("walker-{i:02}"), walk(i, &mut rng));
        builder.add_mobile(Box::new(source))?;
    }
    let residents = builder.add_density_cells(&blocks(), 0.0);
    let population = builder.finish()?;
    info!("{WALKERS} walkers, {residents} residents");

    // 2. Simulation.
    let mut sim = SimBuilder::new(config.clone())
        .population(grid, population)
        .interactions(reported_contacts())
        .build()?;

    // 3. Output.
    let out_dir = Path::new(OUTPUT_DIR);
    std::fs::create_dir_all(out_dir)?;
    let mut obs = SimOutputObserver::new(CsvWriter::new(out_dir)?, config.grid.bounds())
        .with_renderer(Box::new(JsonRiskExport::new(out_dir.join("risk_map.json"))))
        .with_renderer(Box::new(AsciiHeatmap));

    // 4. Run.
    println!("Risk map (north up):");
    sim.run(&mut obs)?;
    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }
    println!();

    // 5. Final table.
    println!("{:<12} {:<12} {:<10} {:<8}", "Agent", "Stage", "Confirmed", "Cell");
    println!("{}", "-".repeat(44));
    for agent in sim.population().iter().filter(|a| a.stage() != Stage::Susceptible) {
        println!(
            "{:<12} {:<12} {:<10} {:<8}",
            agent.label(),
            agent.stage().as_str(),
            if agent.confirmed_code().is_some() { "yes" } else { "no" },
            agent.cells().a.to_string(),
        );
    }
    let counts = sim.population().counts();
    println!();
    println!(
        "alive {}  dead {}  infected {}  immune {}  ledger {}",
        counts.alive,
        counts.dead,
        counts.infected,
        counts.immune,
        sim.ledger().len()
    );
    Ok(())
}
