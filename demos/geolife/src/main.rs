//! geolife — run a configured outbreak over real trajectory data.
//!
//! ```text
//! RUST_LOG=info cargo run --release -p geolife -- demos/geolife/config.toml
//! ```
//!
//! Writes `step_summaries.csv`, `agent_snapshots.csv`, `risk_grid.csv` and
//! `risk_map.json` (plus `output.db` with `--features sqlite`) to the
//! configured output directory.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use gc_agent::Population;
use gc_core::{GeoBounds, SimConfig, Tick};
use gc_output::{JsonRiskExport, OutputWriter, SimOutputObserver};
use gc_sim::{SimBuilder, SimObserver, Simulation, StepSummary};
use gc_spatial::RiskMap;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation TOML file.
    config: PathBuf,

    /// Override `[output] dir`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override `[timing] steps`.
    #[arg(long)]
    steps: Option<u64>,

    /// Override `[run] seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Write an SQLite database instead of CSV files (needs the `sqlite`
    /// feature).
    #[arg(long)]
    sqlite: bool,

    /// Log a progress line every N steps.
    #[arg(long, default_value_t = 3600)]
    progress_every: u64,
}

// ── Progress reporting ────────────────────────────────────────────────────────

struct ProgressObserver<W: OutputWriter> {
    inner:          SimOutputObserver<W>,
    every:          u64,
    start:          Instant,
    infections:     usize,
    snapshot_rows:  usize,
}

impl<W: OutputWriter> ProgressObserver<W> {
    fn new(inner: SimOutputObserver<W>, every: u64) -> Self {
        Self { inner, every, start: Instant::now(), infections: 0, snapshot_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for ProgressObserver<W> {
    fn on_step_end(&mut self, s: &StepSummary) {
        self.infections += s.new_infections;
        if s.tick.is_every(self.every) {
            info!(
                "{}  day {:.4}  alive={} infected={} immune={} dead={} ledger={}  {:.1}s",
                s.tick,
                s.time_days,
                s.alive,
                s.infected,
                s.immune,
                s.dead,
                s.ledger_size,
                self.start.elapsed().as_secs_f64(),
            );
        }
        self.inner.on_step_end(s);
    }

    fn on_snapshot(&mut self, tick: Tick, population: &Population) {
        self.snapshot_rows += population.len();
        self.inner.on_snapshot(tick, population);
    }

    fn on_sim_end(&mut self, final_tick: Tick, risk: &RiskMap) {
        self.inner.on_sim_end(final_tick, risk);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = SimConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(dir) = args.output.clone() {
        config.output.dir = dir;
    }
    if let Some(steps) = args.steps {
        config.timing.steps = steps;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }

    configure_threads(config.run.num_threads)?;

    let t_build = Instant::now();
    let mut sim = SimBuilder::new(config.clone()).build()?;
    info!(
        "built {} agents in {:.2}s; index case {}",
        sim.population().len(),
        t_build.elapsed().as_secs_f64(),
        sim.index_case()
    );

    let out_dir = config.output.dir.clone();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let json = JsonRiskExport::new(out_dir.join("risk_map.json"));

    let bounds = config.grid.bounds();

    if args.sqlite {
        return run_sqlite(&mut sim, &out_dir, bounds, json, args.progress_every);
    }

    let writer = gc_output::CsvWriter::new(&out_dir)?;
    let inner = SimOutputObserver::new(writer, bounds).with_renderer(Box::new(json));
    run(&mut sim, ProgressObserver::new(inner, args.progress_every))
}

#[cfg(feature = "sqlite")]
fn run_sqlite(
    sim:     &mut Simulation,
    out_dir: &Path,
    bounds:  GeoBounds,
    json:    JsonRiskExport,
    every:   u64,
) -> Result<()> {
    let writer = gc_output::SqliteWriter::new(out_dir)?;
    let inner = SimOutputObserver::new(writer, bounds).with_renderer(Box::new(json));
    run(sim, ProgressObserver::new(inner, every))
}

#[cfg(not(feature = "sqlite"))]
fn run_sqlite(
    _sim:     &mut Simulation,
    _out_dir: &Path,
    _bounds:  GeoBounds,
    _json:    JsonRiskExport,
    _every:   u64,
) -> Result<()> {
    anyhow::bail!("--sqlite requires building with `--features sqlite`")
}

#[cfg(feature = "parallel")]
fn configure_threads(num_threads: Option<usize>) -> Result<()> {
    if let Some(n) = num_threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configuring the rayon thread pool")?;
    }
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn configure_threads(_num_threads: Option<usize>) -> Result<()> {
    Ok(())
}

fn run<W: OutputWriter>(sim: &mut Simulation, mut obs: ProgressObserver<W>) -> Result<()> {
    let t0 = Instant::now();
    let risk = sim.run(&mut obs)?;

    if let Some(e) = obs.inner.take_error() {
        warn!("output error: {e}");
    }

    let counts = sim.population().counts();
    println!("Simulation complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!("  infections          : {}", obs.infections);
    println!("  alive / dead        : {} / {}", counts.alive, counts.dead);
    println!("  immune              : {}", counts.immune);
    println!("  confirmed           : {}", counts.confirmed);
    println!("  ledger entries      : {}", sim.ledger().len());
    println!("  snapshot rows       : {}", obs.snapshot_rows);
    println!("  hot cells           : {} of {}", risk.hot_cells(), risk.size() * risk.size());
    Ok(())
}
