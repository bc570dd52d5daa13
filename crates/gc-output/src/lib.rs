//! `gc-output` — simulation output writers for the geocontagion simulator.
//!
//! Two backends are provided, the second behind a Cargo feature:
//!
//! | Feature   | Backend     | Files created                                                    |
//! |-----------|-------------|------------------------------------------------------------------|
//! | *(none)*  | CSV         | `agent_snapshots.csv`, `step_summaries.csv`, `risk_grid.csv`     |
//! | `sqlite`  | SQLite      | `output.db`                                                      |
//!
//! Both implement [`OutputWriter`] and are driven by [`SimOutputObserver`],
//! which implements `gc_sim::SimObserver`.  At the end of the run the
//! observer also hands the normalized risk map to any registered
//! [`RiskRenderer`]; [`JsonRiskExport`] writes `risk_map.json` for an
//! external map renderer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gc_output::{CsvWriter, JsonRiskExport, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, config.grid.bounds())
//!     .with_renderer(Box::new(JsonRiskExport::new("./output/risk_map.json")));
//! sim.run(&mut obs)?;
//! obs.take_error().map(|e| eprintln!("output error: {e}"));
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod render;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use render::{JsonRiskExport, RiskExport, RiskRenderer};
pub use row::{AgentSnapshotRow, StepSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
