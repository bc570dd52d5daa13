//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `step_summaries.csv`
//! - `risk_grid.csv` (written at the end; one line per grid row, no header)

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::Writer;
use gc_spatial::RiskMap;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, StepSummaryRow};

/// Writes simulation output to CSV files.
pub struct CsvWriter {
    dir:       PathBuf,
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the CSV files and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record([
            "tick", "agent_id", "lat", "lon", "cell_row", "cell_col", "stage", "confirmed",
        ])?;

        let mut summaries = Writer::from_path(dir.join("step_summaries.csv"))?;
        summaries.write_record(StepSummaryRow::HEADERS)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.lat.to_string(),
                row.lon.to_string(),
                row.cell_row.to_string(),
                row.cell_col.to_string(),
                row.stage.to_string(),
                (row.confirmed as u8).to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        let mut record = vec![row.tick.to_string(), row.time_days.to_string()];
        record.extend(row.counts().iter().map(u64::to_string));
        self.summaries.write_record(&record)?;
        Ok(())
    }

    fn write_risk_map(&mut self, risk: &RiskMap) -> OutputResult<()> {
        let mut grid = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(self.dir.join("risk_grid.csv"))?;
        for row in risk.rows() {
            grid.write_record(row.iter().map(u8::to_string))?;
        }
        grid.flush()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
