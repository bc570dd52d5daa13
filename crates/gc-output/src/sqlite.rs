//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! three tables: `agent_snapshots`, `step_summaries` and `risk_cells`.

use std::path::Path;

use gc_spatial::RiskMap;
use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentSnapshotRow, OutputResult, StepSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 tick      INTEGER NOT NULL,
                 agent_id  INTEGER NOT NULL,
                 lat       REAL    NOT NULL,
                 lon       REAL    NOT NULL,
                 cell_row  INTEGER NOT NULL,
                 cell_col  INTEGER NOT NULL,
                 stage     TEXT    NOT NULL,
                 confirmed INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS step_summaries (
                 tick           INTEGER PRIMARY KEY,
                 time_days      REAL    NOT NULL,
                 alive          INTEGER NOT NULL,
                 dead           INTEGER NOT NULL,
                 infected       INTEGER NOT NULL,
                 infectious     INTEGER NOT NULL,
                 immune         INTEGER NOT NULL,
                 confirmed      INTEGER NOT NULL,
                 new_infections INTEGER NOT NULL,
                 deaths         INTEGER NOT NULL,
                 departures     INTEGER NOT NULL,
                 recoveries     INTEGER NOT NULL,
                 interactions   INTEGER NOT NULL,
                 ledger_size    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS risk_cells (
                 row   INTEGER NOT NULL,
                 col   INTEGER NOT NULL,
                 value INTEGER NOT NULL,
                 PRIMARY KEY (row, col)
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (tick, agent_id, lat, lon, cell_row, cell_col, stage, confirmed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.agent_id,
                    row.lat,
                    row.lon,
                    row.cell_row,
                    row.cell_col,
                    row.stage,
                    row.confirmed as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_step_summary(&mut self, row: &StepSummaryRow) -> OutputResult<()> {
        let c = row.counts().map(|v| v as i64);
        self.conn.execute(
            "INSERT INTO step_summaries \
             (tick, time_days, alive, dead, infected, infectious, immune, confirmed, \
              new_infections, deaths, departures, recoveries, interactions, ledger_size) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            rusqlite::params![
                row.tick as i64,
                row.time_days,
                c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11],
            ],
        )?;
        Ok(())
    }

    fn write_risk_map(&mut self, risk: &RiskMap) -> OutputResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT OR REPLACE INTO risk_cells (row, col, value) VALUES (?1, ?2, ?3)",
            )?;
            for (r, values) in risk.rows().enumerate() {
                for (c, &value) in values.iter().enumerate() {
                    stmt.execute(rusqlite::params![r as i64, c as i64, value])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
