//! Integration tests for gc-output.

use gc_core::{GeoBounds, Tick};
use gc_sim::StepSummary;
use gc_spatial::RiskMap;
use tempfile::TempDir;

use crate::row::{AgentSnapshotRow, StepSummaryRow};

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn snap_row(agent_id: u32, tick: u64) -> AgentSnapshotRow {
    AgentSnapshotRow {
        tick,
        agent_id,
        lat:       0.25,
        lon:       0.75,
        cell_row:  2,
        cell_col:  7,
        stage:     "infectious",
        confirmed: agent_id == 0,
    }
}

fn summary(tick: u64) -> StepSummary {
    StepSummary {
        tick:           Tick(tick),
        time_days:      tick as f64 * 0.5,
        alive:          9,
        dead:           1,
        infected:       3,
        infectious:     2,
        immune:         1,
        confirmed:      1,
        new_infections: 2,
        deaths:         1,
        departures:     0,
        recoveries:     0,
        interactions:   4,
        ledger_size:    6,
    }
}

fn risk() -> RiskMap {
    RiskMap::from_values(2, vec![0, 85, 170, 255]).unwrap()
}

#[cfg(test)]
mod csv_tests {
    use super::*;
    use crate::csv::CsvWriter;
    use crate::writer::OutputWriter;

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("agent_snapshots.csv").exists());
        assert!(dir.path().join("step_summaries.csv").exists());
        // Written only at the end of the run.
        assert!(!dir.path().join("risk_grid.csv").exists());
    }

    #[test]
    fn creates_missing_output_dir() {
        let dir = tmp();
        let nested = dir.path().join("a").join("b");
        let mut w = CsvWriter::new(&nested).unwrap();
        w.finish().unwrap();
        assert!(nested.join("step_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(
            headers,
            ["tick", "agent_id", "lat", "lon", "cell_row", "cell_col", "stage", "confirmed"]
        );

        let mut rdr2 = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2, StepSummaryRow::HEADERS);
    }

    #[test]
    fn csv_snapshot_rows() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 5), snap_row(1, 5), snap_row(2, 5)]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "5");
        assert_eq!(&rows[0][1], "0");
        assert_eq!(&rows[0][6], "infectious");
        assert_eq!(&rows[0][7], "1");
        assert_eq!(&rows[2][1], "2");
        assert_eq!(&rows[2][7], "0");
    }

    #[test]
    fn csv_step_summary_row() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_step_summary(&StepSummaryRow::from(&summary(3))).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3");
        assert_eq!(&rows[0][1], "1.5");
        assert_eq!(&rows[0][2], "9");    // alive
        assert_eq!(&rows[0][13], "6");   // ledger_size
    }

    #[test]
    fn risk_grid_is_square_matrix() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_risk_map(&risk()).unwrap();
        w.finish().unwrap();

        let text = std::fs::read_to_string(dir.path().join("risk_grid.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["0,85", "170,255"]);
    }

    #[test]
    fn finish_is_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }
}

#[cfg(test)]
mod render_tests {
    use super::*;
    use crate::render::{JsonRiskExport, RiskExport, RiskRenderer};

    #[test]
    fn json_export_carries_bounds_and_rows() {
        let dir = tmp();
        let path = dir.path().join("risk_map.json");
        let bounds = GeoBounds::new(39.0, 41.0, 115.0, 117.0);
        let mut export = JsonRiskExport::new(&path);
        export.render(&risk(), bounds).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: RiskExport = serde_json::from_str(&text).unwrap();
        assert_eq!(back.size, 2);
        assert_eq!(back.bounds, bounds);
        assert_eq!(back.rows, vec![vec![0, 85], vec![170, 255]]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tmp();
        let mut export = JsonRiskExport::new(dir.path().join("nope").join("risk_map.json"));
        assert!(export.render(&risk(), GeoBounds::new(0.0, 1.0, 0.0, 1.0)).is_err());
    }
}

#[cfg(test)]
mod observer_tests {
    use super::*;
    use gc_agent::{Agent, Population};
    use gc_core::{AgentRng, GeoPoint};
    use gc_sim::SimObserver;
    use gc_spatial::DualGrid;

    use crate::csv::CsvWriter;
    use crate::render::JsonRiskExport;
    use crate::SimOutputObserver;

    fn bounds() -> GeoBounds {
        GeoBounds::new(0.0, 1.0, 0.0, 1.0)
    }

    fn population(grid: &DualGrid) -> Population {
        let mut pop = Population::new();
        for (lat, lon) in [(0.15, 0.15), (0.85, 0.35)] {
            let id = pop.next_id();
            let point = GeoPoint::new(lat, lon);
            pop.push(Agent::stationary(
                id,
                format!("home-{}", id.0),
                point,
                grid.locate(point),
                30.0,
                AgentRng::new(7, id),
                0.0,
                grid,
            ));
        }
        pop
    }

    #[test]
    fn observer_writes_every_artifact() {
        let dir = tmp();
        let grid = DualGrid::new(bounds(), 2).unwrap();
        let pop = population(&grid);

        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, bounds())
            .with_renderer(Box::new(JsonRiskExport::new(dir.path().join("risk_map.json"))));

        obs.on_step_end(&summary(1));
        obs.on_snapshot(Tick(1), &pop);
        obs.on_step_end(&summary(2));
        obs.on_sim_end(Tick(2), &risk());
        assert!(obs.take_error().is_none());

        let mut rdr = csv::Reader::from_path(dir.path().join("step_summaries.csv")).unwrap();
        assert_eq!(rdr.records().count(), 2);

        let mut rdr = csv::Reader::from_path(dir.path().join("agent_snapshots.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][4], "1");              // cell_row of (0.85, 0.35)
        assert_eq!(&rows[1][5], "0");
        assert_eq!(&rows[1][6], "susceptible");

        assert!(dir.path().join("risk_grid.csv").exists());
        assert!(dir.path().join("risk_map.json").exists());
    }

    #[test]
    fn first_error_is_kept() {
        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = SimOutputObserver::new(writer, bounds())
            .with_renderer(Box::new(JsonRiskExport::new(dir.path().join("x").join("a.json"))))
            .with_renderer(Box::new(JsonRiskExport::new(dir.path().join("y").join("b.json"))));

        obs.on_sim_end(Tick(0), &risk());
        assert!(obs.take_error().is_some());
        assert!(obs.take_error().is_none());
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use super::*;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_rows_written() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_snapshots(&[snap_row(0, 1), snap_row(1, 1)]).unwrap();
        w.write_step_summary(&StepSummaryRow::from(&summary(1))).unwrap();
        w.write_risk_map(&risk()).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let snaps: i64 = conn
            .query_row("SELECT COUNT(*) FROM agent_snapshots", [], |r| r.get(0))
            .unwrap();
        assert_eq!(snaps, 2);

        let ledger: i64 = conn
            .query_row("SELECT ledger_size FROM step_summaries WHERE tick = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(ledger, 6);

        let hot: i64 = conn
            .query_row("SELECT value FROM risk_cells WHERE row = 1 AND col = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(hot, 255);
    }
}
