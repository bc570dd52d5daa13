//! Trajectory file format.
//!
//! ```text
//! Geolife trajectory
//! WGS 84
//! Altitude is in Feet
//! Reserved 3
//! 0,2,255,My Track,0,0,2,8421376
//! 0
//! 39.984702,116.318417,0,492,39744.1201851852,2008-10-23,02:53:04
//! 39.984683,116.31845,0,492,39744.1202546296,2008-10-23,02:53:10
//! ```
//!
//! Six header lines, then one comma-separated record per line.  Only fields
//! 0 (latitude), 1 (longitude), 3 (altitude) and 4 (time in fractional days
//! since the epoch) are read; the rest are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use gc_core::GeoPoint;

use crate::{TrajectoryError, TrajectoryResult};

/// Fixed number of header lines preceding the records.
pub const PLT_HEADER_LINES: u64 = 6;

/// One recorded position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrajectoryRecord {
    pub point:     GeoPoint,
    pub altitude:  f64,
    /// Absolute time in days since the epoch.
    pub time_days: f64,
}

impl TrajectoryRecord {
    pub fn new(lat: f64, lon: f64, altitude: f64, time_days: f64) -> Self {
        Self { point: GeoPoint::new(lat, lon), altitude, time_days }
    }
}

/// Read every record of one trajectory file.
pub fn read_plt(path: &Path) -> TrajectoryResult<Vec<TrajectoryRecord>> {
    let file = File::open(path).map_err(|source| TrajectoryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_plt(file, path)
}

/// Like [`read_plt`] but accepts any `Read` source.  `path` is only used to
/// label errors.
pub fn parse_plt<R: Read>(reader: R, path: &Path) -> TrajectoryResult<Vec<TrajectoryRecord>> {
    let io_err = |source| TrajectoryError::Io { path: path.to_path_buf(), source };

    let mut reader = BufReader::new(reader);
    let mut skipped = String::new();
    for _ in 0..PLT_HEADER_LINES {
        skipped.clear();
        if reader.read_line(&mut skipped).map_err(io_err)? == 0 {
            // Header-only (or truncated) file: no records.
            return Ok(Vec::new());
        }
    }

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result.map_err(|e| TrajectoryError::Malformed {
            path:   path.to_path_buf(),
            line:   e.position().map_or(0, |p| p.line()) + PLT_HEADER_LINES,
            reason: e.to_string(),
        })?;
        let line = row.position().map_or(0, |p| p.line()) + PLT_HEADER_LINES;
        let field = |i: usize, name: &str| -> TrajectoryResult<f64> {
            let raw = row.get(i).ok_or_else(|| TrajectoryError::Malformed {
                path:   path.to_path_buf(),
                line,
                reason: format!("missing {name} (field {i})"),
            })?;
            raw.trim().parse::<f64>().map_err(|_| TrajectoryError::Malformed {
                path:   path.to_path_buf(),
                line,
                reason: format!("{name} {raw:?} is not a number"),
            })
        };
        records.push(TrajectoryRecord::new(
            field(0, "latitude")?,
            field(1, "longitude")?,
            field(3, "altitude")?,
            field(4, "time")?,
        ));
    }
    Ok(records)
}
