//! Population-density rasters in ESRI ASCII grid format.
//!
//! ```text
//! ncols         4
//! nrows         3
//! xllcorner     116.0
//! yllcorner     39.0
//! cellsize      0.5
//! NODATA_value  -9999
//! 12.5 0 3 -9999
//! ...
//! ```
//!
//! Header lines are `key value` pairs read until the first numeric line, so
//! both the short header (no `NODATA_value`) and the long one are accepted.
//! Rows run north to south.  Only the window overlapping the simulation
//! bounds is parsed; rows outside it are skipped without tokenising and
//! chunks that miss the bounds entirely are dropped after their header.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use gc_core::{GeoBounds, GeoPoint};
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::{PopulationError, PopulationResult};

/// File extension of raster chunks inside a raster directory.
pub const RASTER_EXTENSION: &str = "asc";

/// One raster cell inside the simulation window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityCell {
    /// Cell centre.
    pub point:   GeoPoint,
    pub density: f64,
}

impl DensityCell {
    /// Number of agents this cell stands for: `floor(density / ratio)`,
    /// clamped at zero.
    pub fn agent_count(&self, density_per_agent: f64) -> usize {
        (self.density / density_per_agent).floor().max(0.0) as usize
    }
}

// ── Header ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct RasterHeader {
    pub ncols:    usize,
    pub nrows:    usize,
    /// Longitude of the western edge.
    pub west:     f64,
    /// Latitude of the southern edge.
    pub south:    f64,
    pub cellsize: f64,
    pub nodata:   Option<f64>,
}

impl RasterHeader {
    fn from_keys(keys: &FxHashMap<String, f64>) -> Result<Self, String> {
        let get = |k: &str| keys.get(k).copied();
        let need = |k: &str| get(k).ok_or_else(|| format!("missing {k}"));

        let ncols = need("ncols")?;
        let nrows = need("nrows")?;
        let cellsize = need("cellsize")?;
        if ncols < 1.0 || nrows < 1.0 || ncols.fract() != 0.0 || nrows.fract() != 0.0 {
            return Err(format!("invalid dimensions {ncols} x {nrows}"));
        }
        if cellsize <= 0.0 {
            return Err(format!("invalid cellsize {cellsize}"));
        }
        let half = cellsize / 2.0;
        let west = match (get("xllcorner"), get("xllcenter")) {
            (Some(x), _) => x,
            (None, Some(x)) => x - half,
            (None, None) => return Err("missing xllcorner/xllcenter".into()),
        };
        let south = match (get("yllcorner"), get("yllcenter")) {
            (Some(y), _) => y,
            (None, Some(y)) => y - half,
            (None, None) => return Err("missing yllcorner/yllcenter".into()),
        };
        Ok(Self {
            ncols: ncols as usize,
            nrows: nrows as usize,
            west,
            south,
            cellsize,
            nodata: get("nodata_value"),
        })
    }

    pub fn north(&self) -> f64 {
        self.south + self.nrows as f64 * self.cellsize
    }

    pub fn east(&self) -> f64 {
        self.west + self.ncols as f64 * self.cellsize
    }

    pub fn extent(&self) -> GeoBounds {
        GeoBounds::new(self.south, self.north(), self.west, self.east())
    }

    pub fn cell_center(&self, row: usize, col: usize) -> GeoPoint {
        GeoPoint::new(
            self.north() - (row as f64 + 0.5) * self.cellsize,
            self.west + (col as f64 + 0.5) * self.cellsize,
        )
    }

    /// Rows whose centres fall inside `bounds`.
    fn row_window(&self, bounds: &GeoBounds) -> Option<RangeInclusive<usize>> {
        let north = self.north();
        index_window(north - bounds.max_lat, north - bounds.min_lat, self.cellsize, self.nrows)
    }

    /// Columns whose centres fall inside `bounds`.
    fn col_window(&self, bounds: &GeoBounds) -> Option<RangeInclusive<usize>> {
        index_window(bounds.min_lon - self.west, bounds.max_lon - self.west, self.cellsize, self.ncols)
    }
}

/// Indices `i` in `[0, n)` with `lo <= (i + 0.5) * step <= hi`.
fn index_window(lo: f64, hi: f64, step: f64, n: usize) -> Option<RangeInclusive<usize>> {
    let first = (lo / step - 0.5).ceil().max(0.0);
    let last = (hi / step - 0.5).floor().min(n as f64 - 1.0);
    if last < 0.0 || first > last {
        return None;
    }
    Some(first as usize..=last as usize)
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// Read the cells of one raster chunk that fall inside `bounds`.
pub fn read_raster(path: &Path, bounds: &GeoBounds) -> PopulationResult<Vec<DensityCell>> {
    let file = File::open(path).map_err(|source| PopulationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_raster(file, path, bounds)
}

/// Like [`read_raster`] over any reader; `path` is used in error messages.
pub fn parse_raster<R: Read>(
    reader: R,
    path: &Path,
    bounds: &GeoBounds,
) -> PopulationResult<Vec<DensityCell>> {
    let io_err = |source| PopulationError::Io { path: path.to_path_buf(), source };
    let mut lines = BufReader::new(reader).lines();

    // ── Header ────────────────────────────────────────────────────────────
    let mut keys: FxHashMap<String, f64> = FxHashMap::default();
    let mut first_row: Option<String> = None;
    for line in lines.by_ref() {
        let line = line.map_err(io_err)?;
        let mut tokens = line.split_whitespace();
        let Some(key) = tokens.next() else { continue };
        if key.parse::<f64>().is_ok() {
            first_row = Some(line);
            break;
        }
        let value = tokens
            .next()
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| PopulationError::RasterHeader {
                path:   path.to_path_buf(),
                reason: format!("no numeric value for {key}"),
            })?;
        keys.insert(key.to_ascii_lowercase(), value);
    }
    let header = RasterHeader::from_keys(&keys).map_err(|reason| PopulationError::RasterHeader {
        path: path.to_path_buf(),
        reason,
    })?;

    if !header.extent().intersects(bounds) {
        debug!("{}: outside simulation bounds, skipped", path.display());
        return Ok(Vec::new());
    }
    let (Some(rows), Some(cols)) = (header.row_window(bounds), header.col_window(bounds)) else {
        return Ok(Vec::new());
    };

    // ── Rows ──────────────────────────────────────────────────────────────
    let width = cols.end() - cols.start() + 1;
    let mut out = Vec::new();
    let mut row = 0usize;
    let body = first_row.into_iter().map(Ok).chain(lines);
    for line in body {
        let line = line.map_err(io_err)?;
        if line.trim().is_empty() {
            continue;
        }
        if row > *rows.end() {
            break;
        }
        if row >= *rows.start() {
            let mut taken = 0;
            for (offset, token) in line.split_whitespace().skip(*cols.start()).take(width).enumerate() {
                taken += 1;
                let density: f64 = token.parse().map_err(|_| PopulationError::RasterRow {
                    path:   path.to_path_buf(),
                    row,
                    reason: format!("non-numeric value {token:?}"),
                })?;
                if header.nodata == Some(density) {
                    continue;
                }
                let point = header.cell_center(row, cols.start() + offset);
                if bounds.contains(point) {
                    out.push(DensityCell { point, density });
                }
            }
            if taken < width {
                return Err(PopulationError::RasterRow {
                    path: path.to_path_buf(),
                    row,
                    reason: format!("expected {} values", header.ncols),
                });
            }
        }
        row += 1;
    }
    if row <= *rows.end() {
        return Err(PopulationError::RasterRow {
            path: path.to_path_buf(),
            row,
            reason: format!("file ends before row {} of {}", rows.end(), header.nrows),
        });
    }
    Ok(out)
}

/// Read every `*.asc` chunk in `dir` (file-name order) and concatenate the
/// cells that fall inside `bounds`.
pub fn read_raster_dir(dir: &Path, bounds: &GeoBounds) -> PopulationResult<Vec<DensityCell>> {
    let io_err = |source| PopulationError::Io { path: dir.to_path_buf(), source };
    let mut chunks: Vec<PathBuf> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|e| e.eq_ignore_ascii_case(RASTER_EXTENSION)) {
            chunks.push(path);
        }
    }
    chunks.sort();

    let mut cells = Vec::new();
    for chunk in &chunks {
        cells.extend(read_raster(chunk, bounds)?);
    }
    info!("read {} density cells from {} raster chunks", cells.len(), chunks.len());
    Ok(cells)
}
