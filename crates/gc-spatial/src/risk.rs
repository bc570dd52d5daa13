//! Risk accumulation and end-of-run normalization.
//!
//! During the run every infected agent adds one to the Grid-A cell it
//! occupies, once per consumed trajectory record (stationary agents once
//! per timestep).  Counters are atomic so the parallel stepping
//! phase can record without locks.
//!
//! # Normalization
//!
//! ```text
//! level(c) = 0                    if c == 0
//!          = log10(c) + 1         otherwise
//! value    = round(level / max_level * 255)
//! ```
//!
//! The `+ 1` keeps a cell visited once (log10(1) = 0) distinct from a cell
//! never visited, and keeps the divisor non-zero whenever any cell is
//! positive.  The hottest cell always maps to 255 and unvisited cells to 0.
//! Dividing `log10(c)` by `max_level + 1` instead would cap the hottest cell
//! below 255, so the offset is applied to the numerator as well.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::{Cell, SpatialError, SpatialResult};

/// Largest normalized risk value.
pub const RISK_MAX: u8 = 255;

// ── RiskGrid ──────────────────────────────────────────────────────────────────

/// Raw per-cell counters, one per Grid-A cell.  Monotonically non-decreasing.
pub struct RiskGrid {
    size:   usize,
    counts: Vec<AtomicU64>,
}

impl RiskGrid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            counts: (0..size * size).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Count one infected-agent presence in `cell`.
    #[inline]
    pub fn record(&self, cell: Cell) {
        self.counts[cell.flat(self.size)].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn count(&self, cell: Cell) -> u64 {
        self.counts[cell.flat(self.size)].load(Ordering::Relaxed)
    }

    /// Row-major copy of all raw counts.
    pub fn raw_counts(&self) -> Vec<u64> {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).collect()
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|c| c.load(Ordering::Relaxed)).sum()
    }

    /// Log-scale and rescale the counters into a [`RiskMap`].
    pub fn normalize(&self) -> RiskMap {
        RiskMap::from_counts(self.size, &self.raw_counts())
    }
}

// ── RiskMap ───────────────────────────────────────────────────────────────────

/// Normalized N×N risk surface (row-major, 0–255) handed to the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskMap {
    size:   usize,
    values: Vec<u8>,
}

impl RiskMap {
    /// Normalize raw row-major `counts` for an N×N grid.
    ///
    /// Scales by `(log10(c) + 1) / max_level` rather than
    /// `log10(c) / (max_level + 1)` so the hottest cell reaches 255.
    pub fn from_counts(size: usize, counts: &[u64]) -> RiskMap {
        let levels: Vec<f64> = counts
            .iter()
            .map(|&c| if c == 0 { 0.0 } else { (c as f64).log10() + 1.0 })
            .collect();
        let max_level = levels.iter().copied().fold(0.0_f64, f64::max);

        let values = if max_level > 0.0 {
            levels
                .iter()
                .map(|&l| (l / max_level * RISK_MAX as f64).round() as u8)
                .collect()
        } else {
            vec![0; counts.len()]
        };
        RiskMap { size, values }
    }

    /// Wrap already-normalized values.
    pub fn from_values(size: usize, values: Vec<u8>) -> SpatialResult<RiskMap> {
        if values.len() != size * size {
            return Err(SpatialError::RiskMapSize { expected: size * size, got: values.len() });
        }
        Ok(RiskMap { size, values })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn get(&self, cell: Cell) -> u8 {
        self.values[cell.flat(self.size)]
    }

    /// Row-major values.
    #[inline]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// One slice per grid row (latitude band, southmost first).
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.values.chunks(self.size.max(1))
    }

    pub fn max(&self) -> u8 {
        self.values.iter().copied().max().unwrap_or(0)
    }

    /// Number of cells ever visited by an infected agent.
    pub fn hot_cells(&self) -> usize {
        self.values.iter().filter(|&&v| v > 0).count()
    }
}
