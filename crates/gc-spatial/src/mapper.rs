//! Coordinate → grid-cell mapping.

use gc_core::{GeoBounds, GeoPoint};
use serde::{Deserialize, Serialize};

use crate::{SpatialError, SpatialResult};

/// A (row, column) address in an N×N grid.  Rows follow latitude, columns
/// follow longitude; both are always in `[0, N)`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    #[inline]
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Row-major offset into a flat N×N array.
    #[inline]
    pub fn flat(self, size: usize) -> usize {
        self.row as usize * size + self.col as usize
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.row, self.col)
    }
}

/// The Grid-A cell and Grid-B cell an agent occupies.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct CellPair {
    pub a: Cell,
    pub b: Cell,
}

/// Maps geographic coordinates onto Grid A and Grid B.
#[derive(Clone, Debug)]
pub struct GridMapper {
    bounds:   GeoBounds,
    size:     usize,
    lat_step: f64,
    lon_step: f64,
}

impl GridMapper {
    pub fn new(bounds: GeoBounds, size: usize) -> SpatialResult<Self> {
        if size == 0 || size > u32::MAX as usize {
            return Err(SpatialError::InvalidGrid(format!("resolution {size} out of range")));
        }
        if !(bounds.lat_span() > 0.0) || !(bounds.lon_span() > 0.0) {
            return Err(SpatialError::InvalidGrid(format!("empty bounds {bounds:?}")));
        }
        Ok(Self {
            bounds,
            size,
            lat_step: bounds.lat_span() / size as f64,
            lon_step: bounds.lon_span() / size as f64,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Both cell indices for `p`.  Points outside the bounds clamp to the
    /// nearest edge cell on both grids.
    pub fn locate(&self, p: GeoPoint) -> CellPair {
        let b = &self.bounds;
        let (row_a, row_b) = self.bin_axis(p.lat, b.min_lat, b.max_lat, self.lat_step);
        let (col_a, col_b) = self.bin_axis(p.lon, b.min_lon, b.max_lon, self.lon_step);
        CellPair {
            a: Cell::new(row_a, col_a),
            b: Cell::new(row_b, col_b),
        }
    }

    /// Geographic centre of a Grid-A cell.
    pub fn center_of(&self, cell: Cell) -> GeoPoint {
        GeoPoint::new(
            self.bounds.min_lat + (cell.row as f64 + 0.5) * self.lat_step,
            self.bounds.min_lon + (cell.col as f64 + 0.5) * self.lon_step,
        )
    }

    /// The `k`-th Grid-B cell overlapping Grid-A cell `a`, cycling through
    /// the four overlapping cells in checkerboard order.  Used to spread many
    /// agents placed at one Grid-A cell across Grid B.
    pub fn checkerboard_b(&self, a: Cell, k: usize) -> Cell {
        let max = (self.size - 1) as u32;
        let d_row = (k & 1) as u32;
        let d_col = ((k >> 1) & 1) as u32 ^ d_row;
        Cell::new((a.row + d_row).min(max), (a.col + d_col).min(max))
    }

    /// Bin one axis on both grids: `(index_a, index_b)`.
    fn bin_axis(&self, value: f64, min: f64, max: f64, step: f64) -> (u32, u32) {
        let last = (self.size - 1) as u32;
        if value < min {
            return (0, 0);
        }
        if value > max {
            return (last, last);
        }
        let a = ((value - min) / step).floor() as u32;
        let b = ((value - (min - 0.5 * step)) / step).floor() as u32;
        (a.min(last), b.min(last))
    }
}
