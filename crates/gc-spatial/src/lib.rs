//! `gc-spatial` — where agents are, and where infectious agents have been.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`mapper`]  | `GridMapper`, `Cell`, `CellPair` (lat/lon → two cell indices) |
//! | [`index`]   | `SpatialIndex` (one grid), `DualGrid` (Grid A + Grid B)     |
//! | [`risk`]    | `RiskGrid` (atomic per-cell counters), `RiskMap` (0–255)    |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                         |
//!
//! # Two grids
//!
//! Grid A bins coordinates from the minimum bound.  Grid B bins the same
//! coordinates with the origin shifted back by half a cell in each axis, so
//! two agents straddling a Grid-A boundary still share a Grid-B cell.
//! Querying both grids widens contact detection without radius searches.

pub mod error;
pub mod index;
pub mod mapper;
pub mod risk;


pub use error::{SpatialError, SpatialResult};
pub use index::{DualGrid, SpatialIndex};
pub use mapper::{Cell, CellPair, GridMapper};
pub use risk::{RiskGrid, RiskMap};
