//! `gc-population` — building the initial agent set.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                |
//! |--------------------|---------------------------------------------------------|
//! | [`loader`]         | `PopulationBuilder`, `load_population`                  |
//! | [`raster`]         | ESRI ASCII density rasters, `DensityCell`               |
//! | [`demographics`]   | `person,age` CSV overrides                              |
//! | [`interactions`]   | `InteractionLog` (time-ordered proximity events)        |
//! | [`outbreak`]       | `seed_outbreak` (index-case selection)                  |
//! | [`error`]          | `PopulationError`, `PopulationResult<T>`                |

pub mod demographics;
pub mod error;
pub mod interactions;
pub mod loader;
pub mod outbreak;
pub mod raster;


pub use demographics::{AgeTable, load_demographics, load_demographics_reader};
pub use error::{PopulationError, PopulationResult};
pub use interactions::{InteractionLog, ScheduledInteraction, load_interactions, load_interactions_reader};
pub use loader::{PopulationBuilder, earliest_start, load_population};
pub use outbreak::seed_outbreak;
pub use raster::{DensityCell, RasterHeader, parse_raster, read_raster, read_raster_dir};
