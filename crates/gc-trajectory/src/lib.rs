//! `gc-trajectory` — recorded movement for mobile agents.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`record`]  | `TrajectoryRecord`, `read_plt`, `parse_plt`                     |
//! | [`source`]  | `TrajectorySource` trait, `PltDirectory`, `MemorySource`        |
//! | [`cursor`]  | `TrajectoryCursor` with `peek` / `advance` / `is_exhausted`   |
//! | [`error`]   | `TrajectoryError`, `TrajectoryResult<T>`                        |
//!
//! # Playback model
//!
//! A person's trajectory is a chronologically named sequence of files.  The
//! cursor loads one file at a time, hands records out strictly in order, and
//! never rewinds.  Files are read only when the previous one runs dry, so a
//! population of thousands of people never holds more than one file's worth
//! of records per person and no open file handles between steps.

pub mod cursor;
pub mod error;
pub mod record;
pub mod source;


pub use cursor::TrajectoryCursor;
pub use error::{TrajectoryError, TrajectoryResult};
pub use record::{PLT_HEADER_LINES, TrajectoryRecord, parse_plt, read_plt};
pub use source::{MemorySource, PltDirectory, TrajectorySource};
