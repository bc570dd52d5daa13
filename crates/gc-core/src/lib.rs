//! `gc-core` — foundational types for the geocontagion epidemic simulator.
//!
//! This crate is a dependency of every other `gc-*` crate.  It has no `gc-*`
//! dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `InteractionId`                            |
//! | [`geo`]         | `GeoPoint`, `GeoBounds`                               |
//! | [`time`]        | `Tick`, `SimClock`                                    |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)             |
//! | [`config`]      | `SimConfig` and its TOML sections                     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{
    DiseaseConfig, GridConfig, OutbreakConfig, OutputConfig, PopulationConfig, RunConfig,
    SimConfig, TimingConfig,
};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoBounds, GeoPoint};
pub use ids::{AgentId, InteractionId};
pub use rng::{AgentRng, SimRng};
pub use time::{SECONDS_PER_DAY, SimClock, Tick};
