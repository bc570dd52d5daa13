//! `gc-sim` — timestep loop orchestrator for the geocontagion simulator.
//!
//! # Timestep loop
//!
//! ```text
//! for step in 1..=config.timing.steps:
//!   1. Clock         t = start_days + step * step_days
//!   2. Stepping      Agent::step_to(t) for every agent
//!                    (parallel with the `parallel` feature)
//!   3. Interactions  replay logged proximity events with time <= t
//!   4. Transmission  infectious agents expose Grid-A and Grid-B cell-mates
//!   5. Notification  every notify_interval_steps, agents check their
//!                    history against the contact-tracing ledger
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the stepping phase on Rayon's thread pool.        |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use gc_core::SimConfig;
//! use gc_sim::{NoopObserver, SimBuilder};
//!
//! let config = SimConfig::load("config.toml")?;
//! let mut sim = SimBuilder::new(config).build()?;
//! let risk = sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod transmission;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, StepSummary};
pub use sim::Simulation;
pub use transmission::transmit;
