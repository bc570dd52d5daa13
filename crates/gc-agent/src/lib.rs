//! `gc-agent` — the people being simulated.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                    |
//! |-----------------|-------------------------------------------------------------|
//! | [`disease`]     | `DiseaseParams`, `Health`, `Stage`                          |
//! | [`ledger`]      | `ContactLedger` (shared log of confirmed interaction ids)   |
//! | [`agent`]       | `Agent`, `Locomotion`, `World`, `StepOutcome`               |
//! | [`store`]       | `Population` (owns every agent), `InteractionOutcome`       |
//! | [`error`]       | `AgentError`, `AgentResult<T>`                              |
//!
//! # Epidemiological states
//!
//! ```text
//! Susceptible ──infect──▶ Incubating ──▶ Infectious ──┬──▶ Dead
//!      ▲                                              ├──▶ Immune
//!      └──────────────────────────────────────────────┘  (recovered, not immune)
//! ```
//!
//! Orthogonally, a mobile agent whose trajectory runs out leaves the
//! simulation (it is marked dead and removed from both grids).

pub mod agent;
pub mod disease;
pub mod error;
pub mod ledger;
pub mod store;


pub use agent::{Agent, Locomotion, StepOutcome, World, sample_age};
pub use disease::{DiseaseParams, Health, NOT_APPLICABLE, Stage};
pub use error::{AgentError, AgentResult};
pub use ledger::ContactLedger;
pub use store::{HealthCounts, InteractionOutcome, Population};
