//! Seeding the index case.

use gc_agent::{Population, World};
use gc_core::{AgentId, OutbreakConfig, SimRng};
use log::info;

use crate::{PopulationError, PopulationResult};

/// Infect one agent to start the outbreak: the configured index agent, or
/// an alive agent chosen uniformly at random.  The configured confirmation
/// code, if any, is attached.
pub fn seed_outbreak(
    population: &mut Population,
    outbreak: &OutbreakConfig,
    world: &World<'_>,
    rng: &mut SimRng,
) -> PopulationResult<AgentId> {
    let id = match outbreak.index_agent {
        Some(raw) => {
            let id = AgentId(raw);
            match population.get(id) {
                Some(agent) if agent.is_alive() => id,
                _ => return Err(PopulationError::UnknownAgent(raw.to_string())),
            }
        }
        None => {
            let alive: Vec<AgentId> =
                population.iter().filter(|a| a.is_alive()).map(|a| a.id()).collect();
            if alive.is_empty() {
                return Err(PopulationError::NoAgents);
            }
            alive[rng.gen_range(0..alive.len())]
        }
    };

    if let Some(agent) = population.get_mut(id) {
        agent.infect(outbreak.confirmed_code.as_deref(), world);
        info!("index case: agent {id} ({}) at {}", agent.label(), agent.position());
    }
    Ok(id)
}
