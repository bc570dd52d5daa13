//! Co-location transmission.
//!
//! Every agent infectious at the start of the phase exposes each other
//! occupant of its Grid-A cell and of its Grid-B cell.  Each exposure is its
//! own draw against the occupant's age-dependent contact probability, so an
//! occupant sharing both cells gets two chances and several infectious
//! neighbours each get their own.

use gc_agent::{Population, World};
use gc_core::{AgentId, SimRng};

/// Run the phase.  Returns the newly infected agents in infection order.
pub fn transmit(population: &mut Population, world: &World<'_>, rng: &mut SimRng) -> Vec<AgentId> {
    let mut infected = Vec::new();
    for source in population.infectious_ids() {
        let Some(cells) = population.get(source).map(|a| a.cells()) else { continue };
        for other in world.grid.neighbors(cells) {
            if other == source {
                continue;
            }
            let Some(target) = population.get_mut(other) else { continue };
            if !target.health().is_susceptible() {
                continue;
            }
            let p = world.params.contact_probability(target.age());
            if rng.gen_bool(p) && target.infect(None, world) {
                infected.push(other);
            }
        }
    }
    infected
}
