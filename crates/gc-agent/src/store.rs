//! `Population`: owns every agent, indexed by `AgentId`.
//!
//! Agent `i` lives at index `i`, so ids double as vector indices.  Pairwise
//! operations borrow two agents mutably through `split_at_mut`.

use gc_core::{AgentId, InteractionId, SimRng};
use rustc_hash::FxHashMap;

use crate::{Agent, World};

/// Aggregate health counts over a population.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct HealthCounts {
    pub alive:       usize,
    pub dead:        usize,
    pub susceptible: usize,
    pub infected:    usize,
    pub infectious:  usize,
    pub immune:      usize,
    pub confirmed:   usize,
}

/// Result of one pairwise interaction.
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionOutcome {
    pub id:       InteractionId,
    /// Agents newly infected by the contact itself or by ambient exposure.
    pub infected: Vec<AgentId>,
}

#[derive(Default, Debug)]
pub struct Population {
    agents:   Vec<Agent>,
    by_label: FxHashMap<String, AgentId>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next pushed agent must carry.
    pub fn next_id(&self) -> AgentId {
        AgentId(self.agents.len() as u32)
    }

    pub fn push(&mut self, agent: Agent) -> AgentId {
        let id = agent.id();
        debug_assert_eq!(id, self.next_id(), "agents must be pushed in id order");
        self.by_label.entry(agent.label().to_owned()).or_insert(id);
        self.agents.push(agent);
        id
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// Agent registered under `label` (first one wins on duplicates).
    pub fn find(&self, label: &str) -> Option<AgentId> {
        self.by_label.get(label).copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Mutable slice for the (possibly parallel) stepping phase.
    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    /// Two distinct agents borrowed mutably at once.
    pub fn pair_mut(&mut self, a: AgentId, b: AgentId) -> Option<(&mut Agent, &mut Agent)> {
        let (i, j) = (a.index(), b.index());
        if i == j || i >= self.agents.len() || j >= self.agents.len() {
            return None;
        }
        if i < j {
            let (lo, hi) = self.agents.split_at_mut(j);
            Some((&mut lo[i], &mut hi[0]))
        } else {
            let (lo, hi) = self.agents.split_at_mut(i);
            Some((&mut hi[0], &mut lo[j]))
        }
    }

    /// Ids of every agent currently infectious, ascending.
    pub fn infectious_ids(&self) -> Vec<AgentId> {
        self.agents.iter().filter(|a| a.is_infectious()).map(Agent::id).collect()
    }

    pub fn counts(&self) -> HealthCounts {
        let mut c = HealthCounts::default();
        for agent in &self.agents {
            if !agent.is_alive() {
                c.dead += 1;
                continue;
            }
            c.alive += 1;
            let health = agent.health();
            if health.is_susceptible() {
                c.susceptible += 1;
            }
            if health.infected {
                c.infected += 1;
            }
            if health.is_infectious() {
                c.infectious += 1;
            }
            if health.immune {
                c.immune += 1;
            }
            if agent.confirmed_code().is_some() {
                c.confirmed += 1;
            }
        }
        c
    }

    // ── Interactions ──────────────────────────────────────────────────────

    /// Record a direct contact between `a` and `b` under a fresh interaction
    /// id.  Returns `None` if the pair is invalid or either party is dead.
    pub fn interact(
        &mut self,
        a: AgentId,
        b: AgentId,
        world: &World<'_>,
        rng: &mut SimRng,
    ) -> Option<InteractionOutcome> {
        let id = InteractionId(rng.random::<u64>());
        self.interact_as(a, b, id, world, rng)
    }

    /// [`interact`](Self::interact) with a caller-supplied id.
    ///
    /// Both parties log `id`.  Each infectious party infects the other with
    /// the spread probability, or with certainty when either party is a
    /// confirmed case.  If `a` is infectious, everyone else sharing either of
    /// its cells is additionally exposed with the ambient probability.
    pub fn interact_as(
        &mut self,
        a: AgentId,
        b: AgentId,
        id: InteractionId,
        world: &World<'_>,
        rng: &mut SimRng,
    ) -> Option<InteractionOutcome> {
        let (first, second) = self.pair_mut(a, b)?;
        if !first.is_alive() || !second.is_alive() {
            return None;
        }

        let first_infectious = first.is_infectious();
        let second_infectious = second.is_infectious();
        let confirmed = first.confirmed_code().is_some() || second.confirmed_code().is_some();
        let p = if confirmed { 1.0 } else { world.params.spread_prob };

        first.record_interaction(id, world.ledger);
        second.record_interaction(id, world.ledger);

        let mut infected = Vec::new();
        if first_infectious && rng.gen_bool(p) && second.infect(None, world) {
            infected.push(b);
        }
        if second_infectious && rng.gen_bool(p) && first.infect(None, world) {
            infected.push(a);
        }

        if first_infectious {
            let mut bystanders = world.grid.neighbors(first.cells());
            bystanders.sort_unstable();
            bystanders.dedup();
            for other in bystanders {
                if other == a || other == b || !rng.gen_bool(world.params.ambient_exposure_prob) {
                    continue;
                }
                if let Some(agent) = self.agents.get_mut(other.index()) {
                    if agent.infect(None, world) {
                        infected.push(other);
                    }
                }
            }
        }

        Some(InteractionOutcome { id, infected })
    }
}
