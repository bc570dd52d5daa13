//! Logged proximity events replayed during the run.
//!
//! ```csv
//! time_days,agent_a,agent_b
//! 39744.1201,000,003
//! 39744.5,003,017
//! ```
//!
//! Agents are named by label (trajectory directory name); a bare number that
//! matches no label is taken as an `AgentId`.

use std::io::Read;
use std::path::Path;

use gc_agent::Population;
use gc_core::AgentId;
use serde::Deserialize;

use crate::{PopulationError, PopulationResult};

#[derive(Deserialize)]
struct InteractionRecord {
    time_days: f64,
    agent_a:   String,
    agent_b:   String,
}

/// One resolved event.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScheduledInteraction {
    pub time_days: f64,
    pub a:         AgentId,
    pub b:         AgentId,
}

/// Time-ordered events with a replay cursor.
#[derive(Clone, Debug, Default)]
pub struct InteractionLog {
    events: Vec<ScheduledInteraction>,
    next:   usize,
}

impl InteractionLog {
    pub fn new(mut events: Vec<ScheduledInteraction>) -> Self {
        events.sort_by(|x, y| x.time_days.total_cmp(&y.time_days));
        Self { events, next: 0 }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events not yet replayed.
    pub fn remaining(&self) -> usize {
        self.events.len() - self.next
    }

    /// Every not-yet-replayed event with `time_days <= t`, in time order.
    /// Each event is returned once.
    pub fn take_due(&mut self, t: f64) -> &[ScheduledInteraction] {
        let start = self.next;
        while self.next < self.events.len() && self.events[self.next].time_days <= t {
            self.next += 1;
        }
        &self.events[start..self.next]
    }
}

pub fn load_interactions(path: &Path, population: &Population) -> PopulationResult<InteractionLog> {
    let file = std::fs::File::open(path).map_err(|source| PopulationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_interactions_reader(file, path, population)
}

/// Like [`load_interactions`] but accepts any `Read` source.
pub fn load_interactions_reader<R: Read>(
    reader: R,
    path: &Path,
    population: &Population,
) -> PopulationResult<InteractionLog> {
    let mut events = Vec::new();
    for result in csv::Reader::from_reader(reader).deserialize::<InteractionRecord>() {
        let row = result.map_err(|e| PopulationError::Csv {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;
        events.push(ScheduledInteraction {
            time_days: row.time_days,
            a:         resolve(&row.agent_a, population)?,
            b:         resolve(&row.agent_b, population)?,
        });
    }
    Ok(InteractionLog::new(events))
}

fn resolve(name: &str, population: &Population) -> PopulationResult<AgentId> {
    let name = name.trim();
    if let Some(id) = population.find(name) {
        return Ok(id);
    }
    name.parse::<u32>()
        .ok()
        .map(AgentId)
        .filter(|id| id.index() < population.len())
        .ok_or_else(|| PopulationError::UnknownAgent(name.to_owned()))
}
