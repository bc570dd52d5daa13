//! Plain data row types written by output backends.

use gc_agent::Agent;
use gc_core::Tick;
use gc_sim::StepSummary;

/// One agent's state at a snapshot step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:      u64,
    pub agent_id:  u32,
    pub lat:       f64,
    pub lon:       f64,
    /// Grid-A cell.
    pub cell_row:  u32,
    pub cell_col:  u32,
    /// `susceptible`, `incubating`, `infectious`, `immune` or `dead`.
    pub stage:     &'static str,
    pub confirmed: bool,
}

impl AgentSnapshotRow {
    pub fn capture(tick: Tick, agent: &Agent) -> Self {
        let position = agent.position();
        let cell = agent.cells().a;
        Self {
            tick:      tick.0,
            agent_id:  agent.id().0,
            lat:       position.lat,
            lon:       position.lon,
            cell_row:  cell.row,
            cell_col:  cell.col,
            stage:     agent.stage().as_str(),
            confirmed: agent.confirmed_code().is_some(),
        }
    }
}

/// Population-wide figures for one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepSummaryRow {
    pub tick:           u64,
    pub time_days:      f64,
    pub alive:          u64,
    pub dead:           u64,
    pub infected:       u64,
    pub infectious:     u64,
    pub immune:         u64,
    pub confirmed:      u64,
    pub new_infections: u64,
    pub deaths:         u64,
    pub departures:     u64,
    pub recoveries:     u64,
    pub interactions:   u64,
    pub ledger_size:    u64,
}

impl StepSummaryRow {
    pub const HEADERS: [&'static str; 14] = [
        "tick",
        "time_days",
        "alive",
        "dead",
        "infected",
        "infectious",
        "immune",
        "confirmed",
        "new_infections",
        "deaths",
        "departures",
        "recoveries",
        "interactions",
        "ledger_size",
    ];

    /// Counts in [`HEADERS`](Self::HEADERS) order, after `tick` and
    /// `time_days`.
    pub fn counts(&self) -> [u64; 12] {
        [
            self.alive,
            self.dead,
            self.infected,
            self.infectious,
            self.immune,
            self.confirmed,
            self.new_infections,
            self.deaths,
            self.departures,
            self.recoveries,
            self.interactions,
            self.ledger_size,
        ]
    }
}

impl From<&StepSummary> for StepSummaryRow {
    fn from(s: &StepSummary) -> Self {
        Self {
            tick:           s.tick.0,
            time_days:      s.time_days,
            alive:          s.alive as u64,
            dead:           s.dead as u64,
            infected:       s.infected as u64,
            infectious:     s.infectious as u64,
            immune:         s.immune as u64,
            confirmed:      s.confirmed as u64,
            new_infections: s.new_infections as u64,
            deaths:         s.deaths as u64,
            departures:     s.departures as u64,
            recoveries:     s.recoveries as u64,
            interactions:   s.interactions as u64,
            ledger_size:    s.ledger_size as u64,
        }
    }
}
