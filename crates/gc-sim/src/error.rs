use gc_agent::AgentError;
use gc_core::{AgentId, CoreError};
use gc_population::PopulationError;
use gc_spatial::SpatialError;
use gc_trajectory::TrajectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("trajectory of agent {agent}: {source}")]
    Trajectory {
        agent:  AgentId,
        #[source]
        source: TrajectoryError,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Population(#[from] PopulationError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::Config(e.to_string())
    }
}

impl SimError {
    /// Attribute an error raised while stepping `agent`.
    pub(crate) fn stepping(agent: AgentId, e: AgentError) -> Self {
        match e {
            AgentError::Trajectory(source) => SimError::Trajectory { agent, source },
            other => SimError::Agent(other),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
