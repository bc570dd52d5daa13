use gc_trajectory::TrajectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("trajectory {0:?} has no records")]
    NoRecords(String),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

pub type AgentResult<T> = Result<T, AgentError>;
