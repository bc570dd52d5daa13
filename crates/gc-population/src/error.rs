use std::path::PathBuf;

use gc_agent::AgentError;
use gc_trajectory::TrajectoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PopulationError {
    #[error("{path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: bad raster header: {reason}")]
    RasterHeader { path: PathBuf, reason: String },

    #[error("{path}: raster row {row}: {reason}")]
    RasterRow {
        path:   PathBuf,
        row:    usize,
        reason: String,
    },

    #[error("{path}: {reason}")]
    Csv { path: PathBuf, reason: String },

    #[error("unknown agent {0:?}")]
    UnknownAgent(String),

    #[error("no agents to simulate")]
    NoAgents,

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Trajectory(#[from] TrajectoryError),
}

pub type PopulationResult<T> = Result<T, PopulationError>;
