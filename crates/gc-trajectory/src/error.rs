use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrajectoryError {
    #[error("{path}: line {line}: {reason}")]
    Malformed {
        path:   PathBuf,
        line:   u64,
        reason: String,
    },

    #[error("{0}: no trajectory files")]
    Empty(PathBuf),

    #[error("{path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type TrajectoryResult<T> = Result<T, TrajectoryError>;
