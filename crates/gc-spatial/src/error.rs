//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `gc-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    #[error("risk map has {got} cells, expected {expected}")]
    RiskMapSize { expected: usize, got: usize },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
