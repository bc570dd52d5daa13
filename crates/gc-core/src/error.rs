//! Base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! operation (config loading, parsing) can fail underneath them.

use thiserror::Error;

/// The top-level error type for `gc-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `gc-core`.
pub type CoreResult<T> = Result<T, CoreError>;
