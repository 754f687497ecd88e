//! Node errors

use rpmcc_core::RpmClkError;
use thiserror::Error;

/// Errors raised by the simulation node
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("Controller error: {0}")]
    Controller(#[from] RpmClkError),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failure rate {0} outside [0, 1]")]
    InvalidFailureRate(f64),

    #[error("Request queue depth must be non-zero")]
    InvalidQueueDepth,

    #[error("Invalid command: {0}")]
    BadCommand(String),
}

pub type Result<T> = std::result::Result<T, NodeError>;
