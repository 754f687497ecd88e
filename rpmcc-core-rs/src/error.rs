//! Error types for the clock controller, the remote channel and the wire codec.

use crate::types::RpmState;
use thiserror::Error;

/// Wire record decoding error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("record truncated: {len} bytes, need {need}")]
    Truncated { len: usize, need: usize },

    #[error("unexpected value length {nbytes} (expected 4)")]
    BadLength { nbytes: u32 },
}

/// Failure reported by the transport to the remote agent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("channel to RPM disconnected")]
    Disconnected,

    #[error("RPM rejected request (code {code})")]
    Rejected { code: i32 },

    #[error("malformed acknowledgement: {0}")]
    MalformedAck(String),

    #[error("malformed request: {0}")]
    Wire(#[from] WireError),
}

/// Clock controller error
#[derive(Debug, Error)]
pub enum RpmClkError {
    #[error("{state} vote for {clock} failed: {source}")]
    TransportFailure {
        clock: String,
        state: RpmState,
        #[source]
        source: ChannelError,
    },

    #[error("RPM clock scaling ({state} set) not enabled: {source}")]
    NotInitialized {
        state: RpmState,
        #[source]
        source: ChannelError,
    },

    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),

    #[error("unknown clock '{0}'")]
    UnknownClock(String),

    #[error("clock {0} has no settable rate")]
    RateNotSettable(String),

    #[error("clock {0} is enabled; change its rate with set_rate")]
    AlreadyEnabled(String),

    #[error("invalid peer binding for clock {clock}: {reason}")]
    InvalidPeer { clock: String, reason: String },

    #[error("duplicate clock name '{0}'")]
    DuplicateClock(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpmClkError {
    /// Whether the remote agent was involved in the failure
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RpmClkError::TransportFailure { .. } | RpmClkError::NotInitialized { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RpmClkError>;
