//! Configuration for the simulation node
//!
//! Combines the controller settings with the behaviour of the simulated
//! RPM agent. Loaded from a JSON file; command-line flags override it.

use crate::error::{NodeError, Result};
use rpmcc_core::{ControllerConfig, RateHz, RpmState};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub controller: ControllerConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

/// Simulated RPM agent settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Probability that a request is rejected
    pub failure_rate: f64,

    /// Restrict injected rejections to one set (None = both)
    pub fail_state: Option<RpmState>,

    /// Simulated per-request processing time
    pub latency_ms: u64,

    /// Request queue capacity
    pub queue_depth: usize,

    /// Events kept in the agent history (0 = none)
    pub history_limit: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.0,
            fail_state: None,
            latency_ms: 0,
            queue_depth: 16,
            history_limit: 1024,
        }
    }
}

impl AgentConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(NodeError::InvalidFailureRate(self.failure_rate));
        }
        if self.queue_depth == 0 {
            return Err(NodeError::InvalidQueueDepth);
        }
        Ok(())
    }
}

impl NodeConfig {
    /// Create config for a platform
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            controller: ControllerConfig::new(platform),
            ..Default::default()
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.agent.validate()?;
        Ok(config)
    }

    /// Set platform compatible string
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.controller.platform = platform.into();
        self
    }

    /// Seed a pending rate request
    pub fn with_rate(mut self, clock: impl Into<String>, rate_hz: RateHz) -> Self {
        self.controller = self.controller.with_rate(clock, rate_hz);
        self
    }

    /// Set agent rejection probability
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.agent.failure_rate = rate;
        self
    }

    /// Only reject writes to one set
    pub fn with_fail_state(mut self, state: RpmState) -> Self {
        self.agent.fail_state = Some(state);
        self
    }

    /// Set simulated agent latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.agent.latency_ms = latency.as_millis() as u64;
        self
    }

    /// Set request queue capacity
    pub fn with_queue_depth(mut self, depth: usize) -> Self {
        self.agent.queue_depth = depth;
        self
    }

    /// Set how many agent events are kept
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.agent.history_limit = limit;
        self
    }
}
