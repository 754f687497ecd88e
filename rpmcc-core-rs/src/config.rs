//! Configuration for the clock controller

use crate::catalog;
use crate::error::Result;
use crate::types::RateHz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Pending rate to record before the clocks are exposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSeed {
    pub clock: String,
    pub rate_hz: RateHz,
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Platform compatible string, e.g. `qcom,rpmcc-msm8916`
    pub platform: String,

    /// Initial rate requests, applied in order
    #[serde(default)]
    pub rates: Vec<RateSeed>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            platform: catalog::MSM8916.compatible.to_string(),
            rates: Vec::new(),
        }
    }
}

impl ControllerConfig {
    /// Create config for a platform
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            ..Default::default()
        }
    }

    /// Seed a pending rate request
    pub fn with_rate(mut self, clock: impl Into<String>, rate_hz: RateHz) -> Self {
        self.rates.push(RateSeed {
            clock: clock.into(),
            rate_hz,
        });
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }
}
