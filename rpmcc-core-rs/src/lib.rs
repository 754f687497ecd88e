//! # rpmcc: RPM clock voting
//!
//! Clocks on Qualcomm SoCs are owned by the Resource Power Manager (RPM).
//! Software does not set them; it votes, and the RPM runs each resource
//! fast enough for every voter. This crate aggregates the votes of paired
//! logical clocks and keeps them in sync with the RPM over a blocking
//! request/acknowledge channel.
//!
//! ## Clock pairs
//!
//! Each RPM clock resource is shared by two logical clocks: one voting for
//! both the active and the sleep set, and an `_a` twin voting for the active
//! set only. Each is the other's peer; the vote sent is the `max` of both.
//!
//! ## Quick Start
//!
//! ```ignore
//! use rpmcc_core::prelude::*;
//!
//! let config = ControllerConfig::new("qcom,rpmcc-msm8916")
//!     .with_rate("bimc_clk", 200_000_000);
//! let cc = ClockController::probe(transport, &config)?;
//!
//! let bimc = cc.lookup("bimc_clk")?;
//! cc.enable(bimc)?;
//! cc.set_rate(bimc, 400_000_000)?;
//! ```

pub mod types;
pub mod error;
pub mod descriptor;
pub mod catalog;
pub mod vote;
pub mod channel;
pub mod engine;
pub mod config;
pub mod controller;
#[cfg(any(test, feature = "testing"))]
pub mod loopback;

pub use types::*;
pub use error::{ChannelError, Result, RpmClkError, WireError};
pub use descriptor::ResourceDescriptor;
pub use catalog::{ClockPair, Platform};
pub use vote::{ClockStatus, Contribution, VoteState, VoteTable};
pub use channel::{ClockRequest, RemoteChannel, RpmTransport, RECORD_LEN};
pub use engine::{VoteOutcome, VotingEngine};
pub use config::{ControllerConfig, RateSeed};
pub use controller::{enable_scaling, ClockController};

/// Prelude - commonly used items
pub mod prelude {
    pub use crate::channel::RpmTransport;
    pub use crate::config::ControllerConfig;
    pub use crate::controller::ClockController;
    pub use crate::engine::VoteOutcome;
    pub use crate::error::{Result, RpmClkError};
    pub use crate::types::{ClockId, RateHz, RpmState};
}
