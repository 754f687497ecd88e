//! # rpmcc node
//!
//! Runs an RPM clock controller against a simulated RPM agent. The agent
//! lives on a tokio task behind a request queue; the controller talks to it
//! through the blocking [`MailboxTransport`], one acknowledged request at a
//! time, exactly as it would talk to real firmware.
//!
//! ```text
//!  stdin ──► Command ──► ClockController ──► MailboxTransport
//!                                                  │ mpsc + oneshot ack
//!                                                  ▼
//!                                           SimulatedAgent (registers, history)
//! ```

pub mod agent;
pub mod command;
pub mod config;
pub mod error;

pub use agent::{AgentEvent, AgentHandle, MailboxTransport, RegisterEntry, SimulatedAgent};
pub use command::Command;
pub use config::{AgentConfig, NodeConfig};
pub use error::{NodeError, Result};
