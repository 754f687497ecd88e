//! Simulated RPM agent
//!
//! Serves clock requests from a bounded queue on a tokio task. Each request
//! carries a oneshot sender; the agent decodes the record, applies it to its
//! register file and acknowledges. [`MailboxTransport`] is the blocking side
//! the controller writes through, so it must not be used from inside an
//! async context.

use crate::config::AgentConfig;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;
use rpmcc_core::{ChannelError, ClockRequest, FourCc, ResourceSlot, RpmState, RpmTransport, RPM_REJECT_CODE};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Request as queued to the agent
#[derive(Debug)]
pub struct AgentRequest {
    pub msg_id: u64,
    pub state: RpmState,
    pub slot: ResourceSlot,
    pub payload: Vec<u8>,
    pub ack: oneshot::Sender<Result<(), ChannelError>>,
}

/// One processed request
#[derive(Debug, Clone, Serialize)]
pub struct AgentEvent {
    pub msg_id: u64,
    pub at: DateTime<Utc>,
    pub state: RpmState,
    pub slot: String,
    pub key: String,
    pub value: Option<u32>,
    pub accepted: bool,
}

/// Register value as seen by the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntry {
    pub state: RpmState,
    pub slot: String,
    pub key: String,
    pub value: u32,
}

type RegisterKey = (RpmState, ResourceSlot, u32);

#[derive(Debug, Default)]
struct AgentShared {
    registers: Mutex<HashMap<RegisterKey, u32>>,
    history: Mutex<VecDeque<AgentEvent>>,
}

/// Read-only view of the agent's state, usable from any thread
#[derive(Debug, Clone)]
pub struct AgentHandle {
    shared: Arc<AgentShared>,
}

impl AgentHandle {
    pub fn register(&self, state: RpmState, slot: ResourceSlot, key: u32) -> Option<u32> {
        self.shared.registers.lock().get(&(state, slot, key)).copied()
    }

    /// All registers, sorted by slot then state
    pub fn registers(&self) -> Vec<RegisterEntry> {
        let registers = self.shared.registers.lock();
        let mut keys: Vec<_> = registers.keys().copied().collect();
        keys.sort_by_key(|(state, slot, key)| (slot.res_type, slot.res_id, *key, *state as u8));

        keys.into_iter()
            .map(|k| RegisterEntry {
                state: k.0,
                slot: k.1.to_string(),
                key: FourCc(k.2).to_string(),
                value: registers[&k],
            })
            .collect()
    }

    pub fn history(&self) -> Vec<AgentEvent> {
        self.shared.history.lock().iter().cloned().collect()
    }

    /// Most recent `n` events
    pub fn recent(&self, n: usize) -> Vec<AgentEvent> {
        let history = self.shared.history.lock();
        let start = history.len().saturating_sub(n);
        history.iter().skip(start).cloned().collect()
    }
}

/// Agent task state
pub struct SimulatedAgent {
    config: AgentConfig,
    rx: mpsc::Receiver<AgentRequest>,
    shared: Arc<AgentShared>,
}

impl SimulatedAgent {
    /// Create an agent and the transport that feeds it
    pub fn new(config: AgentConfig) -> (Self, MailboxTransport) {
        let (tx, rx) = mpsc::channel(config.queue_depth.max(1));
        let agent = Self {
            config,
            rx,
            shared: Arc::new(AgentShared::default()),
        };
        let transport = MailboxTransport {
            tx,
            next_id: AtomicU64::new(1),
        };
        (agent, transport)
    }

    pub fn handle(&self) -> AgentHandle {
        AgentHandle {
            shared: self.shared.clone(),
        }
    }

    /// Serve requests until every transport is dropped
    pub async fn run(mut self) {
        info!(
            "Agent: serving (failure rate {:.2}, latency {}ms)",
            self.config.failure_rate, self.config.latency_ms
        );

        while let Some(req) = self.rx.recv().await {
            if self.config.latency_ms > 0 {
                tokio::time::sleep(self.config.latency()).await;
            }

            let result = self.process(&req);
            if req.ack.send(result).is_err() {
                debug!("Agent: requester for #{} went away", req.msg_id);
            }
        }

        info!("Agent: request queue closed");
    }

    fn process(&self, req: &AgentRequest) -> Result<(), ChannelError> {
        let record = match ClockRequest::decode(&req.payload) {
            Ok(record) => record,
            Err(e) => {
                warn!("Agent: #{} malformed record: {}", req.msg_id, e);
                self.log(req, None, false);
                return Err(e.into());
            }
        };

        if self.should_reject(req.state) {
            debug!("Agent: rejecting #{} {} {}", req.msg_id, req.state, req.slot);
            self.log(req, Some(&record), false);
            return Err(ChannelError::Rejected { code: RPM_REJECT_CODE });
        }

        self.shared
            .registers
            .lock()
            .insert((req.state, req.slot, record.key), record.value);
        self.log(req, Some(&record), true);

        debug!(
            "Agent: #{} {} {} {}={}",
            req.msg_id,
            req.state,
            req.slot,
            FourCc(record.key),
            record.value
        );
        Ok(())
    }

    fn should_reject(&self, state: RpmState) -> bool {
        if self.config.fail_state.is_some_and(|s| s != state) {
            return false;
        }
        self.config.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.config.failure_rate.min(1.0))
    }

    /// Append to history, dropping the oldest events past the limit
    fn log(&self, req: &AgentRequest, record: Option<&ClockRequest>, accepted: bool) {
        let mut history = self.shared.history.lock();
        if self.config.history_limit == 0 {
            return;
        }
        while history.len() >= self.config.history_limit {
            history.pop_front();
        }
        history.push_back(AgentEvent {
            msg_id: req.msg_id,
            at: Utc::now(),
            state: req.state,
            slot: req.slot.to_string(),
            key: record.map(|r| FourCc(r.key).to_string()).unwrap_or_default(),
            value: record.map(|r| r.value),
            accepted,
        });
    }
}

/// Blocking transport that queues requests to a [`SimulatedAgent`]
#[derive(Debug)]
pub struct MailboxTransport {
    tx: mpsc::Sender<AgentRequest>,
    next_id: AtomicU64,
}

impl RpmTransport for MailboxTransport {
    fn write(&self, state: RpmState, slot: ResourceSlot, payload: &[u8]) -> Result<(), ChannelError> {
        let (ack, ack_rx) = oneshot::channel();
        let req = AgentRequest {
            msg_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            state,
            slot,
            payload: payload.to_vec(),
            ack,
        };

        self.tx
            .blocking_send(req)
            .map_err(|_| ChannelError::Disconnected)?;

        ack_rx.blocking_recv().map_err(|_| ChannelError::Disconnected)?
    }
}
