//! In-process RPM stand-in for tests and simulation
//!
//! Decodes every record, keeps the last accepted value per
//! `(state, slot, key)` register, and records every attempted write.
//! Failures are injected one write at a time, or by disconnecting.

use crate::channel::{ClockRequest, RpmTransport};
use crate::error::ChannelError;
use crate::types::{ResourceSlot, RpmState, RPM_REJECT_CODE};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One attempted write as seen by the loopback agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    pub state: RpmState,
    pub slot: ResourceSlot,
    pub key: u32,
    pub value: u32,
    pub accepted: bool,
}

type Register = (RpmState, ResourceSlot, u32);

#[derive(Debug, Default)]
struct LoopbackState {
    history: Vec<WriteRecord>,
    registers: HashMap<Register, u32>,
    /// Pending one-shot failures; `None` matches either state
    failures: Vec<Option<RpmState>>,
    /// Write sequence numbers to reject
    doomed: Vec<usize>,
    /// Sequence number of the next write; unaffected by `clear_history`
    next_seq: usize,
    disconnected: bool,
}

/// Recording transport with failure injection
#[derive(Debug, Default)]
pub struct LoopbackTransport {
    inner: Mutex<LoopbackState>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next write to `state` (or to any state for `None`)
    pub fn fail_next(&self, state: Option<RpmState>) {
        self.inner.lock().failures.push(state);
    }

    /// Reject the `n`-th upcoming write (0 = the next one)
    pub fn fail_write(&self, n: usize) {
        let mut inner = self.inner.lock();
        let seq = inner.next_seq + n;
        inner.doomed.push(seq);
    }

    /// Fail every write until [`reconnect`](Self::reconnect)
    pub fn disconnect(&self) {
        self.inner.lock().disconnected = true;
    }

    pub fn reconnect(&self) {
        self.inner.lock().disconnected = false;
    }

    /// Every attempted write, oldest first
    pub fn history(&self) -> Vec<WriteRecord> {
        self.inner.lock().history.clone()
    }

    /// Number of attempted writes so far
    pub fn write_count(&self) -> usize {
        self.inner.lock().history.len()
    }

    /// Writes attempted after the first `mark` ones
    pub fn writes_since(&self, mark: usize) -> Vec<WriteRecord> {
        self.inner.lock().history.iter().skip(mark).copied().collect()
    }

    pub fn clear_history(&self) {
        self.inner.lock().history.clear();
    }

    /// Last accepted value of a register
    pub fn register(&self, state: RpmState, slot: ResourceSlot, key: u32) -> Option<u32> {
        self.inner.lock().registers.get(&(state, slot, key)).copied()
    }
}

impl RpmTransport for LoopbackTransport {
    fn write(&self, state: RpmState, slot: ResourceSlot, payload: &[u8]) -> Result<(), ChannelError> {
        let req = ClockRequest::decode(payload)?;
        let mut inner = self.inner.lock();

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let outcome = if inner.disconnected {
            Err(ChannelError::Disconnected)
        } else if let Some(pos) = inner.doomed.iter().position(|&d| d == seq) {
            inner.doomed.swap_remove(pos);
            Err(ChannelError::Rejected {
                code: RPM_REJECT_CODE,
            })
        } else if let Some(pos) = inner
            .failures
            .iter()
            .position(|f| f.map_or(true, |s| s == state))
        {
            inner.failures.remove(pos);
            Err(ChannelError::Rejected {
                code: RPM_REJECT_CODE,
            })
        } else {
            inner.registers.insert((state, slot, req.key), req.value);
            Ok(())
        };

        inner.history.push(WriteRecord {
            state,
            slot,
            key: req.key,
            value: req.value,
            accepted: outcome.is_ok(),
        });
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn test_registers_track_accepted_writes() {
        let lb = LoopbackTransport::new();
        let slot = ResourceSlot::new(RPM_BUS_CLK, 0);

        lb.write(RpmState::Active, slot, &ClockRequest::new(KEY_RATE, 50).encode()).unwrap();
        lb.fail_next(None);
        lb.write(RpmState::Active, slot, &ClockRequest::new(KEY_RATE, 70).encode())
            .unwrap_err();

        assert_eq!(lb.register(RpmState::Active, slot, KEY_RATE), Some(50));
        assert_eq!(lb.register(RpmState::Sleep, slot, KEY_RATE), None);
        assert_eq!(lb.write_count(), 2);
        assert!(!lb.history()[1].accepted);
    }

    #[test]
    fn test_disconnect() {
        let lb = LoopbackTransport::new();
        let slot = ResourceSlot::scaling();
        let rec = ClockRequest::new(KEY_ENABLE, 1).encode();

        lb.disconnect();
        assert_eq!(lb.write(RpmState::Sleep, slot, &rec), Err(ChannelError::Disconnected));
        lb.reconnect();
        assert!(lb.write(RpmState::Sleep, slot, &rec).is_ok());
    }

    #[test]
    fn test_malformed_payload() {
        let lb = LoopbackTransport::new();
        let err = lb.write(RpmState::Active, ResourceSlot::scaling(), &[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ChannelError::Wire(_)));
        assert_eq!(lb.write_count(), 0);
    }
}
