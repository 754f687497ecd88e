//! Remote channel to the RPM
//!
//! The transport trait is the boundary to whatever carries requests to the
//! RPM (shared memory driver, simulator, test double). [`RemoteChannel`]
//! encodes `(key, length, value)` records on top of it and performs no
//! retries or buffering.
//!
//! # Implementing a transport
//!
//! ```ignore
//! struct SmdTransport { /* ... */ }
//!
//! impl RpmTransport for SmdTransport {
//!     fn write(&self, state: RpmState, slot: ResourceSlot, payload: &[u8]) -> Result<(), ChannelError> {
//!         // Marshal, send, block for the ack
//!     }
//! }
//! ```

use crate::descriptor::ResourceDescriptor;
use crate::error::{ChannelError, WireError};
use crate::types::{FourCc, RateHz, ResourceSlot, RpmState};
use std::sync::Arc;
use tracing::{debug, warn};

/// Size of an encoded request record
pub const RECORD_LEN: usize = 12;

/// Value length carried in every record
pub const VALUE_LEN: u32 = 4;

// ============================================================================
// Wire Record
// ============================================================================

/// Key/value request record, little-endian on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRequest {
    pub key: u32,
    pub nbytes: u32,
    pub value: u32,
}

impl ClockRequest {
    pub fn new(key: u32, value: u32) -> Self {
        Self {
            key,
            nbytes: VALUE_LEN,
            value,
        }
    }

    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&self.key.to_le_bytes());
        buf[4..8].copy_from_slice(&self.nbytes.to_le_bytes());
        buf[8..12].copy_from_slice(&self.value.to_le_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, WireError> {
        if bytes.len() < RECORD_LEN {
            return Err(WireError::Truncated {
                len: bytes.len(),
                need: RECORD_LEN,
            });
        }

        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);
        let nbytes = word(4);
        if nbytes != VALUE_LEN {
            return Err(WireError::BadLength { nbytes });
        }

        Ok(Self {
            key: word(0),
            nbytes,
            value: word(8),
        })
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Synchronous request/acknowledge link to the RPM
///
/// `write` blocks until the RPM acknowledges the request or the transport
/// reports failure.
pub trait RpmTransport: Send + Sync {
    fn write(&self, state: RpmState, slot: ResourceSlot, payload: &[u8]) -> Result<(), ChannelError>;
}

impl<T: RpmTransport + ?Sized> RpmTransport for Arc<T> {
    fn write(&self, state: RpmState, slot: ResourceSlot, payload: &[u8]) -> Result<(), ChannelError> {
        (**self).write(state, slot, payload)
    }
}

impl<T: RpmTransport + ?Sized> RpmTransport for Box<T> {
    fn write(&self, state: RpmState, slot: ResourceSlot, payload: &[u8]) -> Result<(), ChannelError> {
        (**self).write(state, slot, payload)
    }
}

// ============================================================================
// Channel Adapter
// ============================================================================

/// Encodes votes into request records and hands them to the transport
pub struct RemoteChannel<T> {
    transport: T,
}

impl<T: RpmTransport> RemoteChannel<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Write one raw record
    pub fn write(&self, state: RpmState, slot: ResourceSlot, key: u32, value: u32) -> Result<(), ChannelError> {
        let req = ClockRequest::new(key, value);
        debug!("Channel: {} {} {}={}", state, slot, FourCc(key), value);

        self.transport.write(state, slot, &req.encode()).map_err(|e| {
            warn!("Channel: {} write to {} failed: {}", state, slot, e);
            e
        })
    }

    /// Write an aggregate vote for a resource, converted to wire units
    pub fn write_vote(
        &self,
        state: RpmState,
        desc: &ResourceDescriptor,
        aggregate: RateHz,
    ) -> Result<(), ChannelError> {
        self.write(state, desc.slot, desc.remote_key, desc.wire_value(aggregate))
    }
}
