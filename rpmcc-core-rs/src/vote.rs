//! Per-clock vote state and the table that pairs clocks with their peers
//!
//! Peers are stored as indices into the table. A clock without a real
//! partner is bound to itself and aggregates as if its peer were disabled.

use crate::catalog::Platform;
use crate::descriptor::ResourceDescriptor;
use crate::error::{Result, RpmClkError};
use crate::types::{ClockId, RateHz};
use serde::Serialize;
use std::collections::HashMap;

/// Active and sleep set votes derived from one rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Contribution {
    pub active: RateHz,
    pub sleep: RateHz,
}

impl Contribution {
    pub const ZERO: Contribution = Contribution { active: 0, sleep: 0 };

    /// Element-wise maximum
    pub fn max(self, other: Contribution) -> Contribution {
        Contribution {
            active: self.active.max(other.active),
            sleep: self.sleep.max(other.sleep),
        }
    }
}

/// Mutable vote of one logical clock
#[derive(Debug, Clone)]
pub struct VoteState {
    name: String,
    desc: ResourceDescriptor,
    requested_rate: RateHz,
    enabled: bool,
    active_only: bool,
    peer: ClockId,
}

impl VoteState {
    fn new(name: String, desc: ResourceDescriptor, active_only: bool, peer: ClockId) -> Self {
        Self {
            name,
            requested_rate: desc.initial_rate(),
            desc,
            enabled: false,
            active_only,
            peer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.desc
    }

    /// Last committed rate request (0 = never requested)
    pub fn requested_rate(&self) -> RateHz {
        self.requested_rate
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_active_only(&self) -> bool {
        self.active_only
    }

    pub fn peer(&self) -> ClockId {
        self.peer
    }

    /// Split a rate into active and sleep set votes
    ///
    /// Active-only clocks don't care about the rate during sleep, so they
    /// vote zero there.
    pub fn split(&self, rate: RateHz) -> Contribution {
        Contribution {
            active: rate,
            sleep: if self.active_only { 0 } else { rate },
        }
    }

    pub(crate) fn set_requested_rate(&mut self, rate: RateHz) {
        self.requested_rate = rate;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Serializable view of one clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockStatus {
    pub id: ClockId,
    pub name: String,
    pub peer: String,
    pub requested_rate_hz: RateHz,
    pub enabled: bool,
    pub active_only: bool,
    pub branch: bool,
}

/// All vote states of one controller
#[derive(Debug, Default)]
pub struct VoteTable {
    clocks: Vec<VoteState>,
    by_name: HashMap<String, ClockId>,
}

impl VoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for a platform, binding every pair as peers
    pub fn from_platform(platform: &Platform) -> Result<Self> {
        let mut table = Self::new();
        for pair in platform.pairs {
            table.add_pair(pair.name, pair.active_name, pair.desc)?;
        }
        Ok(table)
    }

    /// Add a clock and its active-only twin as mutual peers
    pub fn add_pair(
        &mut self,
        name: impl Into<String>,
        active_name: impl Into<String>,
        desc: ResourceDescriptor,
    ) -> Result<(ClockId, ClockId)> {
        let name = name.into();
        let active_name = active_name.into();
        if name == active_name {
            return Err(RpmClkError::InvalidPeer {
                clock: name,
                reason: "clock cannot pair with itself by name".to_string(),
            });
        }
        self.check_unused(&name)?;
        self.check_unused(&active_name)?;

        let id = self.clocks.len();
        let active_id = id + 1;
        self.insert(VoteState::new(name, desc, false, active_id));
        self.insert(VoteState::new(active_name, desc, true, id));
        Ok((id, active_id))
    }

    /// Add a clock with no partner; it is its own peer
    pub fn add_single(
        &mut self,
        name: impl Into<String>,
        desc: ResourceDescriptor,
        active_only: bool,
    ) -> Result<ClockId> {
        let name = name.into();
        self.check_unused(&name)?;

        let id = self.clocks.len();
        self.insert(VoteState::new(name, desc, active_only, id));
        Ok(id)
    }

    fn check_unused(&self, name: &str) -> Result<()> {
        if self.by_name.contains_key(name) {
            return Err(RpmClkError::DuplicateClock(name.to_string()));
        }
        Ok(())
    }

    fn insert(&mut self, state: VoteState) {
        self.by_name.insert(state.name.clone(), self.clocks.len());
        self.clocks.push(state);
    }

    /// Check that every peer link is in range, symmetric and slot-consistent
    pub fn validate(&self) -> Result<()> {
        for (id, clock) in self.clocks.iter().enumerate() {
            let peer = self.clocks.get(clock.peer).ok_or_else(|| RpmClkError::InvalidPeer {
                clock: clock.name.clone(),
                reason: format!("peer index {} out of range", clock.peer),
            })?;
            if peer.peer != id {
                return Err(RpmClkError::InvalidPeer {
                    clock: clock.name.clone(),
                    reason: format!("peer {} does not point back", peer.name),
                });
            }
            if peer.desc.slot != clock.desc.slot || peer.desc.remote_key != clock.desc.remote_key {
                return Err(RpmClkError::InvalidPeer {
                    clock: clock.name.clone(),
                    reason: format!("peer {} votes on a different resource", peer.name),
                });
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    pub fn get(&self, id: ClockId) -> Option<&VoteState> {
        self.clocks.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ClockId) -> Option<&mut VoteState> {
        self.clocks.get_mut(id)
    }

    /// Clock or `UnknownClock`
    pub fn clock(&self, id: ClockId) -> Result<&VoteState> {
        self.get(id)
            .ok_or_else(|| RpmClkError::UnknownClock(format!("#{}", id)))
    }

    pub fn lookup(&self, name: &str) -> Option<ClockId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClockId, &VoteState)> {
        self.clocks.iter().enumerate()
    }

    /// What the peer of `id` currently adds to the aggregate
    ///
    /// Zero when the peer is disabled or when the clock is its own peer.
    pub fn peer_contribution(&self, id: ClockId) -> Contribution {
        let Some(clock) = self.clocks.get(id) else {
            return Contribution::ZERO;
        };
        if clock.peer == id {
            return Contribution::ZERO;
        }
        match self.clocks.get(clock.peer) {
            Some(peer) if peer.enabled => peer.split(peer.requested_rate),
            _ => Contribution::ZERO,
        }
    }

    pub fn status(&self, id: ClockId) -> Result<ClockStatus> {
        let clock = self.clock(id)?;
        let peer = self
            .clocks
            .get(clock.peer)
            .map(|p| p.name.clone())
            .unwrap_or_default();

        Ok(ClockStatus {
            id,
            name: clock.name.clone(),
            peer,
            requested_rate_hz: clock.requested_rate,
            enabled: clock.enabled,
            active_only: clock.active_only,
            branch: clock.desc.is_branch,
        })
    }

    pub fn snapshot(&self) -> Vec<ClockStatus> {
        (0..self.clocks.len())
            .filter_map(|id| self.status(id).ok())
            .collect()
    }
}
