//! Vote aggregation and two-phase synchronization with the RPM
//!
//! Each operation combines a clock's own vote with its peer's, writes the
//! active set aggregate and then the sleep set aggregate, and only commits
//! local state once both writes were acknowledged.
//!
//! Aggregation is `max`: votes are minimum rates, so the shared resource
//! must satisfy the fastest voter. Branch resources collapse to on/off.
//!
//! Callers must hold exclusive access to the whole [`VoteTable`] for the
//! duration of a call; [`ClockController`](crate::ClockController) does this
//! with a single lock.

use crate::channel::{RemoteChannel, RpmTransport};
use crate::error::{Result, RpmClkError};
use crate::types::{ClockId, RateHz, RpmState};
use crate::vote::{VoteState, VoteTable};
use serde::Serialize;
use tracing::{debug, warn};

/// How a successful operation was carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOutcome {
    /// Both votes acknowledged by the RPM
    Applied,
    /// No rate was ever requested; nothing sent
    NoPendingVote,
    /// Clock is disabled; rate change ignored, nothing sent
    NotEnabled,
    /// Pending rate recorded locally; nothing sent
    Recorded,
    /// Clock already enabled; its vote is in place, nothing sent
    Unchanged,
}

/// Voting engine bound to a channel
pub struct VotingEngine<T> {
    channel: RemoteChannel<T>,
}

impl<T: RpmTransport> VotingEngine<T> {
    pub fn new(channel: RemoteChannel<T>) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &RemoteChannel<T> {
        &self.channel
    }

    /// Prepare a clock: add its vote to the aggregate
    pub fn enable(&self, table: &mut VoteTable, id: ClockId) -> Result<VoteOutcome> {
        let clock = table.clock(id)?;

        if clock.is_enabled() {
            debug!("Voter: {} already enabled", clock.name());
            return Ok(VoteOutcome::Unchanged);
        }

        // Don't send requests to the RPM if the rate has not been set
        if clock.requested_rate() == 0 {
            debug!("Voter: {} has no pending vote", clock.name());
            return Ok(VoteOutcome::NoPendingVote);
        }

        let this = clock.split(clock.requested_rate());
        let peer = table.peer_contribution(id);
        let desc = *clock.descriptor();

        let aggregate = this.max(peer);

        let active = desc.coerce(aggregate.active);
        self.send(clock, RpmState::Active, active)?;

        let sleep = desc.coerce(aggregate.sleep);
        if let Err(err) = self.send(clock, RpmState::Sleep, sleep) {
            // Undo our active set vote, leaving only the peer's
            let restore = desc.coerce(peer.active);
            warn!("Voter: rolling back {} active vote to {}", clock.name(), restore);
            if let Err(rollback) = self.channel.write_vote(RpmState::Active, &desc, restore) {
                warn!("Voter: rollback for {} failed: {}", clock.name(), rollback);
            }
            return Err(err);
        }

        debug!(
            "Voter: enabled {} (active={} sleep={})",
            clock.name(),
            active,
            sleep
        );
        self.state_mut(table, id)?.set_enabled(true);
        Ok(VoteOutcome::Applied)
    }

    /// Unprepare a clock: withdraw its vote, leaving only the peer's
    pub fn disable(&self, table: &mut VoteTable, id: ClockId) -> Result<VoteOutcome> {
        let clock = table.clock(id)?;

        if clock.requested_rate() == 0 {
            return Ok(VoteOutcome::NoPendingVote);
        }

        let peer = table.peer_contribution(id);
        let desc = *clock.descriptor();

        let active = desc.coerce(peer.active);
        self.send(clock, RpmState::Active, active)?;

        let sleep = desc.coerce(peer.sleep);
        self.send(clock, RpmState::Sleep, sleep)?;

        debug!(
            "Voter: disabled {} (active={} sleep={})",
            clock.name(),
            active,
            sleep
        );
        self.state_mut(table, id)?.set_enabled(false);
        Ok(VoteOutcome::Applied)
    }

    /// Change the rate of an enabled clock
    ///
    /// A disabled clock ignores the call. The new rate is committed only
    /// after both writes succeed.
    pub fn set_rate(&self, table: &mut VoteTable, id: ClockId, rate: RateHz) -> Result<VoteOutcome> {
        let clock = table.clock(id)?;

        if clock.descriptor().is_branch {
            return Err(RpmClkError::RateNotSettable(clock.name().to_string()));
        }
        if !clock.is_enabled() {
            debug!("Voter: {} disabled, ignoring rate {}", clock.name(), rate);
            return Ok(VoteOutcome::NotEnabled);
        }

        let this = clock.split(rate);
        let peer = table.peer_contribution(id);

        let aggregate = this.max(peer);
        self.send(clock, RpmState::Active, aggregate.active)?;
        self.send(clock, RpmState::Sleep, aggregate.sleep)?;

        debug!("Voter: {} rate {} -> {}", clock.name(), clock.requested_rate(), rate);
        self.state_mut(table, id)?.set_requested_rate(rate);
        Ok(VoteOutcome::Applied)
    }

    /// Record the rate a disabled clock will vote for when enabled
    pub fn request_rate(&self, table: &mut VoteTable, id: ClockId, rate: RateHz) -> Result<VoteOutcome> {
        let clock = table.clock(id)?;

        if clock.descriptor().is_branch {
            return Err(RpmClkError::RateNotSettable(clock.name().to_string()));
        }
        if clock.is_enabled() {
            return Err(RpmClkError::AlreadyEnabled(clock.name().to_string()));
        }

        self.state_mut(table, id)?.set_requested_rate(rate);
        Ok(VoteOutcome::Recorded)
    }

    /// Last committed rate; the RPM is trusted to honor it, so no read-back
    pub fn query_rate(&self, table: &VoteTable, id: ClockId) -> Result<RateHz> {
        Ok(table.clock(id)?.requested_rate())
    }

    fn send(&self, clock: &VoteState, state: RpmState, aggregate: RateHz) -> Result<()> {
        self.channel
            .write_vote(state, clock.descriptor(), aggregate)
            .map_err(|source| RpmClkError::TransportFailure {
                clock: clock.name().to_string(),
                state,
                source,
            })
    }

    fn state_mut<'a>(&self, table: &'a mut VoteTable, id: ClockId) -> Result<&'a mut VoteState> {
        table
            .get_mut(id)
            .ok_or_else(|| RpmClkError::UnknownClock(format!("#{}", id)))
    }
}
