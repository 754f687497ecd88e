//! Clock controller: the host-facing entry point
//!
//! Owns the vote table behind one lock. Every operation holds the lock for
//! its whole duration, including both RPM round-trips, because a clock's
//! vote depends on its peer's state.

use crate::catalog;
use crate::channel::{RemoteChannel, RpmTransport};
use crate::config::ControllerConfig;
use crate::engine::{VoteOutcome, VotingEngine};
use crate::error::{Result, RpmClkError};
use crate::types::{ClockId, RateHz, ResourceSlot, RpmState, KEY_ENABLE};
use crate::vote::{ClockStatus, VoteTable};
use parking_lot::Mutex;
use tracing::{debug, error, info};

/// Turn on RPM clock scaling; without it the RPM ignores clock votes
///
/// Sleep set first, then active set.
pub fn enable_scaling<T: RpmTransport>(channel: &RemoteChannel<T>) -> Result<()> {
    let slot = ResourceSlot::scaling();

    for state in [RpmState::Sleep, RpmState::Active] {
        channel
            .write(state, slot, KEY_ENABLE, 1)
            .map_err(|source| {
                error!("RPM clock scaling ({} set) not enabled!", state);
                RpmClkError::NotInitialized { state, source }
            })?;
    }

    debug!("RPM clock scaling is enabled");
    Ok(())
}

/// RPM clock controller
pub struct ClockController<T> {
    name: String,
    engine: VotingEngine<T>,
    table: Mutex<VoteTable>,
}

impl<T: RpmTransport> ClockController<T> {
    /// Set up the clocks of a catalog platform and enable scaling
    pub fn probe(transport: T, config: &ControllerConfig) -> Result<Self> {
        let platform = catalog::platform(&config.platform)
            .ok_or_else(|| RpmClkError::UnknownPlatform(config.platform.clone()))?;

        let mut table = VoteTable::from_platform(platform)?;
        let engine = VotingEngine::new(RemoteChannel::new(transport));

        for seed in &config.rates {
            let id = table
                .lookup(&seed.clock)
                .ok_or_else(|| RpmClkError::UnknownClock(seed.clock.clone()))?;
            engine.request_rate(&mut table, id, seed.rate_hz)?;
        }

        let controller = Self::start(platform.compatible.to_string(), engine, table)?;
        info!(
            "Controller: {} ready with {} clocks",
            controller.name,
            platform.clock_count()
        );
        Ok(controller)
    }

    /// Set up a hand-built table and enable scaling
    pub fn with_table(name: impl Into<String>, transport: T, table: VoteTable) -> Result<Self> {
        let engine = VotingEngine::new(RemoteChannel::new(transport));
        Self::start(name.into(), engine, table)
    }

    fn start(name: String, engine: VotingEngine<T>, table: VoteTable) -> Result<Self> {
        table.validate()?;
        enable_scaling(engine.channel())?;

        Ok(Self {
            name,
            engine,
            table: Mutex::new(table),
        })
    }

    /// Platform compatible string or table name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn transport(&self) -> &T {
        self.engine.channel().transport()
    }

    pub fn lookup(&self, name: &str) -> Result<ClockId> {
        self.table
            .lock()
            .lookup(name)
            .ok_or_else(|| RpmClkError::UnknownClock(name.to_string()))
    }

    /// Clock names in table order
    pub fn clocks(&self) -> Vec<String> {
        self.table
            .lock()
            .iter()
            .map(|(_, c)| c.name().to_string())
            .collect()
    }

    pub fn enable(&self, id: ClockId) -> Result<VoteOutcome> {
        let mut table = self.table.lock();
        self.engine.enable(&mut table, id)
    }

    pub fn disable(&self, id: ClockId) -> Result<VoteOutcome> {
        let mut table = self.table.lock();
        self.engine.disable(&mut table, id)
    }

    pub fn set_rate(&self, id: ClockId, rate: RateHz) -> Result<VoteOutcome> {
        let mut table = self.table.lock();
        self.engine.set_rate(&mut table, id, rate)
    }

    pub fn request_rate(&self, id: ClockId, rate: RateHz) -> Result<VoteOutcome> {
        let mut table = self.table.lock();
        self.engine.request_rate(&mut table, id, rate)
    }

    /// Last rate proposed for the clock
    pub fn rate(&self, id: ClockId) -> Result<RateHz> {
        let table = self.table.lock();
        self.engine.query_rate(&table, id)
    }

    pub fn status(&self, id: ClockId) -> Result<ClockStatus> {
        self.table.lock().status(id)
    }

    pub fn snapshot(&self) -> Vec<ClockStatus> {
        self.table.lock().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loopback::LoopbackTransport;
    use std::sync::Arc;

    #[test]
    fn test_probe_enables_scaling() {
        let lb = Arc::new(LoopbackTransport::new());
        let cc = ClockController::probe(lb.clone(), &ControllerConfig::default()).unwrap();

        let writes = lb.history();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].state, RpmState::Sleep);
        assert_eq!(writes[1].state, RpmState::Active);
        assert!(writes.iter().all(|w| w.slot == ResourceSlot::scaling() && w.key == KEY_ENABLE && w.value == 1));
        assert_eq!(cc.name(), "qcom,rpmcc-msm8916");
        assert_eq!(cc.clocks().len(), 26);
    }

    #[test]
    fn test_probe_fails_without_scaling() {
        let lb = Arc::new(LoopbackTransport::new());
        lb.fail_next(Some(RpmState::Active));

        let err = ClockController::probe(lb.clone(), &ControllerConfig::default()).err().unwrap();
        assert!(matches!(err, RpmClkError::NotInitialized { state: RpmState::Active, .. }));
    }

    #[test]
    fn test_probe_unknown_platform() {
        let lb = Arc::new(LoopbackTransport::new());
        let err = ClockController::probe(lb.clone(), &ControllerConfig::new("qcom,rpmcc-foo")).err().unwrap();

        assert!(matches!(err, RpmClkError::UnknownPlatform(_)));
        assert_eq!(lb.write_count(), 0);
    }

    #[test]
    fn test_probe_seeds_rates() {
        let lb = Arc::new(LoopbackTransport::new());
        let config = ControllerConfig::default().with_rate("pcnoc_clk", 50_000_000);
        let cc = ClockController::probe(lb.clone(), &config).unwrap();

        let id = cc.lookup("pcnoc_clk").unwrap();
        assert_eq!(cc.rate(id).unwrap(), 50_000_000);
        assert!(!cc.status(id).unwrap().enabled);

        let bad = ControllerConfig::default().with_rate("nope", 1);
        assert!(matches!(
            ClockController::probe(lb, &bad),
            Err(RpmClkError::UnknownClock(_))
        ));
    }

    #[test]
    fn test_lookup_and_enable() {
        let lb = Arc::new(LoopbackTransport::new());
        let cc = ClockController::probe(lb.clone(), &ControllerConfig::default()).unwrap();

        let xo = cc.lookup("xo_a").unwrap();
        assert_eq!(cc.enable(xo).unwrap(), VoteOutcome::Applied);
        assert!(cc.status(xo).unwrap().enabled);
        assert!(matches!(cc.lookup("missing"), Err(RpmClkError::UnknownClock(_))));
    }
}
