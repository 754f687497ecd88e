//! End-to-end voting scenarios against the loopback RPM

use rpmcc_core::loopback::{LoopbackTransport, WriteRecord};
use rpmcc_core::*;
use std::sync::Arc;
use std::thread;

fn probe(config: ControllerConfig) -> (Arc<LoopbackTransport>, ClockController<Arc<LoopbackTransport>>) {
    let lb = Arc::new(LoopbackTransport::new());
    let cc = ClockController::probe(lb.clone(), &config).unwrap();
    lb.clear_history();
    (lb, cc)
}

fn votes(writes: &[WriteRecord]) -> Vec<(RpmState, u32)> {
    writes.iter().map(|w| (w.state, w.value)).collect()
}

/// Hand-built pair outside any platform catalog
fn custom_pair() -> (Arc<LoopbackTransport>, ClockController<Arc<LoopbackTransport>>, ClockId, ClockId) {
    let lb = Arc::new(LoopbackTransport::new());
    let desc = ResourceDescriptor::rate(KEY_RATE, ResourceSlot::new(RPM_BUS_CLK, 3));

    let mut table = VoteTable::new();
    let (a, a_twin) = table.add_pair("a", "a_twin", desc).unwrap();
    let cc = ClockController::with_table("custom", lb.clone(), table).unwrap();
    lb.clear_history();

    (lb, cc, a, a_twin)
}

#[test]
fn enable_pair_in_sequence() {
    let (lb, cc) = probe(ControllerConfig::default());
    let a = cc.lookup("bimc_clk").unwrap();
    let b = cc.lookup("bimc_a_clk").unwrap();

    cc.request_rate(a, 200_000_000).unwrap();
    assert_eq!(cc.enable(a).unwrap(), VoteOutcome::Applied);
    assert_eq!(
        votes(&lb.history()),
        vec![(RpmState::Active, 200_000), (RpmState::Sleep, 200_000)]
    );

    lb.clear_history();
    cc.request_rate(b, 50_000_000).unwrap();
    cc.enable(b).unwrap();
    assert_eq!(
        votes(&lb.history()),
        vec![(RpmState::Active, 200_000), (RpmState::Sleep, 200_000)]
    );

    let slot = ResourceSlot::new(RPM_MEM_CLK, 0);
    assert_eq!(lb.register(RpmState::Active, slot, KEY_RATE), Some(200_000));
    assert_eq!(lb.register(RpmState::Sleep, slot, KEY_RATE), Some(200_000));
}

#[test]
fn disable_then_enable_restores_aggregate() {
    let (lb, cc) = probe(ControllerConfig::default().with_rate("snoc_clk", 133_333_333));
    let snoc = cc.lookup("snoc_clk").unwrap();

    cc.enable(snoc).unwrap();
    let first = votes(&lb.history());

    cc.disable(snoc).unwrap();
    let mark = lb.write_count();
    cc.enable(snoc).unwrap();

    assert_eq!(votes(&lb.writes_since(mark)), first);
    assert_eq!(first, vec![(RpmState::Active, 133_334), (RpmState::Sleep, 133_334)]);
}

#[test]
fn rate_change_before_enable_is_ignored() {
    let (lb, cc) = probe(ControllerConfig::default());
    let pcnoc = cc.lookup("pcnoc_clk").unwrap();

    assert_eq!(cc.set_rate(pcnoc, 80_000_000).unwrap(), VoteOutcome::NotEnabled);
    assert_eq!(cc.enable(pcnoc).unwrap(), VoteOutcome::NoPendingVote);
    assert_eq!(cc.rate(pcnoc).unwrap(), 0);
    assert_eq!(lb.write_count(), 0);
}

#[test]
fn both_enabled_votes_max() {
    let (lb, cc, a, twin) = custom_pair();
    cc.request_rate(a, 100_000_000).unwrap();
    cc.request_rate(twin, 100_000_000).unwrap();
    cc.enable(a).unwrap();
    cc.enable(twin).unwrap();

    lb.clear_history();
    cc.set_rate(a, 250_000_000).unwrap();
    assert_eq!(
        votes(&lb.history()),
        vec![(RpmState::Active, 250_000), (RpmState::Sleep, 250_000)]
    );

    lb.clear_history();
    cc.set_rate(twin, 10_000_000).unwrap();
    // twin is active-only: its sleep vote is 0, a still holds sleep at 250 MHz
    assert_eq!(
        votes(&lb.history()),
        vec![(RpmState::Active, 250_000), (RpmState::Sleep, 250_000)]
    );
}

#[test]
fn xo_branch_votes_presence_only() {
    let (lb, cc) = probe(ControllerConfig::default());
    let xo = cc.lookup("xo").unwrap();
    let xo_a = cc.lookup("xo_a").unwrap();

    cc.enable(xo_a).unwrap();
    cc.enable(xo).unwrap();
    cc.disable(xo_a).unwrap();

    assert!(lb.history().iter().all(|w| w.value <= 1 && w.key == KEY_ENABLE));
    assert!(matches!(cc.set_rate(xo, 1), Err(RpmClkError::RateNotSettable(_))));

    let slot = ResourceSlot::new(RPM_MISC_CLK, 0);
    assert_eq!(lb.register(RpmState::Active, slot, KEY_ENABLE), Some(1));
    assert_eq!(lb.register(RpmState::Sleep, slot, KEY_ENABLE), Some(1));
}

#[test]
fn sleep_failure_rolls_back_to_peer_vote() {
    let (lb, cc) = probe(ControllerConfig::default());
    let a = cc.lookup("bimc_clk").unwrap();
    let b = cc.lookup("bimc_a_clk").unwrap();
    cc.request_rate(b, 75_000_000).unwrap();
    cc.enable(b).unwrap();
    cc.request_rate(a, 300_000_000).unwrap();

    lb.clear_history();
    lb.fail_next(Some(RpmState::Sleep));
    let err = cc.enable(a).unwrap_err();

    assert!(matches!(err, RpmClkError::TransportFailure { state: RpmState::Sleep, .. }));
    assert_eq!(
        votes(&lb.history()),
        vec![
            (RpmState::Active, 300_000),
            (RpmState::Sleep, 300_000),
            (RpmState::Active, 75_000),
        ]
    );
    let slot = ResourceSlot::new(RPM_MEM_CLK, 0);
    assert_eq!(lb.register(RpmState::Active, slot, KEY_RATE), Some(75_000));
    assert!(!cc.status(a).unwrap().enabled);
}

#[test]
fn disconnected_channel_reports_transport_failure() {
    let (lb, cc) = probe(ControllerConfig::default().with_rate("snoc_clk", 1_000_000));
    let snoc = cc.lookup("snoc_clk").unwrap();

    lb.disconnect();
    let err = cc.enable(snoc).unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(
        err,
        RpmClkError::TransportFailure { source: ChannelError::Disconnected, .. }
    ));
    assert!(!cc.status(snoc).unwrap().enabled);
}

#[test]
fn concurrent_toggles_keep_rpm_consistent() {
    let (lb, cc) = probe(
        ControllerConfig::default()
            .with_rate("bimc_clk", 200_000_000)
            .with_rate("bimc_a_clk", 400_000_000),
    );
    let cc = Arc::new(cc);
    let a = cc.lookup("bimc_clk").unwrap();
    let b = cc.lookup("bimc_a_clk").unwrap();

    let handles: Vec<_> = [a, b]
        .into_iter()
        .map(|id| {
            let cc = cc.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    cc.enable(id).unwrap();
                    cc.disable(id).unwrap();
                }
                cc.enable(id).unwrap();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    // With both enabled the last writer must have sent the full aggregate
    let slot = ResourceSlot::new(RPM_MEM_CLK, 0);
    assert_eq!(lb.register(RpmState::Active, slot, KEY_RATE), Some(400_000));
    assert_eq!(lb.register(RpmState::Sleep, slot, KEY_RATE), Some(200_000));

    // Writes come in active/sleep pairs, never interleaved across operations
    let history = lb.history();
    assert_eq!(history.len() % 2, 0);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].state, RpmState::Active);
        assert_eq!(pair[1].state, RpmState::Sleep);
    }
}

#[test]
fn snapshot_serializes() {
    let (_lb, cc) = probe(ControllerConfig::new("qcom,rpmcc-apq8084"));
    let snapshot = cc.snapshot();
    assert_eq!(snapshot.len(), 46);

    let json = serde_json::to_value(&snapshot[0]).unwrap();
    assert_eq!(json["name"], "xo_clk_src");
    assert_eq!(json["peer"], "xo_a_clk_src");
    assert_eq!(json["requested_rate_hz"], 19_200_000);
    assert_eq!(json["branch"], true);
}
