//! Property tests for branch votes, rollback and wire decoding
//!
//! - Branch resources only ever vote 0 or 1
//! - A rejected sleep write during enable leaves exactly the peer's vote
//! - Records with a bad length field never decode

use proptest::prelude::*;
use rpmcc_core::loopback::LoopbackTransport;
use rpmcc_core::{
    ceil_div, ChannelError, ClockController, ClockRequest, ControllerConfig, RpmClkError, RpmState,
    WireError, HZ_PER_KHZ, RECORD_LEN,
};
use std::sync::Arc;

fn probe(config: &ControllerConfig) -> (Arc<LoopbackTransport>, ClockController<Arc<LoopbackTransport>>) {
    let lb = Arc::new(LoopbackTransport::new());
    let cc = ClockController::probe(lb.clone(), config).unwrap();
    lb.clear_history();
    (lb, cc)
}

// ============================================================================
// Branch Property Tests
// ============================================================================

proptest! {
    /// CORE INVARIANT: branch aggregation is boolean
    #[test]
    fn branch_votes_are_boolean(
        toggles in prop::collection::vec((any::<bool>(), any::<bool>()), 1..30)
    ) {
        let (lb, cc) = probe(&ControllerConfig::new("qcom,rpmcc-msm8974"));
        let pairs = [("cxo_clk_src", "cxo_a_clk_src"), ("cxo_d0", "cxo_d0_a")];

        for (use_twin, enable) in toggles {
            for (name, twin) in pairs {
                let id = cc.lookup(if use_twin { twin } else { name }).unwrap();
                let outcome = if enable { cc.enable(id) } else { cc.disable(id) };
                prop_assert!(outcome.is_ok());
            }
        }

        let history = lb.history();
        prop_assert!(history.iter().all(|w| w.value <= 1));
    }
}

// ============================================================================
// Rollback Property Tests
// ============================================================================

proptest! {
    /// Sleep failure: one compensating active write with the peer's vote alone
    #[test]
    fn sleep_failure_leaves_peer_vote(
        ra in 1u64..2_000_000_000u64,
        rb in 1u64..2_000_000_000u64,
        peer_on in any::<bool>()
    ) {
        let config = ControllerConfig::default()
            .with_rate("snoc_clk", ra)
            .with_rate("snoc_a_clk", rb);
        let (lb, cc) = probe(&config);
        let a = cc.lookup("snoc_clk").unwrap();
        let b = cc.lookup("snoc_a_clk").unwrap();
        if peer_on {
            cc.enable(b).unwrap();
        }

        let mark = lb.write_count();
        lb.fail_next(Some(RpmState::Sleep));
        let err = cc.enable(a).unwrap_err();

        let is_sleep_failure = matches!(
            err,
            RpmClkError::TransportFailure { state: RpmState::Sleep, source: ChannelError::Rejected { .. }, .. }
        );
        prop_assert!(is_sleep_failure);

        let writes = lb.writes_since(mark);
        prop_assert_eq!(writes.len(), 3);
        prop_assert_eq!(writes[2].state, RpmState::Active);

        let peer_vote = if peer_on { ceil_div(rb, HZ_PER_KHZ) as u32 } else { 0 };
        prop_assert_eq!(writes[2].value, peer_vote);
        prop_assert!(!cc.status(a).unwrap().enabled);
        prop_assert_eq!(cc.status(b).unwrap().enabled, peer_on);
    }

    /// Any transport failure leaves the enabled flag untouched
    #[test]
    fn failed_write_keeps_enabled_flag(
        rate in 1u64..2_000_000_000u64,
        fail_at in 0usize..2,
        disable in any::<bool>()
    ) {
        let (lb, cc) = probe(&ControllerConfig::default().with_rate("pcnoc_clk", rate));
        let id = cc.lookup("pcnoc_clk").unwrap();
        if disable {
            cc.enable(id).unwrap();
        }

        lb.fail_write(fail_at);
        let result = if disable { cc.disable(id) } else { cc.enable(id) };

        prop_assert!(result.is_err());
        prop_assert_eq!(cc.status(id).unwrap().enabled, disable);
    }
}

// ============================================================================
// Wire Property Tests
// ============================================================================

proptest! {
    /// Length field other than 4 is rejected
    #[test]
    fn bad_length_never_decodes(
        key in any::<u32>(),
        nbytes in any::<u32>().prop_filter("not 4", |n| *n != 4),
        value in any::<u32>()
    ) {
        let mut buf = ClockRequest::new(key, value).encode();
        buf[4..8].copy_from_slice(&nbytes.to_le_bytes());

        prop_assert_eq!(ClockRequest::decode(&buf), Err(WireError::BadLength { nbytes }));
    }

    /// Short buffers are rejected
    #[test]
    fn truncated_never_decodes(bytes in prop::collection::vec(any::<u8>(), 0..RECORD_LEN)) {
        let is_truncated = matches!(ClockRequest::decode(&bytes), Err(WireError::Truncated { .. }));
        prop_assert!(is_truncated);
    }
}
