//! rpmcc Property-Based Tests
//!
//! Standalone test suite using proptest for vote aggregation invariants.
//! The core crate does not depend on it.
//!
//! # Usage
//!
//! ```bash
//! cargo test -p rpmcc-property-tests
//! cargo test -p rpmcc-property-tests aggregation
//! PROPTEST_CASES=1000 cargo test -p rpmcc-property-tests
//! ```
//!
//! # Test Modules
//!
//! - `aggregation`: registers track the max over enabled votes
//! - `branch`: on/off resources never vote above 1
//! - `rollback`: sleep failures leave only the peer's vote
//! - `wire`: record decoding

// Re-export for convenience in tests
pub use rpmcc_core::*;
