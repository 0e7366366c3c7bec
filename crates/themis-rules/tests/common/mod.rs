//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, Utc};
use themis_common::ManualClock;
use themis_common::time::parse_datetime;
use themis_rules::provider::DefaultContextProvider;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary (`RUST_LOG` overrides).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("themis_rules=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn epoch() -> DateTime<Utc> {
    parse_datetime("2025-01-01T00:00:00Z").expect("valid fixture instant")
}

/// Isolated provider on a manual clock starting at [`epoch`].
pub fn manual_provider() -> (Arc<DefaultContextProvider>, ManualClock) {
    init_tracing();
    let clock = ManualClock::new(epoch());
    let provider = Arc::new(DefaultContextProvider::with_clock(Arc::new(clock.clone())));
    (provider, clock)
}
