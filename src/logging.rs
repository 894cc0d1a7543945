//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the embedding program. These helpers cover the common cases.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset, picked by verbosity
fn default_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info,ignore=warn"),
        2 => EnvFilter::new("debug,ignore=warn"),
        _ => EnvFilter::new("trace"),
    }
}

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `verbose` when set. Fails if a global subscriber is
/// already installed.
pub fn init(verbose: u8) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

/// Install a subscriber that writes through the test harness; safe to call
/// from every test
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(2));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
