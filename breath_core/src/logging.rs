//! Tracing setup for the `breathe` binary and the core's unit tests.
//!
//! Everything goes to stderr; stdout carries only the session display.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when RUST_LOG is unset. Session start/finish events are
/// logged at info, which would break up the in-place status line, so only
/// warnings show by default.
pub const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber. Calling it twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(filter_or(DEFAULT_FILTER))
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .try_init();
}

/// RUST_LOG when it is set and parses, `fallback` otherwise
fn filter_or(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Debug-level logs routed through the test harness's capture
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
