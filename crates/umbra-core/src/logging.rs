//! Tracing initialization for umbra binaries and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// The filter is read from the `UMBRA_LOG` environment variable, falling
/// back to the given default (e.g. `"info"` or `"umbra_scanner=debug"`).
/// Safe to call more than once; subsequent calls are ignored.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env("UMBRA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
