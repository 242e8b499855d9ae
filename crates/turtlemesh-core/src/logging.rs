//! Tracing bootstrap shared by the coordinator and worker binaries.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber with `RUST_LOG`-driven filtering.
///
/// `default_level` is used when `RUST_LOG` is unset, so each binary can
/// pick its own default verbosity (e.g. `info` for the coordinator).
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
