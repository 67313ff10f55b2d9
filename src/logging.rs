//! Subscriber setup. Library crates log through `log`; records are bridged
//! into `tracing` by the subscriber's `tracing-log` integration.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// `--verbose` forces debug; otherwise `RUST_LOG` applies, then the default.
pub fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber, writing to stderr.
pub fn init(verbose: bool) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))
}
