//! Diagnostic logging.
//!
//! Logs go to stderr so stdout carries only the report. `RUST_LOG` overrides the
//! default filter.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call more than once; later calls are
/// ignored.
pub fn init(quiet: bool) {
    let default = if quiet { "star_rank=warn" } else { "star_rank=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
