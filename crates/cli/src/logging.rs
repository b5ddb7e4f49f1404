//! Diagnostic logging to stderr.
//!
//! The analytics crate logs through the `log` facade; the fmt subscriber
//! bridges those records so one filter controls both.

use tracing_subscriber::EnvFilter;

/// Env var holding an `EnvFilter` directive, e.g. `promolens_analytics=debug`.
pub const LOG_ENV: &str = "PROMOLENS_LOG";

pub fn init(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
