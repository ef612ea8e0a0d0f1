//! Tracing subscriber setup for the CLI.
//!
//! Stage events (`debug!` per loaded source and written document, one `info!`
//! per build) go to stderr. `RUST_LOG` selects what is shown; without it only
//! warnings appear, so `gen-config` output on stdout stays clean.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Filter from `RUST_LOG`-style directives, or [`DEFAULT_LOG_FILTER`] when
/// none are given or they do not parse.
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global stderr subscriber, filtered by `RUST_LOG`.
pub fn init() {
    let directives = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter(directives.as_deref()))
        .init();
}
