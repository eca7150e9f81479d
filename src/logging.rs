//! Logging Setup
//!
//! Tracing initialization for the embedding shell. Filter defaults to
//! `info` and is overridable via `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Safe to call more than once;
/// repeat calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
