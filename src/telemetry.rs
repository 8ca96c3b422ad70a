//! Tracing subscriber setup.

use crate::settings::Settings;
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, falling back to the
/// environment's default. Returns false when a global subscriber was already
/// set.
pub fn init_tracing(settings: &Settings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).try_init().is_ok()
}
