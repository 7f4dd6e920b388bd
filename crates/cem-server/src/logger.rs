//! Leveled, quiet-aware logging, built on `tracing` +
//! `tracing-subscriber`'s `EnvFilter`.

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `quiet` raises the default
/// level floor to `warn` so `info`/`debug` request logging is suppressed
/// unless the caller explicitly asks for it via `CEM_LOG`.
pub fn init(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_env("CEM_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
