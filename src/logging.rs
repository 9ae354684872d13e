//! Diagnostic logging setup.
//!
//! Library code only emits `tracing` events. Binaries call [`init_logging`]
//! once to route them to stderr so they never interleave with the transcript
//! printed on stdout.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when neither `CHAT_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Picks the filter directive: explicit value, then `RUST_LOG`, then the default.
#[must_use]
pub fn resolve_filter(explicit: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(EnvFilter::DEFAULT_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty())
        })
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Installs the global stderr subscriber.
///
/// Returns `false` when a subscriber was already installed; repeated calls are
/// harmless. An unparsable directive falls back to [`DEFAULT_LOG_FILTER`].
pub fn init_logging(explicit_filter: Option<&str>) -> bool {
    let directive = resolve_filter(explicit_filter);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(filter = %directive, "logging initialized");
    }
    installed
}
