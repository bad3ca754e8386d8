//! Logging utilities.
//!
//! The Node addon has no `main`, so the subscriber is installed when the
//! module is registered and must tolerate a host that already installed one.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "PYNODE_LOG";

/// Default filter when neither `PYNODE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "warn";

/// Initialize tracing with pynode defaults.
///
/// Sets up tracing-subscriber with:
/// - Environment filter (`PYNODE_LOG`, then `RUST_LOG`)
/// - Compact format on stderr, so stdout stays free for the host process
///
/// Calling this more than once is harmless.
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Initialize tracing with a custom default filter.
pub fn init_with_filter(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init();
        init_with_filter("debug");
    }
}
