//! Sets up logging by reading configuration from environment variables.
//!
//! Environment variables used:
//! - RUST_LOG: full tracing filter directive; takes precedence when set
//! - LOG_LEVEL: simple level ("trace", "debug", "info", "warn", "error"); default is "info"

use std::env;

use tracing_subscriber::EnvFilter;

/// Installs the process-wide tracing subscriber.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(level)
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
