//! Tracing setup shared by the binaries.
//!
//! Logs go to stderr so the RPC server can keep stdout for responses.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Default filter: info for this crate, warnings for dependencies.
pub fn default_filter() -> String {
    format!("warn,{}=info", env!("CARGO_PKG_NAME"))
}
