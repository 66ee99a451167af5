//! Logging setup for binaries and tests
//!
//! The library itself only emits through the `log` facade; sinks are the
//! caller's business. Binaries call [`init`] once at startup.

pub use log::{debug, error, info, trace, warn};

/// Initialize `env_logger` with an `info` default so warnings from the
/// parsers are visible without any `RUST_LOG` configuration.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
