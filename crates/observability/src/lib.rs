//! Shared logging setup for the service binaries.

pub mod tracing;

pub use crate::tracing::LogFormat;

/// Initialize process-wide logging from the environment.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() {
    crate::tracing::init(LogFormat::from_env());
}
