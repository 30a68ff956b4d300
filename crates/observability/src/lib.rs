//! Tracing and logging (shared setup).

/// Tracing configuration (filters, layers, sinks).
pub mod tracing;

pub use crate::tracing::{DEFAULT_DIRECTIVES, LoggingConfig, LoggingGuard};

/// Initialize process-wide logging.
///
/// Hold the returned guard for the lifetime of the process.
pub fn init(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    crate::tracing::init(config)
}
