//! Tracing and logging setup shared by the CLI and tests.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use crate::tracing::{LogFormat, LogOptions};

/// Initialize process-wide logging with defaults (JSON, `info`).
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogOptions::default());
}
