//! Structured logging, spans and metrics for the registry.
//!
//! Logs go to stderr or a file; metrics go through the `metrics` facade and
//! are only exported if the embedding process installs a recorder.

mod logging;
mod metrics;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use metrics::{
    init_metrics, record_backfill, record_entry_count, record_notify_failure, record_operation,
    record_skipped_entry,
};
pub use spans::{RegistrySpan, SpanExt};
