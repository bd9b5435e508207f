//! Span helpers for registry operations.

use tracing::{info_span, Span};

use crate::models::RegistryError;

/// Records an operation's outcome onto its span.
pub trait SpanExt {
    fn record_result<T>(&self, result: &Result<T, RegistryError>);
}

impl SpanExt for Span {
    fn record_result<T>(&self, result: &Result<T, RegistryError>) {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.kind", e.kind());
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for `registry_operation` spans.
pub struct RegistrySpan;

impl RegistrySpan {
    /// Create a span for one registry call.
    ///
    /// `status`, `error.kind`, `error.message` are filled by
    /// [`SpanExt::record_result`]; `entries` by listing.
    pub fn new(operation: &str, model: &str) -> Span {
        info_span!(
            "registry_operation",
            operation = %operation,
            model = %model,
            status = tracing::field::Empty,
            error.kind = tracing::field::Empty,
            error.message = tracing::field::Empty,
            entries = tracing::field::Empty,
        )
    }
}
