//! Registry metrics via the `metrics` facade.
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, describe_counter, describe_gauge, gauge};

use crate::models::RegistryError;

pub const OPERATIONS_TOTAL: &str = "model_registry_operations_total";
pub const SKIPPED_ENTRIES_TOTAL: &str = "model_registry_skipped_entries_total";
pub const BACKFILLS_TOTAL: &str = "model_registry_backfills_total";
pub const NOTIFY_FAILURES_TOTAL: &str = "model_registry_notify_failures_total";
pub const ENTRIES: &str = "model_registry_entries";

/// Register metric descriptions with the installed recorder.
pub fn init_metrics() {
    describe_counter!(OPERATIONS_TOTAL, "Registry operations by outcome");
    describe_counter!(SKIPPED_ENTRIES_TOTAL, "Model directories left out of a listing");
    describe_counter!(BACKFILLS_TOTAL, "Metadata fields generated on read");
    describe_counter!(NOTIFY_FAILURES_TOTAL, "Failed serving runtime notifications");
    describe_gauge!(ENTRIES, "Models returned by the last listing");
}

/// Count one operation, labelled `ok` or by error kind.
pub fn record_operation<T>(operation: &'static str, result: &Result<T, RegistryError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(e) => e.kind(),
    };
    counter!(OPERATIONS_TOTAL, "operation" => operation, "outcome" => outcome).increment(1);
}

pub fn record_skipped_entry(reason: &'static str) {
    counter!(SKIPPED_ENTRIES_TOTAL, "reason" => reason).increment(1);
}

pub fn record_backfill(field: &'static str) {
    counter!(BACKFILLS_TOTAL, "field" => field).increment(1);
}

pub fn record_notify_failure() {
    counter!(NOTIFY_FAILURES_TOTAL).increment(1);
}

pub fn record_entry_count(count: usize) {
    gauge!(ENTRIES).set(count as f64);
}
