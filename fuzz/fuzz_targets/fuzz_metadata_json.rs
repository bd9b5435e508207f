//! Fuzz target for metadata.json parsing and backfill.
//!
//! Any input must parse to a record or an error, and a parsed record must
//! backfill to one that yields an entry and re-encodes.

#![no_main]

use libfuzzer_sys::fuzz_target;
use model_registry::models::{ModelRecord, TrainDate};

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut record) = ModelRecord::from_json(json) else {
        return;
    };

    record.backfill(TrainDate::now);
    assert!(!record.needs_backfill());
    assert!(record.to_entry("fuzz").is_some());
    let _ = record.to_json();
});
