//! Fuzz target for active.json parsing.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use model_registry::models::ActivePointer;

#[derive(Arbitrary, Debug)]
struct PointerInput {
    raw: String,
    name: String,
}

fuzz_target!(|input: PointerInput| {
    // Arbitrary text must never panic.
    let _ = ActivePointer::parse(&input.raw);

    // A well-formed pointer yields its name unless blank.
    let json = serde_json::json!({ "activeModel": input.name }).to_string();
    let parsed = ActivePointer::parse(&json).ok().flatten();
    if input.name.trim().is_empty() {
        assert!(parsed.is_none());
    } else {
        assert_eq!(parsed.as_deref(), Some(input.name.as_str()));
    }
});
