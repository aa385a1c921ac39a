//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Every outbound call (explorer, completion, agent, trending
//! store) goes through the async `reqwest::Client`. Production code MUST NOT
//! use `reqwest::blocking` or re-enter the runtime with `block_on`.

use architectural_enforcement::{report, scan_production};

#[test]
fn test_no_blocking_http_in_production_code() {
    let violations = scan_production(&[("reqwest::blocking", "Blocking HTTP client")]);

    report("Blocking HTTP calls found in production code!", &violations);
}

#[test]
fn test_no_block_on_in_production_code() {
    let violations = scan_production(&[("block_on(", "Runtime re-entry")]);

    report("block_on calls found in production code!", &violations);
}
