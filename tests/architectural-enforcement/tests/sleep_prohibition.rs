//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT block a runtime thread with
//! `std::thread::sleep`. The canned-reply delay is a `tokio::time::sleep`
//! inside a spawned flow, which yields instead of blocking and honours the
//! paused test clock.

use architectural_enforcement::{report, scan_production};

#[test]
fn test_no_thread_sleep_in_production_code() {
    let violations = scan_production(&[
        ("std::thread::sleep", "Blocking sleep"),
        ("thread::sleep(", "Blocking sleep"),
    ]);

    report("Thread sleeps found in production code!", &violations);
}
