//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT block a thread with
//! `std::thread::sleep`, and MUST NOT poll by sleeping inside a loop.
//! Periodic work uses `tokio::time::interval`; a single one-shot delay
//! (`tokio::time::sleep` outside any loop) is allowed.
//! **Exceptions**: test code

use architectural_enforcement::{code_part, is_in_loop, is_interval_driven, scan_production};

#[test]
fn test_no_blocking_sleep_in_production_code() {
    let violations = scan_production(|_, lines, idx| code_part(lines[idx]).contains("thread::sleep("));

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Blocking sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use tokio::time::sleep / interval on the runtime instead.");

        panic!(
            "\nFound {} blocking sleep violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_no_sleep_polling_loops_in_production_code() {
    let violations = scan_production(|_, lines, idx| {
        let code = code_part(lines[idx]);
        (code.contains("::sleep(") || code.contains(".sleep("))
            && is_in_loop(lines, idx, 10)
            && !is_interval_driven(lines, idx, 10)
    });

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep-driven polling loops found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ ACCEPTABLE:");
        eprintln!("  - Periodic tasks using tokio::time::interval()");
        eprintln!("  - A single one-shot delay before a state flip");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep in polling loops");
        eprintln!("  - Sleep as poor man's synchronization");

        panic!(
            "\nFound {} sleep polling violation(s) in production code.",
            violations.len()
        );
    }
}
