//! Integration Test: Theme Write Ownership
//!
//! **Policy**: Only the Preference Observer (`preference.rs`) may write the
//! document's theme marker or theme metadata. `host.rs` declares and
//! implements the document trait and is exempt.
//! **Exceptions**: test code

use std::path::Path;

use architectural_enforcement::{code_part, scan_production};

const THEME_WRITES: &[&str] = &["set_root_marker(", "set_meta("];
const OWNERS: &[&str] = &["preference.rs", "host.rs"];

fn is_owner(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| OWNERS.contains(&name))
}

#[test]
fn test_only_preference_observer_writes_theme() {
    let violations = scan_production(|path, lines, idx| {
        let code = code_part(lines[idx]);
        !is_owner(path) && THEME_WRITES.iter().any(|call| code.contains(call))
    });

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Theme writes outside the Preference Observer!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Route theme changes through PreferenceObserver::toggle / set_dark.");

        panic!(
            "\nFound {} theme write violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_preference_observer_does_write_theme() {
    let root = architectural_enforcement::workspace_root();
    let source = std::fs::read_to_string(root.join("folio/core/src/preference.rs"))
        .expect("preference.rs should exist");
    for call in THEME_WRITES {
        assert!(source.contains(call), "preference.rs no longer calls {call}");
    }
}
