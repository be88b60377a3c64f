//! Integration Test: State Ownership
//!
//! **Policy**: Only the core writes the animation state. The raw write
//! paths (`transition`, `modify_if_current`) stay inside the driver, the
//! run guard and the state module; surfaces only read and subscribe.

use architectural_enforcement::scan;

/// Files allowed to call the raw write paths
const WRITERS: &[&str] = &[
    "console/core/src/state.rs",
    "console/core/src/epoch.rs",
    "console/core/src/driver.rs",
];

fn is_raw_write(code: &str) -> bool {
    code.contains(".transition(") || code.contains(".modify_if_current(")
}

#[test]
fn test_only_core_writes_state() {
    let violations = scan(&["console/core/src", "tui/src"], |path, code| {
        let allowed = WRITERS.iter().any(|writer| path.ends_with(writer));
        !allowed && is_raw_write(code)
    });

    if !violations.is_empty() {
        eprintln!("\n❌ State written outside the core:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!("\nFound {} raw state write(s).", violations.len());
    }
}

#[test]
fn test_surfaces_have_no_watch_sender() {
    let violations = scan(&["tui/src"], |_, code| code.contains("watch::Sender"));
    assert!(violations.is_empty(), "{violations:?}");
}
