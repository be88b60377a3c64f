//! Integration Test: Sleep Prohibition
//!
//! **Policy**: The animation never sleeps behind the driver's back. Every
//! wait of a run goes through `RunGuard::sleep`, which wakes up as soon as
//! the run is stopped.
//!
//! **Exceptions**:
//! - `console/core/src/epoch.rs` (the guarded sleep itself)
//! - `tui/src/app.rs` (frame limiting and cursor blink)
//! - Test code

use std::path::Path;

use architectural_enforcement::scan;

/// Files allowed to call the Tokio timer directly
const TIMER_ALLOWED: &[&str] = &["console/core/src/epoch.rs", "tui/src/app.rs"];

fn is_raw_timer(code: &str) -> bool {
    code.contains("time::sleep(")
        || code.contains("sleep_until(")
        || code.contains("use tokio::time::sleep")
}

fn is_thread_sleep(code: &str) -> bool {
    code.contains("thread::sleep(")
}

#[test]
fn test_no_thread_sleep_anywhere() {
    let violations = scan(&["console/core/src", "tui/src"], |_, code| {
        is_thread_sleep(code)
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Blocking sleep found in production code:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} blocking sleep(s). Use RunGuard::sleep instead.",
            violations.len()
        );
    }
}

#[test]
fn test_waits_go_through_run_guard() {
    let violations = scan(&["console/core/src", "tui/src"], |path: &Path, code| {
        let allowed = TIMER_ALLOWED.iter().any(|allowed| path.ends_with(allowed));
        !allowed && is_raw_timer(code)
    });

    if !violations.is_empty() {
        eprintln!("\n❌ Unguarded timers found in production code:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Use RunGuard::sleep so stop() cancels the wait");
        panic!("\nFound {} unguarded timer(s).", violations.len());
    }
}

#[test]
fn test_detector_flags_raw_timers() {
    assert!(is_raw_timer("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_raw_timer("    sleep_until(deadline).await;"));
    assert!(is_thread_sleep("std::thread::sleep(d);"));
    assert!(!is_raw_timer("    if !guard.sleep(step.delay()).await {"));
}
