//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Engine and daemon code MUST NOT block a thread with sleep, and
//! may only await `tokio::time::sleep` as one arm of a `select!`, so every
//! wait also watches for shutdown.
//! **Exceptions**: test code

use std::path::Path;

use architectural_enforcement::{code_part, report, scan};

#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(is_sleep_violation);
    report(
        "CRITICAL: Sleep calls found in production code!",
        &[
            "✅ ACCEPTABLE: `() = tokio::time::sleep(delay) => {}` inside tokio::select!",
            "✅ ACCEPTABLE: tokio::time::interval / interval_at for periodic work",
            "❌ FORBIDDEN: std::thread::sleep anywhere",
            "❌ FORBIDDEN: a bare `sleep(..).await` that ignores shutdown",
        ],
        &violations,
    );
}

fn is_sleep_violation(_path: &Path, lines: &[&str], idx: usize) -> bool {
    let code = code_part(lines[idx]);
    if code.contains("thread::sleep") {
        return true;
    }
    if !(code.contains("::sleep(") || code.contains(".sleep(")) {
        return false;
    }
    !is_select_arm(lines, idx)
}

/// A `pattern = future => handler` arm inside a nearby `select!`
fn is_select_arm(lines: &[&str], current_idx: usize) -> bool {
    if !code_part(lines[current_idx]).contains("=>") {
        return false;
    }
    let start = current_idx.saturating_sub(6);
    lines[start..current_idx]
        .iter()
        .any(|line| code_part(line).contains("select!"))
}

#[test]
fn test_select_arm_is_allowed() {
    let lines = vec![
        "loop {",
        "    tokio::select! {",
        "        () = tokio::time::sleep(delay) => {}",
        "        changed = shutdown.changed() => break,",
        "    }",
        "}",
    ];
    assert!(!is_sleep_violation(Path::new("x.rs"), &lines, 2));
}

#[test]
fn test_bare_sleep_is_flagged() {
    let lines = vec![
        "async fn poll() {",
        "    loop {",
        "        tokio::time::sleep(Duration::from_secs(1)).await;",
        "    }",
        "}",
    ];
    assert!(is_sleep_violation(Path::new("x.rs"), &lines, 2));

    let blocking = vec!["fn wait() {", "    std::thread::sleep(d);", "}"];
    assert!(is_sleep_violation(Path::new("x.rs"), &blocking, 1));
}
