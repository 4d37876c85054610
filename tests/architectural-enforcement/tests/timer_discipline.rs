//! Integration Test: Timer Discipline
//!
//! **Policy**: A typing item has at most one pending timer and at most one
//! pending background lookup. That only holds if timers are created in one
//! place and lookups are never detached from the task that can cancel them.
//!
//! **Exceptions**: `engine.rs` (the driver's single timer) and `showcase.rs`
//! (the caption player), test code.

use architectural_enforcement::{find_violations, Violation};

fn report(title: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!("\nFound {} violation(s). Fix these before merging!", violations.len());
}

/// Blocking sleeps stall the runtime and every engine on it
#[test]
fn test_no_blocking_sleep() {
    let mut violations = find_violations("typist/core/src", &["thread::sleep("], &[]);
    violations.extend(find_violations("typist/cli/src", &["thread::sleep("], &[]));
    report("Blocking sleep in production code", &violations);
}

/// Timers belong to the engine driver and the caption player only
#[test]
fn test_timers_only_in_drivers() {
    let timer_calls = [
        "sleep(",
        "sleep_until(",
        "time::interval(",
        "interval_at(",
        "Sleep>",
        "Instant::now()",
    ];
    let mut violations = find_violations(
        "typist/core/src",
        &timer_calls,
        &["engine.rs", "showcase.rs"],
    );
    violations.extend(find_violations("typist/cli/src", &timer_calls, &[]));
    report("Timer created outside the engine driver", &violations);
}

/// Spawned lookups would outlive list replacement and shutdown
#[test]
fn test_lookups_are_not_spawned() {
    let spawns = ["tokio::spawn(", "task::spawn(", "spawn_blocking("];
    let violations = find_violations("typist/core/src", &spawns, &["engine.rs"]);
    report("Task spawned outside the engine driver", &violations);
}

/// The engine spawns exactly one task: itself
#[test]
fn test_engine_spawns_only_itself() {
    let violations = find_violations("typist/core/src", &["spawn("], &[])
        .into_iter()
        .filter(|v| !v.line.contains("tokio::spawn(engine.run())"))
        .filter(|v| !v.line.starts_with("pub fn spawn("))
        .collect::<Vec<_>>();
    report("Unexpected spawn in the engine", &violations);
}
