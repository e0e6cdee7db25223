//! Integration Test: Blocking Sleep Prohibition
//!
//! **Policy**: every pacing wait in the engine (typewriter ticks, settle
//! delays, fades, the refresh effect) runs on the tokio timer so abort and
//! paused-clock tests keep working. A blocking sleep stalls the coordinator
//! task and every animation behind it.

use architectural_enforcement::{all_production_lines, find, report};

#[test]
fn test_no_blocking_sleep_in_production_code() {
    let lines = all_production_lines();
    let violations = find(&lines, &["thread::sleep(", "std::thread::sleep"]);
    report("blocking sleep in production code, use tokio::time::sleep", &violations);
}

#[test]
fn test_no_os_threads_in_production_code() {
    let lines = all_production_lines();
    let violations = find(&lines, &["thread::spawn(", "std::thread::Builder"]);
    report("OS thread spawned, use tokio::spawn", &violations);
}

#[test]
fn test_sleeps_use_the_tokio_timer() {
    let lines = all_production_lines();
    let violations: Vec<_> = find(&lines, &["sleep("])
        .into_iter()
        .filter(|line| !line.code.contains("time::sleep("))
        .collect();
    report("sleep without the tokio timer", &violations);
}
