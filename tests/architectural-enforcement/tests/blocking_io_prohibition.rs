//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: code that runs on the runtime uses `tokio::fs` and
//! `tokio::io`. The synchronous config loader is the one exception; it runs
//! before any session starts.

use std::path::Path;

use architectural_enforcement::{all_production_lines, find, report};

const ALLOWED: [&str; 1] = ["visualizer/core/src/config/mod.rs"];

#[test]
fn test_no_blocking_io_in_production_code() {
    let lines = all_production_lines();
    let violations: Vec<_> = find(
        &lines,
        &["std::fs::", "std::net::", "std::io::stdin", "block_on("],
    )
    .into_iter()
    .filter(|line| !ALLOWED.iter().any(|allowed| line.path == Path::new(allowed)))
    .collect();
    report("blocking I/O in production code", &violations);
}
