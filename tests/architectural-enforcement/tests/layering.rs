//! Integration Test: Module Layering
//!
//! The wizard writes state and emits events; the coordinator owns the
//! views. Neither side reaches into the other.

use std::path::Path;

use architectural_enforcement::{find, production_lines, report, rust_files};

#[test]
fn test_wizard_does_not_touch_views_or_coordinator() {
    let lines = production_lines(Path::new("visualizer/core/src/wizard.rs"));
    let violations = find(&lines, &["crate::coordinator", "views::crm", "views::pipeline"]);
    report("wizard depends on view internals", &violations);
}

#[test]
fn test_views_do_not_touch_wizard() {
    let lines: Vec<_> = rust_files("visualizer/core/src/views")
        .iter()
        .flat_map(|file| production_lines(file))
        .collect();
    let violations = find(&lines, &["crate::wizard", "WizardController"]);
    report("view depends on the wizard", &violations);
}

#[test]
fn test_only_the_facade_spawns_tasks() {
    let lines: Vec<_> = rust_files("visualizer/core/src")
        .iter()
        .filter(|file| !file.ends_with("visualizer.rs"))
        .flat_map(|file| production_lines(file))
        .collect();
    let violations = find(&lines, &["tokio::spawn("]);
    report("task spawned outside the facade", &violations);
}
