//! Architectural Enforcement
//!
//! Source scanners shared by the integration tests in `tests/`. Each test
//! walks the production sources of the visualizer crates and reports lines
//! that break one of the engine's structural rules:
//!
//! - pacing waits go through the tokio timer, never a blocking sleep
//! - no blocking I/O inside the async engine
//! - the wizard and the views only meet through events
//!
//! `#[cfg(test)]` modules are not production code; scanning a file stops at
//! the first one.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source roots, relative to the workspace root
pub const PRODUCTION_ROOTS: [&str; 2] = ["visualizer/core/src", "visualizer/demo/src"];

/// Workspace root, two levels above this crate
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// One production source line
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// File path relative to the workspace root
    pub path: PathBuf,
    /// 1-based line number
    pub number: usize,
    /// The line with any trailing `//` comment removed
    pub code: String,
}

impl std::fmt::Display for SourceLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.number, self.code.trim())
    }
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root();
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root.join(dir))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .filter_map(|e| e.path().strip_prefix(&root).ok().map(Path::to_path_buf))
        .collect();
    files.sort();
    files
}

/// Production lines of one file: comments stripped, test module excluded
#[must_use]
pub fn production_lines(relative: &Path) -> Vec<SourceLine> {
    let Ok(content) = fs::read_to_string(workspace_root().join(relative)) else {
        return Vec::new();
    };

    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter(|(_, line)| {
            let trimmed = line.trim_start();
            !trimmed.starts_with("//") && !trimmed.starts_with("*")
        })
        .map(|(idx, line)| SourceLine {
            path: relative.to_path_buf(),
            number: idx + 1,
            code: line.split("//").next().unwrap_or(line).to_string(),
        })
        .collect()
}

/// Production lines across every production root
#[must_use]
pub fn all_production_lines() -> Vec<SourceLine> {
    PRODUCTION_ROOTS
        .iter()
        .flat_map(|dir| rust_files(dir))
        .flat_map(|file| production_lines(&file))
        .collect()
}

/// Lines matching any of `patterns`
#[must_use]
pub fn find<'a>(lines: &'a [SourceLine], patterns: &[&str]) -> Vec<&'a SourceLine> {
    lines
        .iter()
        .filter(|line| patterns.iter().any(|p| line.code.contains(p)))
        .collect()
}

/// Panic with a readable report when `violations` is non-empty
pub fn report(rule: &str, violations: &[&SourceLine]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n{rule}\n");
    for violation in violations {
        eprintln!("  {violation}");
    }
    panic!("\nFound {} violation(s): {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_roots_exist() {
        for dir in PRODUCTION_ROOTS {
            assert!(!rust_files(dir).is_empty(), "no sources under {dir}");
        }
    }

    #[test]
    fn test_test_modules_are_skipped() {
        let lines = production_lines(Path::new("visualizer/core/src/ledger.rs"));
        assert!(!lines.is_empty());
        assert!(lines.iter().all(|l| !l.code.contains("#[test]")));
    }
}
