//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce the engine's timer
//! discipline:
//! - No blocking sleeps anywhere in production code
//! - Only the engine driver and the caption player own tokio timers
//! - Background lookups are polled in-task, never spawned
//!
//! The helpers here scan workspace sources; the rules live under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// One offending source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the line is in
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// The trimmed line
    pub line: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line_number, self.line)
    }
}

/// Workspace root, two levels above this crate
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let path = workspace_root().join(dir);
    if !path.exists() {
        return Vec::new();
    }

    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Production lines of a source file as `(line_number, code)`
///
/// Stops at the first `#[cfg(test)]` and drops line comments, so doc
/// examples and test modules never count.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
        .filter(|(_, code)| !code.trim().is_empty())
        .collect()
}

/// Lines in `dir` whose code contains any of `patterns`
///
/// Files whose name is in `allowed_files` are skipped.
#[must_use]
pub fn find_violations(dir: &str, patterns: &[&str], allowed_files: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for path in rust_sources(dir) {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if allowed_files.contains(&file_name) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line_number, code) in production_lines(&content) {
            if patterns.iter().any(|p| code.contains(p)) {
                violations.push(Violation {
                    path: path.clone(),
                    line_number,
                    line: code.trim().to_string(),
                });
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_tests_and_comments() {
        let source = "\
fn run() {
    // tokio::time::sleep(d).await;
    let t = sleep(d); // timer
}

#[cfg(test)]
mod tests {
    fn helper() { std::thread::sleep(d); }
}
";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], (3, "    let t = sleep(d); "));
        assert!(lines.iter().all(|(_, code)| !code.contains("thread::sleep")));
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_engine_sources_found() {
        let sources = rust_sources("typist/core/src");
        assert!(sources.iter().any(|p| p.ends_with("engine.rs")));
    }
}
