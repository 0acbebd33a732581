//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No sleeping in production code outside a `select!` arm
//! - No blocking file I/O inside async functions
//! - The behavior controller is the only writer of the pet model
//!
//! The helpers here walk the engine's source trees and hand each production
//! line (everything above the first `#[cfg(test)]`) to a rule.

use std::fs;
use std::path::{Path, PathBuf};

/// Source roots checked by every rule, relative to the workspace root
pub const PRODUCTION_DIRS: [&str; 2] = ["engine/core/src", "engine/daemon/src"];

/// A rule hit, printed as `path:line - code`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: PathBuf,
    pub line: usize,
    pub code: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.code)
    }
}

/// Workspace root, found from this crate's manifest
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Every `.rs` file under `dir`, sorted for stable output
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Lines before the test module
pub fn production_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .collect()
}

/// A line with any `//` comment removed
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Run `check` over the production lines of every file in [`PRODUCTION_DIRS`]
///
/// `check` gets the file path, its production lines and a line index, and
/// returns true for a violation.
pub fn scan<F>(check: F) -> Vec<Violation>
where
    F: Fn(&Path, &[&str], usize) -> bool,
{
    let root = workspace_root();
    let mut violations = Vec::new();
    for dir in PRODUCTION_DIRS {
        for path in rust_files(&root.join(dir)) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            let lines = production_lines(&content);
            for idx in 0..lines.len() {
                if check(&path, &lines, idx) {
                    violations.push(Violation {
                        path: path.clone(),
                        line: idx + 1,
                        code: lines[idx].trim().to_string(),
                    });
                }
            }
        }
    }
    violations
}

/// Whether the enclosing `fn` (scanning upwards) is `async`
pub fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..=current_idx).rev() {
        let line = code_part(lines[i]).trim();
        if line.contains("fn ") {
            return line.contains("async fn ");
        }
        if line.starts_with("impl ") || line.starts_with("mod ") {
            return false;
        }
    }
    false
}

/// Panic with a readable report when `violations` is not empty
pub fn report(title: &str, hints: &[&str], violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for hint in hints {
        eprintln!("  {hint}");
    }
    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n";
        assert_eq!(production_lines(content), vec!["fn a() {}", ""]);
    }

    #[test]
    fn test_async_detection() {
        let lines = vec![
            "pub async fn run(self) {",
            "    let x = 1;",
            "}",
            "fn load() {",
            "    let y = 2;",
            "}",
        ];
        assert!(is_in_async_function(&lines, 1));
        assert!(!is_in_async_function(&lines, 4));
    }

    #[test]
    fn test_engine_sources_found() {
        let files = rust_files(&workspace_root().join("engine/core/src"));
        assert!(files.iter().any(|p| p.ends_with("controller.rs")));
    }
}
