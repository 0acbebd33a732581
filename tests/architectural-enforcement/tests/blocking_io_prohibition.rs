//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: async functions in the engine and daemon MUST NOT touch the
//! file system or network through `std`.
//! **Exceptions**: non-async functions (config and asset loading run before
//! the runtime loops start), test code

use std::path::Path;

use architectural_enforcement::{code_part, is_in_async_function, report, scan};

const BLOCKING_PATTERNS: [&str; 6] = [
    "std::fs::",
    "fs::read",
    "fs::write",
    "File::open",
    "std::net::",
    "std::io::stdin",
];

#[test]
fn test_no_blocking_io_in_async_code() {
    let violations = scan(is_blocking_io_violation);
    report(
        "CRITICAL: Blocking I/O calls found in async code!",
        &[
            "✅ REQUIRED: tokio::io / tokio::fs inside async functions",
            "✅ ACCEPTABLE: blocking calls in sync loaders or spawn_blocking",
        ],
        &violations,
    );
}

fn is_blocking_io_violation(_path: &Path, lines: &[&str], idx: usize) -> bool {
    let code = code_part(lines[idx]);
    BLOCKING_PATTERNS.iter().any(|p| code.contains(p))
        && !code.contains("tokio::")
        && is_in_async_function(lines, idx)
}

#[test]
fn test_sync_loader_is_allowed() {
    let lines = vec![
        "pub fn load_config_from_path(path: Option<PathBuf>) -> Result<PetConfig, ConfigError> {",
        "    let contents = std::fs::read_to_string(path)?;",
        "}",
    ];
    assert!(!is_blocking_io_violation(Path::new("x.rs"), &lines, 1));
}

#[test]
fn test_std_fs_in_async_is_flagged() {
    let lines = vec![
        "pub async fn reload(&mut self) {",
        "    let contents = std::fs::read_to_string(&self.path);",
        "}",
    ];
    assert!(is_blocking_io_violation(Path::new("x.rs"), &lines, 1));
}
