//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural
//! principles of the presentation engine:
//! - No blocking sleeps, and no sleeping poll loops, in production code
//! - The Preference Observer is the only writer of theme marker and metadata
//!
//! The helpers here scan production sources line by line. Everything from
//! a file's `#[cfg(test)]` module onwards is treated as test code and
//! skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// A source line that broke a rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line_number: usize,
    /// Trimmed line text
    pub line: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}",
            self.path.display(),
            self.line_number,
            self.line
        )
    }
}

/// Production source directories of the workspace, relative to its root
pub const PRODUCTION_DIRS: &[&str] = &["folio/core/src", "folio/preview/src"];

/// Workspace root, resolved from this package's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// All `.rs` files under `dir`
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Lines of `content` that precede its test module
#[must_use]
pub fn production_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .take_while(|line| !line.trim_start().starts_with("#[cfg(test)]"))
        .collect()
}

/// Code part of a line, with any trailing `//` comment removed
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Run `check` over every production line of every production file.
///
/// `check` gets the file path, the production lines, and the index of the
/// line under test, and returns whether the line is a violation.
pub fn scan_production(check: impl Fn(&Path, &[&str], usize) -> bool) -> Vec<Violation> {
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
                        line_number: idx + 1,
                        line: lines[idx].trim().to_string(),
                    });
                }
            }
        }
    }

    violations
}

/// Whether the line at `idx` sits inside a `loop` or `while` body opened in
/// the preceding `window` lines
#[must_use]
pub fn is_in_loop(lines: &[&str], idx: usize, window: usize) -> bool {
    lines[idx.saturating_sub(window)..idx].iter().any(|line| {
        let code = code_part(line).trim();
        code.starts_with("loop {") || code.starts_with("while ")
    })
}

/// Whether an `interval.tick()` drives the surrounding loop
#[must_use]
pub fn is_interval_driven(lines: &[&str], idx: usize, window: usize) -> bool {
    let end = (idx + window).min(lines.len());
    lines[idx.saturating_sub(window)..end]
        .iter()
        .any(|line| line.contains(".tick().await"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let content = "fn a() {}\n#[cfg(test)]\nmod tests {\n    fn b() {}\n}\n";
        assert_eq!(production_lines(content), vec!["fn a() {}"]);
    }

    #[test]
    fn test_code_part_strips_comments() {
        assert_eq!(code_part("let x = 1; // thread::sleep("), "let x = 1; ");
    }

    #[test]
    fn test_loop_detection() {
        let code = vec![
            "async fn poll() {",
            "    loop {",
            "        tokio::time::sleep(Duration::from_millis(10)).await;",
            "    }",
            "}",
        ];
        assert!(is_in_loop(&code, 2, 10));
        assert!(!is_interval_driven(&code, 2, 10));
    }

    #[test]
    fn test_one_shot_delay_is_not_a_loop() {
        let code = vec![
            "tokio::spawn(async move {",
            "    tokio::time::sleep(delay).await;",
            "    flag.send_replace(true);",
            "});",
        ];
        assert!(!is_in_loop(&code, 1, 10));
    }

    #[test]
    fn test_workspace_root_contains_core() {
        assert!(workspace_root().join("folio/core/src/lib.rs").exists());
    }
}
