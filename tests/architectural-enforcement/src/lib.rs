//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No thread sleeps in production code
//! - No blocking HTTP clients or runtime re-entry inside async code
//!
//! The helpers here scan production sources line by line. Test modules
//! (everything from `#[cfg(test)]` to the end of a file) are skipped.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source directories, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["advisor/core/src", "advisor/cli/src"];

/// A forbidden pattern found in production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Trimmed source line
    pub text: String,
    /// Which rule matched
    pub rule: &'static str,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Scan every production `.rs` file for `(pattern, rule)` pairs
pub fn scan_production(rules: &[(&str, &'static str)]) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();
    for dir in PRODUCTION_DIRS {
        scan_directory(&root.join(dir), rules, &mut violations);
    }
    violations
}

/// Scan one directory tree
pub fn scan_directory(dir: &Path, rules: &[(&str, &'static str)], violations: &mut Vec<Violation>) {
    if !dir.exists() {
        return;
    }

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.path().extension().and_then(|s| s.to_str()) == Some("rs") {
            if let Ok(content) = fs::read_to_string(entry.path()) {
                violations.extend(scan_source(entry.path(), &content, rules));
            }
        }
    }
}

/// Scan one file's contents
pub fn scan_source(path: &Path, content: &str, rules: &[(&str, &'static str)]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }

        // Skip comments
        let code_part = line.split("//").next().unwrap_or(line);

        for &(pattern, rule) in rules {
            if code_part.contains(pattern) {
                violations.push(Violation {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                    rule,
                });
            }
        }
    }

    violations
}

/// Print violations and fail the calling test
pub fn report(title: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
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
    fn test_scan_skips_comments_and_test_modules() {
        let source = "\
fn real() {
    std::thread::sleep(d); // bad
    // std::thread::sleep(d);
}

#[cfg(test)]
mod tests {
    fn t() { std::thread::sleep(d); }
}
";
        let found = scan_source(Path::new("x.rs"), source, &[("std::thread::sleep", "sleep")]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 2);
    }

    #[test]
    fn test_production_dirs_exist() {
        let root = workspace_root();
        for dir in PRODUCTION_DIRS {
            assert!(root.join(dir).exists(), "{dir} missing");
        }
    }
}
