//! Architectural Enforcement Helpers
//!
//! Source scanning shared by the integration tests in `tests/`:
//! - Workspace root discovery
//! - Rust source enumeration
//! - Production line extraction (comments and `#[cfg(test)]` modules removed)

use std::fs;
use std::path::{Path, PathBuf};

/// A rule broken at one line of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Root of the workspace this crate lives in
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root();
    let path = root.join(dir);
    if !path.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.path().strip_prefix(&root).unwrap_or(e.path()).to_path_buf())
        .collect();
    files.sort();
    files
}

/// Production code lines of a file as `(line_number, code)`
///
/// Line comments are stripped and everything from the first `#[cfg(test)]`
/// on is dropped; test modules sit at the bottom of every file here.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim_start().starts_with("#[cfg(test)]") {
            break;
        }
        let code = line.split("//").next().unwrap_or(line);
        if code.trim().is_empty() {
            continue;
        }
        out.push((idx + 1, code.to_string()));
    }
    out
}

/// Scan the production lines of every file under `dirs` with `check`
///
/// `check` gets the file path and one code line and returns whether the
/// line breaks the rule.
pub fn scan(dirs: &[&str], check: impl Fn(&Path, &str) -> bool) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();

    for dir in dirs {
        for path in rust_sources(dir) {
            let Ok(content) = fs::read_to_string(root.join(&path)) else {
                continue;
            };
            for (line, code) in production_lines(&content) {
                if check(&path, &code) {
                    violations.push(Violation {
                        path: path.clone(),
                        line,
                        text: code.trim().to_string(),
                    });
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let code = "fn a() {}\n// note\nlet x = 1; // trailing\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(code);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], (1, "fn a() {}".to_string()));
        assert_eq!(lines[1].0, 3);
        assert_eq!(lines[1].1.trim(), "let x = 1;");
    }

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
        assert!(!rust_sources("console/core/src").is_empty());
    }
}
