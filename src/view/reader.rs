//! Reading view documents and discovering them on disk.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use serde_json::Value;
use walkdir::WalkDir;

use super::flatten::{flatten, FlatMap};
use crate::error::{LintError, Result};

/// Default file-name pattern for Perspective views.
pub const DEFAULT_VIEW_PATTERN: &str = "view.json";

/// Read and parse a view document.
pub fn read_document(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LintError::DocumentNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LintError::Io(e)
        }
    })?;

    serde_json::from_str(&content).map_err(|e| LintError::InvalidDocument {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Read a view document and flatten it.
pub fn read_flat(path: &Path) -> Result<FlatMap> {
    let document = read_document(path)?;
    Ok(flatten(&document))
}

/// Collect view files from a mix of file and directory inputs.
///
/// Files are taken as given. Directories are walked recursively without
/// following symlinks. A pattern without `/` matches file names at any depth.
/// A pattern with `/` is matched against the path relative to the input
/// directory, where `*` stays within one directory and `**` spans any number
/// of them. Results are de-duplicated and directory results are sorted.
pub fn discover_views(inputs: &[PathBuf], patterns: &[String]) -> Result<Vec<PathBuf>> {
    let patterns = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(ViewPattern::new)
        .collect::<Result<Vec<_>>>()?;

    let mut found = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut in_dir = walk(input, &patterns);
            in_dir.sort();
            found.extend(in_dir);
        } else {
            found.push(input.clone());
        }
    }

    let mut seen = HashSet::new();
    found.retain(|p| seen.insert(p.clone()));
    Ok(found)
}

/// A compiled `--files` pattern.
#[derive(Debug, Clone)]
pub struct ViewPattern {
    pattern: Pattern,
    /// Whether the pattern names a path rather than a bare file name.
    anchored: bool,
}

impl ViewPattern {
    /// Compile a pattern, rejecting malformed globs.
    pub fn new(pattern: &str) -> Result<Self> {
        let anchored = pattern.contains('/');
        let compiled = Pattern::new(pattern).map_err(|e| LintError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self {
            pattern: compiled,
            anchored,
        })
    }

    /// Check a file, given by its path relative to the searched directory.
    pub fn matches(&self, relative: &Path) -> bool {
        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::new()
        };
        if self.anchored {
            self.pattern.matches_path_with(relative, options)
        } else {
            relative
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| self.pattern.matches_with(name, options))
        }
    }
}

fn walk(dir: &Path, patterns: &[ViewPattern]) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Cannot read directory entry under {}: {}", dir.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        if patterns.iter().any(|p| p.matches(relative)) {
            found.push(entry.into_path());
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_document_parses_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("view.json");
        fs::write(&path, r#"{"custom": {"a": 1}}"#).unwrap();

        let flat = read_flat(&path).unwrap();
        assert!(flat.contains("custom.a"));
    }

    #[test]
    fn read_document_reports_missing_file() {
        let result = read_document(Path::new("/nonexistent/view.json"));
        assert!(matches!(result, Err(LintError::DocumentNotFound { .. })));
    }

    #[test]
    fn read_document_reports_malformed_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("view.json");
        fs::write(&path, "{ not json").unwrap();

        let result = read_document(&path);
        assert!(matches!(result, Err(LintError::InvalidDocument { .. })));
    }

    fn view_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("views/A");
        let b = temp.path().join("views/B/Nested");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();
        fs::write(a.join("view.json"), "{}").unwrap();
        fs::write(b.join("view.json"), "{}").unwrap();
        fs::write(b.join("thumbnail.png"), "").unwrap();
        temp
    }

    fn count(temp: &TempDir, pattern: &str) -> usize {
        discover_views(&[temp.path().to_path_buf()], &[pattern.to_string()])
            .unwrap()
            .len()
    }

    #[test]
    fn discovers_views_recursively() {
        let temp = view_tree();

        let found = discover_views(&[temp.path().to_path_buf()], &["view.json".to_string()]).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.ends_with("view.json")));
    }

    #[test]
    fn directory_patterns_match_relative_paths() {
        let temp = view_tree();

        assert_eq!(count(&temp, "**/view.json"), 2);
        assert_eq!(count(&temp, "views/**/view.json"), 2);
        assert_eq!(count(&temp, "views/*/view.json"), 1);
        assert_eq!(count(&temp, "views/B/*/view.json"), 1);
        assert_eq!(count(&temp, "A/view.json"), 0);
        assert_eq!(count(&temp, "*.json"), 2);
        assert_eq!(count(&temp, "vie?.json"), 2);
    }

    #[test]
    fn malformed_pattern_is_an_error() {
        let temp = view_tree();
        let result = discover_views(&[temp.path().to_path_buf()], &["views/[".to_string()]);
        assert!(matches!(result, Err(LintError::InvalidPattern { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loops_are_not_followed() {
        let temp = view_tree();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("views/A/loop")).unwrap();

        assert_eq!(count(&temp, "view.json"), 2);
    }

    #[test]
    fn explicit_files_are_kept_once() {
        let file = PathBuf::from("some/view.json");
        let found = discover_views(&[file.clone(), file.clone()], &[]).unwrap();
        assert_eq!(found, vec![file]);
    }
}
