//! Path-prefix exclusions applied before analysis.
//!
//! Patterns are plain text, one per line. A leading `/` is implied on both
//! patterns and paths; a trailing `/` makes a pattern match a whole directory.
use crate::snapshot::Snapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionList {
    patterns: Vec<String>,
}

impl ExclusionList {
    /// Parse pattern text; comments and blank lines are skipped.
    pub fn parse(text: &str) -> Self {
        let patterns = text
            .lines()
            .filter_map(|line| {
                let pattern = line.split('#').next().unwrap_or_default().trim();
                if pattern.is_empty() {
                    return None;
                }
                Some(with_leading_slash(pattern))
            })
            .collect();
        Self { patterns }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read exclusion patterns {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        let path = with_leading_slash(path);
        self.patterns.iter().any(|pattern| {
            if path == *pattern {
                return true;
            }
            pattern.ends_with('/')
                && (path.starts_with(pattern.as_str()) || format!("{path}/") == *pattern)
        })
    }

    /// Drop excluded files and symlinks from `snapshot`.
    pub fn apply(&self, mut snapshot: Snapshot) -> Snapshot {
        if self.is_empty() {
            return snapshot;
        }
        snapshot.files.retain(|path, _| !self.is_excluded(path));
        snapshot.symlinks.retain(|path, _| !self.is_excluded(path));
        snapshot
    }
}

fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{FileRecord, SymlinkRecord};

    const PATTERNS: &str = "\
# runtime state
var/log/
/etc/machine-id   # regenerated per boot

tmp
";

    #[test]
    fn parses_patterns_with_comments() {
        let list = ExclusionList::parse(PATTERNS);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn matches_exact_paths_and_directory_prefixes() {
        let list = ExclusionList::parse(PATTERNS);
        assert!(list.is_excluded("etc/machine-id"));
        assert!(list.is_excluded("/etc/machine-id"));
        assert!(!list.is_excluded("etc/machine-id.bak"));
        assert!(list.is_excluded("var/log/messages"));
        assert!(list.is_excluded("var/log"));
        assert!(!list.is_excluded("var/logs/x"));
        assert!(list.is_excluded("tmp"));
        assert!(!list.is_excluded("tmp/file"));
    }

    #[test]
    fn filter_drops_excluded_entries_from_both_tables() {
        let mut snapshot = Snapshot::default();
        snapshot
            .files
            .insert("var/log/messages".to_string(), FileRecord::default());
        snapshot
            .files
            .insert("etc/hosts".to_string(), FileRecord::default());
        snapshot
            .symlinks
            .insert("var/log/latest".to_string(), SymlinkRecord::default());
        snapshot
            .symlinks
            .insert("bin/sh".to_string(), SymlinkRecord::default());

        let filtered = ExclusionList::parse(PATTERNS).apply(snapshot);
        assert_eq!(filtered.all_paths(), vec!["bin/sh", "etc/hosts"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = ExclusionList::load(&dir.path().join("nope.txt")).expect_err("missing file");
        assert!(err.to_string().contains("read exclusion patterns"));
    }
}
