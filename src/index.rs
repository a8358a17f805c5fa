//! Normalized-path lookup table for one snapshot.
use crate::normalize::normalize_path;
use std::collections::HashMap;

/// Normalized path to every original path that normalizes to it.
///
/// Candidate lists keep the order in which paths were fed to [`PathIndex::build`].
#[derive(Debug, Default)]
pub struct PathIndex {
    entries: HashMap<String, Vec<String>>,
}

impl PathIndex {
    pub fn build<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: HashMap<String, Vec<String>> = HashMap::new();
        for path in paths {
            let path = path.as_ref();
            entries
                .entry(normalize_path(path))
                .or_default()
                .push(path.to_string());
        }
        Self { entries }
    }

    /// Original paths sharing `normalized`; empty when there are none.
    pub fn candidates(&self, normalized: &str) -> &[String] {
        self.entries
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct normalized keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
