//! Captured filesystem snapshot records.
//!
//! Snapshots are produced by an external capture step and consumed read-only.
//! Tables are ordered maps so every pass over them is deterministic.
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One captured filesystem state.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Snapshot {
    #[serde(default)]
    pub system_info: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
    #[serde(default)]
    pub symlinks: BTreeMap<String, SymlinkRecord>,
}

/// A regular file; `hash` is absent when the file could not be read at capture.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct FileRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub hash: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A symlink; `target` is absent when the link could not be read at capture.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SymlinkRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub target: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

// Non-string values are treated as absent rather than failing the whole load.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        _ => None,
    })
}

impl Snapshot {
    /// Read a snapshot JSON document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read snapshot {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse snapshot JSON {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            files = snapshot.files.len(),
            symlinks = snapshot.symlinks.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Content hash of a regular file, `None` if absent or unreadable.
    pub fn file_hash(&self, path: &str) -> Option<&str> {
        self.files.get(path)?.hash.as_deref()
    }

    /// Raw target of a symlink, `None` if not a symlink or unreadable.
    pub fn symlink_target(&self, path: &str) -> Option<&str> {
        self.symlinks.get(path)?.target.as_deref()
    }

    /// Every file and symlink path in lexicographic order, without duplicates.
    pub fn all_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .files
            .keys()
            .chain(self.symlinks.keys())
            .map(String::as_str)
            .collect();
        paths.sort_unstable();
        paths.dedup();
        paths
    }
}
