//! Content comparison of regular files inside the store.
//!
//! Files are keyed by their hash-normalized path; a key is identical when any
//! content hash is shared between the two snapshots.
use crate::normalize::normalize_path;
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const STORE_PREFIX: &str = "nix/store/";

/// Normalized path to `(original path, content hash)` entries.
pub type StoreIndex = BTreeMap<String, Vec<(String, String)>>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreEntry {
    pub normalized_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state1: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub state2: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreDiff {
    pub identical: Vec<StoreEntry>,
    pub differing: Vec<StoreEntry>,
    pub only_in_state1: Vec<StoreEntry>,
    pub only_in_state2: Vec<StoreEntry>,
}

/// Index readable store files; unreadable files carry no content and are skipped.
pub fn build_store_index(snapshot: &Snapshot) -> StoreIndex {
    let mut index = StoreIndex::new();
    for (path, record) in &snapshot.files {
        if !path.starts_with(STORE_PREFIX) {
            continue;
        }
        let Some(hash) = record.hash.as_deref() else {
            continue;
        };
        index
            .entry(normalize_path(path))
            .or_default()
            .push((path.clone(), hash.to_string()));
    }
    index
}

pub fn compare_store(index1: &StoreIndex, index2: &StoreIndex) -> StoreDiff {
    let keys: BTreeSet<&String> = index1.keys().chain(index2.keys()).collect();
    let mut diff = StoreDiff::default();
    for key in keys {
        let entries1 = index1.get(key).cloned().unwrap_or_default();
        let entries2 = index2.get(key).cloned().unwrap_or_default();
        let entry = StoreEntry {
            normalized_path: key.clone(),
            state1: entries1,
            state2: entries2,
        };
        match (entry.state1.is_empty(), entry.state2.is_empty()) {
            (false, false) => {
                let hashes1: BTreeSet<&str> =
                    entry.state1.iter().map(|(_, hash)| hash.as_str()).collect();
                let shared = entry
                    .state2
                    .iter()
                    .any(|(_, hash)| hashes1.contains(hash.as_str()));
                if shared {
                    diff.identical.push(entry);
                } else {
                    diff.differing.push(entry);
                }
            }
            (false, true) => diff.only_in_state1.push(entry),
            (true, false) => diff.only_in_state2.push(entry),
            (true, true) => {}
        }
    }
    diff
}
