//! Census of symlinks per store-root spelling.
use crate::normalize::{store_hash, STORE_ROOTS};
use crate::resolve::ChainResolver;
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreRootCounts {
    /// Store root to the number of symlink paths containing it.
    pub state1: BTreeMap<String, usize>,
    pub state2: BTreeMap<String, usize>,
}

pub fn count_store_roots(snapshot: &Snapshot) -> BTreeMap<String, usize> {
    STORE_ROOTS
        .iter()
        .map(|root| {
            let count = snapshot
                .symlinks
                .keys()
                .filter(|path| path.contains(root))
                .count();
            (root.to_string(), count)
        })
        .collect()
}

pub fn analyze_structure(state1: &Snapshot, state2: &Snapshot) -> StoreRootCounts {
    StoreRootCounts {
        state1: count_store_roots(state1),
        state2: count_store_roots(state2),
    }
}

/// Log the first `sample_size` symlinks of `snapshot` with their resolution.
///
/// Uses a throwaway resolver so the matcher's caches stay untouched.
pub fn log_sample(snapshot: &Snapshot, sample_size: usize, max_depth: usize) {
    let mut resolver = ChainResolver::new(snapshot, max_depth);
    for (path, record) in snapshot.symlinks.iter().take(sample_size) {
        let resolution = resolver.resolve(path);
        tracing::debug!(
            path = %path,
            target = record.target.as_deref().unwrap_or("<none>"),
            hash = store_hash(path).unwrap_or("no match"),
            final_path = %resolution.final_path,
            status = ?resolution.status,
            "sample symlink"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SymlinkRecord;

    #[test]
    fn counts_each_store_root_spelling() {
        let hash = "a".repeat(32);
        let mut snapshot = Snapshot::default();
        for path in [
            format!("nix/store/{hash}-a/bin/x"),
            format!("nix/store/{hash}-b/bin/y"),
            format!("nix/.ro-store/{hash}-c/lib"),
            "usr/bin/env".to_string(),
        ] {
            snapshot.symlinks.insert(path, SymlinkRecord::default());
        }

        let counts = analyze_structure(&snapshot, &Snapshot::default());
        assert_eq!(counts.state1.get("nix/store/"), Some(&2));
        assert_eq!(counts.state1.get("nix/.ro-store/"), Some(&1));
        assert_eq!(counts.state1.get("nix/.rw-store/"), Some(&0));
        assert_eq!(counts.state2.get("nix/store/"), Some(&0));
    }
}
