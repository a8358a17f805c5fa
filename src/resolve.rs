//! Symlink chain resolution within a single snapshot.
//!
//! Chains are followed iteratively under a hop bound, so cyclic or very long
//! chains always terminate. Every outcome is a value; nothing here fails.
use crate::normalize::{lexical_join, parent_dir, strip_leading};
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Default number of hops followed before giving up.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// How a chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Reached a regular file with a known content hash.
    File,
    /// A symlink in the chain had no readable target.
    Broken,
    /// The chain pointed at a path that is not a readable regular file.
    Missing,
    /// The chain revisited a path.
    Cycle,
    /// The hop bound ran out first.
    MaxDepth,
}

/// Terminal state of following a path through zero or more symlinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub final_path: String,
    pub broken: bool,
    pub final_hash: Option<String>,
    pub status: ResolutionStatus,
}

impl Resolution {
    fn file(final_path: String, hash: String) -> Self {
        Self {
            final_path,
            broken: false,
            final_hash: Some(hash),
            status: ResolutionStatus::File,
        }
    }

    fn terminal(final_path: String, status: ResolutionStatus) -> Self {
        Self {
            final_path,
            broken: true,
            final_hash: None,
            status,
        }
    }
}

/// Memoizing resolver bound to one snapshot.
///
/// The cache is keyed by the path handed to [`ChainResolver::resolve`], not by
/// intermediate hops, and entries are never recomputed once written.
pub struct ChainResolver<'a> {
    snapshot: &'a Snapshot,
    max_depth: usize,
    cache: HashMap<String, Resolution>,
}

impl<'a> ChainResolver<'a> {
    pub fn new(snapshot: &'a Snapshot, max_depth: usize) -> Self {
        Self {
            snapshot,
            max_depth,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, start: &str) -> Resolution {
        if let Some(cached) = self.cache.get(start) {
            return cached.clone();
        }
        let result = follow_chain(self.snapshot, start, self.max_depth);
        self.cache.insert(start.to_string(), result.clone());
        result
    }

    /// Number of memoized starting paths.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

fn follow_chain(snapshot: &Snapshot, start: &str, max_depth: usize) -> Resolution {
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = start.to_string();
    let mut depth = 0;

    while depth < max_depth {
        if !visited.insert(current.clone()) {
            return Resolution::terminal(current, ResolutionStatus::Cycle);
        }
        depth += 1;

        let Some(link) = snapshot.symlinks.get(&current) else {
            return match snapshot.file_hash(strip_leading(&current)) {
                Some(hash) => {
                    let hash = hash.to_string();
                    Resolution::file(current, hash)
                }
                None => Resolution::terminal(current, ResolutionStatus::Missing),
            };
        };

        let target = match link.target.as_deref() {
            Some(target) if !target.is_empty() => target,
            _ => return Resolution::terminal(current, ResolutionStatus::Broken),
        };

        current = if target.starts_with('/') {
            strip_leading(target).to_string()
        } else {
            lexical_join(parent_dir(&current), target)
        };
    }

    Resolution::terminal(current, ResolutionStatus::MaxDepth)
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
