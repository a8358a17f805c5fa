//! Cross-snapshot symlink equivalence.
//!
//! Every symlink of the first snapshot is paired with a symlink of the second
//! that shares its normalized path, then both are resolved to terminal content
//! within their own snapshot and the pair is classified.
use crate::index::PathIndex;
use crate::mapping::StoreObservation;
use crate::normalize::normalize_path;
use crate::resolve::{ChainResolver, Resolution};
use crate::snapshot::Snapshot;
use serde::Serialize;
use std::time::Instant;

/// Verdict for one matched pair, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    BrokenInBoth,
    BrokenOnlyInState1,
    BrokenOnlyInState2,
    IdenticalFinalContent,
    DifferentFinalContent,
}

impl Classification {
    pub fn classify(state1: &Resolution, state2: &Resolution) -> Self {
        match (state1.broken, state2.broken) {
            (true, true) => Classification::BrokenInBoth,
            (true, false) => Classification::BrokenOnlyInState1,
            (false, true) => Classification::BrokenOnlyInState2,
            (false, false) if state1.final_hash == state2.final_hash => {
                Classification::IdenticalFinalContent
            }
            (false, false) => Classification::DifferentFinalContent,
        }
    }
}

/// One snapshot-1 symlink paired with its chosen snapshot-2 counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub state1_path: String,
    pub state2_path: String,
    pub state1_target: Option<String>,
    pub state2_target: Option<String>,
    /// Direct targets differ even after hash normalization.
    pub different_targets: bool,
    pub state1_resolution: Resolution,
    pub state2_resolution: Resolution,
    pub classification: Classification,
}

#[derive(Debug, Default)]
pub struct MatchResults {
    pub total_symlinks_state1: usize,
    pub total_symlinks_state2: usize,
    /// Matches in snapshot-1 path order.
    pub matches: Vec<Match>,
    /// Snapshot-1 symlinks with no counterpart.
    pub unmatched: Vec<String>,
    pub observations: Vec<StoreObservation>,
}

impl MatchResults {
    pub fn bucket(&self, classification: Classification) -> impl Iterator<Item = &Match> {
        self.matches
            .iter()
            .filter(move |m| m.classification == classification)
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.bucket(classification).count()
    }

    pub fn with_different_targets(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.different_targets)
    }
}

/// Matcher state for one analysis run.
///
/// Owns the snapshot-2 index and one resolver cache per snapshot.
pub struct EquivalenceMatcher<'a> {
    state1: &'a Snapshot,
    state2: &'a Snapshot,
    index2: PathIndex,
    resolver1: ChainResolver<'a>,
    resolver2: ChainResolver<'a>,
}

impl<'a> EquivalenceMatcher<'a> {
    pub fn new(state1: &'a Snapshot, state2: &'a Snapshot, max_depth: usize) -> Self {
        let start = Instant::now();
        let index2 = PathIndex::build(state2.all_paths());
        if index2.is_empty() {
            tracing::warn!("second snapshot has no files or symlinks");
        }
        tracing::debug!(
            keys = index2.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "built normalized path index"
        );
        Self {
            state1,
            state2,
            index2,
            resolver1: ChainResolver::new(state1, max_depth),
            resolver2: ChainResolver::new(state2, max_depth),
        }
    }

    /// First snapshot-2 symlink sharing the normalized form of `path1`.
    pub fn counterpart(&self, path1: &str) -> Option<&'a str> {
        let state2 = self.state2;
        self.index2
            .candidates(&normalize_path(path1))
            .iter()
            .find_map(|candidate| state2.symlinks.get_key_value(candidate.as_str()))
            .map(|(key, _)| key.as_str())
    }

    /// Pair and classify one snapshot-1 symlink.
    pub fn match_symlink(&mut self, path1: &str) -> Option<Match> {
        let path2 = self.counterpart(path1)?;
        let target1 = self.state1.symlink_target(path1);
        let target2 = self.state2.symlink_target(path2);
        let different_targets = normalize_path(target1.unwrap_or_default())
            != normalize_path(target2.unwrap_or_default());

        let state1_resolution = self.resolver1.resolve(path1);
        let state2_resolution = self.resolver2.resolve(path2);
        let classification = Classification::classify(&state1_resolution, &state2_resolution);

        Some(Match {
            state1_path: path1.to_string(),
            state2_path: path2.to_string(),
            state1_target: target1.map(str::to_string),
            state2_target: target2.map(str::to_string),
            different_targets,
            state1_resolution,
            state2_resolution,
            classification,
        })
    }

    /// Classify every snapshot-1 symlink, `batch_size` at a time.
    ///
    /// Batches only pace progress logging; results do not depend on them.
    pub fn run(mut self, batch_size: usize) -> MatchResults {
        let paths: Vec<&'a str> = self.state1.symlinks.keys().map(String::as_str).collect();
        let batch_size = batch_size.max(1);
        let total_batches = paths.len().div_ceil(batch_size);
        tracing::info!(symlinks = paths.len(), total_batches, "matching symlinks");

        let mut results = MatchResults {
            total_symlinks_state1: self.state1.symlinks.len(),
            total_symlinks_state2: self.state2.symlinks.len(),
            ..MatchResults::default()
        };
        let start = Instant::now();
        for (batch, chunk) in paths.chunks(batch_size).enumerate() {
            for path1 in chunk {
                match self.match_symlink(path1) {
                    Some(matched) => {
                        if let Some(observation) = store_observation(&matched) {
                            results.observations.push(observation);
                        }
                        results.matches.push(matched);
                    }
                    None => results.unmatched.push(path1.to_string()),
                }
            }
            tracing::info!(
                batch = batch + 1,
                total_batches,
                matched = results.matches.len(),
                elapsed_ms = start.elapsed().as_millis(),
                "batch complete"
            );
        }
        tracing::debug!(
            cached_state1 = self.resolver1.cached(),
            cached_state2 = self.resolver2.cached(),
            "resolver caches"
        );
        results
    }
}

// Prefer the link paths themselves; fall back to the raw targets when the
// links live outside the store.
fn store_observation(matched: &Match) -> Option<StoreObservation> {
    StoreObservation::from_paths(&matched.state1_path, &matched.state2_path).or_else(|| {
        StoreObservation::from_paths(
            matched.state1_target.as_deref()?,
            matched.state2_target.as_deref()?,
        )
    })
}

/// Convenience wrapper running a full match pass.
pub fn find_equivalent_symlinks(
    state1: &Snapshot,
    state2: &Snapshot,
    max_depth: usize,
    batch_size: usize,
) -> MatchResults {
    EquivalenceMatcher::new(state1, state2, max_depth).run(batch_size)
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
