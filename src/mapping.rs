//! Package-name mappings implied by matched store paths.
//!
//! Each matched pair whose paths carry store segments yields one observation.
//! A source package is consistent when every observation maps it to the same
//! counterpart name.
use crate::normalize::store_segment;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// A pair of store paths seen on the two sides of one match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreObservation {
    pub source_store_path: String,
    pub target_store_path: String,
}

impl StoreObservation {
    /// Pair the store segments of `source` and `target`, if both carry one.
    pub fn from_paths(source: &str, target: &str) -> Option<Self> {
        let source = store_segment(source)?;
        let target = store_segment(target)?;
        Some(Self {
            source_store_path: source.store_path.to_string(),
            target_store_path: target.store_path.to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MappingAnalysis {
    /// Source package name to its single counterpart.
    pub consistent_package_mappings: BTreeMap<String, String>,
    /// Source package name to every counterpart seen, sorted.
    pub inconsistent_package_mappings: BTreeMap<String, Vec<String>>,
    pub total_mapped_paths: usize,
    pub unique_packages: usize,
    pub consistent_mappings: usize,
    pub inconsistent_mappings: usize,
}

/// Aggregate `(source package, target package)` pairs into mapping verdicts.
pub fn analyze_packages<I, S, T>(pairs: I) -> BTreeMap<String, BTreeSet<String>>
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: Into<String>,
{
    let mut packages: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (source, target) in pairs {
        packages
            .entry(source.into())
            .or_default()
            .insert(target.into());
    }
    packages
}

/// Split aggregated package sets into consistent and inconsistent tables.
pub fn classify_packages(
    packages: BTreeMap<String, BTreeSet<String>>,
    total_mapped_paths: usize,
) -> MappingAnalysis {
    let mut analysis = MappingAnalysis {
        total_mapped_paths,
        unique_packages: packages.len(),
        ..MappingAnalysis::default()
    };
    for (source, targets) in packages {
        if targets.len() == 1 {
            if let Some(target) = targets.into_iter().next() {
                analysis.consistent_package_mappings.insert(source, target);
            }
        } else {
            analysis
                .inconsistent_package_mappings
                .insert(source, targets.into_iter().collect());
        }
    }
    analysis.consistent_mappings = analysis.consistent_package_mappings.len();
    analysis.inconsistent_mappings = analysis.inconsistent_package_mappings.len();
    analysis
}

/// Analyze store-path observations collected by the matcher.
///
/// `total_mapped_paths` counts distinct source store paths.
pub fn analyze_store_paths(observations: &[StoreObservation]) -> MappingAnalysis {
    let source_paths: BTreeSet<&str> = observations
        .iter()
        .map(|obs| obs.source_store_path.as_str())
        .collect();
    let pairs = observations.iter().filter_map(|obs| {
        let source = store_segment(&obs.source_store_path)?;
        let target = store_segment(&obs.target_store_path)?;
        Some((source.package, target.package))
    });
    classify_packages(analyze_packages(pairs), source_paths.len())
}
