//! Comparison report assembly.
//!
//! Pure aggregation over matcher and mapping results. Example lists are
//! truncated to the configured limits; counts always cover every match.
use crate::config::AnalysisConfig;
use crate::mapping::MappingAnalysis;
use crate::matcher::{Classification, Match, MatchResults};
use crate::structure::StoreRootCounts;
use crate::util::{bounded, percentage};
use serde::Serialize;
use std::collections::BTreeMap;

/// Current schema version for symlink comparison reports.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub schema_version: u32,
    pub summary: Summary,
    pub limits: ExampleLimits,
    pub symlink_structure: StoreRootCounts,
    pub symlink_analysis: SymlinkAnalysis,
    pub store_path_analysis: PackageMappings,
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub state1_path: String,
    pub state2_path: String,
    pub generated_at_epoch_ms: u128,
    pub elapsed_ms: u128,
    pub total_symlinks_state1: usize,
    pub total_symlinks_state2: usize,
    pub matching_paths: usize,
    pub matched_percentage: f64,
    pub unmatched: usize,
    pub different_targets: usize,
    pub identical_final_content: usize,
    pub identical_percentage: f64,
    pub different_final_content: usize,
    pub broken_links: BrokenLinkCounts,
    pub store_path_analysis: MappingCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct BrokenLinkCounts {
    pub in_both_states: usize,
    pub only_in_state1: usize,
    pub only_in_state2: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingCounts {
    pub total_mapped_paths: usize,
    pub unique_packages: usize,
    pub consistent_mappings: usize,
    pub inconsistent_mappings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleLimits {
    pub symlink_examples: usize,
    pub broken_examples: usize,
    pub unmatched_examples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymlinkAnalysis {
    pub identical_final_content: Vec<Match>,
    pub different_final_content: Vec<Match>,
    pub different_targets: Vec<Match>,
    pub broken_in_both: Vec<Match>,
    pub broken_only_in_state1: Vec<Match>,
    pub broken_only_in_state2: Vec<Match>,
    pub unmatched: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageMappings {
    pub consistent_package_mappings: BTreeMap<String, String>,
    pub inconsistent_package_mappings: BTreeMap<String, Vec<String>>,
}

/// Everything the report is assembled from.
pub struct ReportInputs<'a> {
    pub state1_path: &'a str,
    pub state2_path: &'a str,
    pub elapsed_ms: u128,
    pub generated_at_epoch_ms: u128,
    pub config: &'a AnalysisConfig,
    pub structure: StoreRootCounts,
    pub results: &'a MatchResults,
    pub mappings: MappingAnalysis,
}

pub fn build_report(inputs: ReportInputs<'_>) -> ComparisonReport {
    let results = inputs.results;
    let config = inputs.config;
    let matched = results.matches.len();
    let identical = results.count(Classification::IdenticalFinalContent);

    let summary = Summary {
        state1_path: inputs.state1_path.to_string(),
        state2_path: inputs.state2_path.to_string(),
        generated_at_epoch_ms: inputs.generated_at_epoch_ms,
        elapsed_ms: inputs.elapsed_ms,
        total_symlinks_state1: results.total_symlinks_state1,
        total_symlinks_state2: results.total_symlinks_state2,
        matching_paths: matched,
        matched_percentage: percentage(matched, results.total_symlinks_state1),
        unmatched: results.unmatched.len(),
        different_targets: results.with_different_targets().count(),
        identical_final_content: identical,
        identical_percentage: percentage(identical, matched),
        different_final_content: results.count(Classification::DifferentFinalContent),
        broken_links: BrokenLinkCounts {
            in_both_states: results.count(Classification::BrokenInBoth),
            only_in_state1: results.count(Classification::BrokenOnlyInState1),
            only_in_state2: results.count(Classification::BrokenOnlyInState2),
        },
        store_path_analysis: MappingCounts {
            total_mapped_paths: inputs.mappings.total_mapped_paths,
            unique_packages: inputs.mappings.unique_packages,
            consistent_mappings: inputs.mappings.consistent_mappings,
            inconsistent_mappings: inputs.mappings.inconsistent_mappings,
        },
    };

    let symlink_limit = config.symlink_example_limit;
    let broken_limit = config.broken_example_limit;
    let symlink_analysis = SymlinkAnalysis {
        identical_final_content: bounded(
            results.bucket(Classification::IdenticalFinalContent),
            symlink_limit,
        ),
        different_final_content: bounded(
            results.bucket(Classification::DifferentFinalContent),
            symlink_limit,
        ),
        different_targets: bounded(results.with_different_targets(), symlink_limit),
        broken_in_both: bounded(results.bucket(Classification::BrokenInBoth), broken_limit),
        broken_only_in_state1: bounded(
            results.bucket(Classification::BrokenOnlyInState1),
            broken_limit,
        ),
        broken_only_in_state2: bounded(
            results.bucket(Classification::BrokenOnlyInState2),
            broken_limit,
        ),
        unmatched: bounded(results.unmatched.iter(), config.unmatched_example_limit),
    };

    ComparisonReport {
        schema_version: REPORT_SCHEMA_VERSION,
        summary,
        limits: ExampleLimits {
            symlink_examples: symlink_limit,
            broken_examples: broken_limit,
            unmatched_examples: config.unmatched_example_limit,
        },
        symlink_structure: inputs.structure,
        symlink_analysis,
        store_path_analysis: PackageMappings {
            consistent_package_mappings: inputs.mappings.consistent_package_mappings,
            inconsistent_package_mappings: inputs.mappings.inconsistent_package_mappings,
        },
    }
}

/// Human-readable summary lines for stdout.
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    vec![
        format!(
            "Symlinks: {} in state1, {} in state2",
            summary.total_symlinks_state1, summary.total_symlinks_state2
        ),
        format!(
            "Matched paths: {} ({}%), unmatched: {}",
            summary.matching_paths, summary.matched_percentage, summary.unmatched
        ),
        format!(
            "Identical final content: {} ({}%)",
            summary.identical_final_content, summary.identical_percentage
        ),
        format!(
            "Different final content: {}",
            summary.different_final_content
        ),
        format!("Different direct targets: {}", summary.different_targets),
        format!(
            "Broken links: {} in both, {} only in state1, {} only in state2",
            summary.broken_links.in_both_states,
            summary.broken_links.only_in_state1,
            summary.broken_links.only_in_state2
        ),
        format!(
            "Store path mappings: {} paths, {} packages, {} consistent, {} inconsistent",
            summary.store_path_analysis.total_mapped_paths,
            summary.store_path_analysis.unique_packages,
            summary.store_path_analysis.consistent_mappings,
            summary.store_path_analysis.inconsistent_mappings
        ),
    ]
}
