//! Analysis tunables.
//!
//! Defaults live here; an optional JSON file may override any subset, and CLI
//! flags override the file.
use crate::resolve::DEFAULT_MAX_DEPTH;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Current schema version for analysis config files.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_BATCH_SIZE: usize = 5000;
pub const DEFAULT_SYMLINK_EXAMPLE_LIMIT: usize = 100;
pub const DEFAULT_BROKEN_EXAMPLE_LIMIT: usize = 50;
pub const DEFAULT_UNMATCHED_EXAMPLE_LIMIT: usize = 50;
pub const DEFAULT_STRUCTURE_SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub schema_version: u32,
    /// Hops followed before a chain is reported as `max_depth`.
    pub max_depth: usize,
    /// Symlinks classified per progress batch.
    pub batch_size: usize,
    /// Examples kept for the content buckets and `different_targets`.
    pub symlink_example_limit: usize,
    /// Examples kept for each broken-link bucket.
    pub broken_example_limit: usize,
    pub unmatched_example_limit: usize,
    /// Symlinks sampled into the debug log by the structure census.
    pub structure_sample_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            max_depth: DEFAULT_MAX_DEPTH,
            batch_size: DEFAULT_BATCH_SIZE,
            symlink_example_limit: DEFAULT_SYMLINK_EXAMPLE_LIMIT,
            broken_example_limit: DEFAULT_BROKEN_EXAMPLE_LIMIT,
            unmatched_example_limit: DEFAULT_UNMATCHED_EXAMPLE_LIMIT,
            structure_sample_size: DEFAULT_STRUCTURE_SAMPLE_SIZE,
        }
    }
}

/// Load a config file; omitted fields keep their defaults.
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: AnalysisConfig =
        serde_json::from_slice(&bytes).context("parse analysis config JSON")?;
    Ok(config)
}

/// Resolve the effective config from an optional file plus CLI overrides.
pub fn resolve_config(
    path: Option<&Path>,
    max_depth: Option<usize>,
    batch_size: Option<usize>,
) -> Result<AnalysisConfig> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(max_depth) = max_depth {
        config.max_depth = max_depth;
    }
    if let Some(batch_size) = batch_size {
        config.batch_size = batch_size;
    }
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &AnalysisConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported analysis config schema_version {}",
            config.schema_version
        ));
    }
    if config.max_depth == 0 {
        return Err(anyhow!("max_depth must be at least 1"));
    }
    if config.batch_size == 0 {
        return Err(anyhow!("batch_size must be at least 1"));
    }
    Ok(())
}
