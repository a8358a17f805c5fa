//! CLI argument parsing.
//!
//! The CLI only loads inputs and writes outputs; analysis lives in the engine
//! modules so it can be driven from tests directly.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "store-equiv",
    version,
    about = "Compare two captured filesystem snapshots modulo store-path hashes",
    after_help = "Examples:\n  store-equiv symlinks state1.json state2.json --out report.json\n  store-equiv symlinks state1.json state2.json --exclude exclusions.txt --max-depth 40\n  store-equiv store state1.json state2.json --out store-diff.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Symlinks(SymlinksArgs),
    Store(StoreArgs),
}

/// Symlink equivalence analysis inputs.
#[derive(Parser, Debug)]
#[command(about = "Match symlinks across snapshots and compare their resolved content")]
pub struct SymlinksArgs {
    /// First snapshot JSON
    #[arg(value_name = "STATE1")]
    pub state1: PathBuf,

    /// Second snapshot JSON
    #[arg(value_name = "STATE2")]
    pub state2: PathBuf,

    /// Output path for the JSON report
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Exclusion patterns, one path prefix per line
    #[arg(long, value_name = "PATH")]
    pub exclude: Option<PathBuf>,

    /// Analysis config JSON
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Maximum symlink hops followed per chain
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Symlinks classified per progress batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

/// Store content comparison inputs.
#[derive(Parser, Debug)]
#[command(about = "Compare regular files inside the store by normalized path")]
pub struct StoreArgs {
    /// First snapshot JSON
    #[arg(value_name = "STATE1")]
    pub state1: PathBuf,

    /// Second snapshot JSON
    #[arg(value_name = "STATE2")]
    pub state2: PathBuf,

    /// Output path for the JSON diff
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Exclusion patterns, one path prefix per line
    #[arg(long, value_name = "PATH")]
    pub exclude: Option<PathBuf>,
}
