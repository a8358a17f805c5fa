use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Instant;

mod cli;
mod config;
mod exclusions;
mod index;
mod mapping;
mod matcher;
mod normalize;
mod report;
mod resolve;
mod snapshot;
mod store_diff;
mod structure;
mod util;

use cli::{Command, RootArgs, StoreArgs, SymlinksArgs};
use exclusions::ExclusionList;
use snapshot::Snapshot;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Symlinks(args) => cmd_symlinks(args),
        Command::Store(args) => cmd_store(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_exclusions(path: Option<&Path>) -> Result<ExclusionList> {
    let Some(path) = path else {
        return Ok(ExclusionList::default());
    };
    let list = ExclusionList::load(path)?;
    tracing::info!(
        patterns = list.len(),
        path = %path.display(),
        "loaded exclusion patterns"
    );
    Ok(list)
}

fn load_pair(
    state1: &Path,
    state2: &Path,
    exclusions: &ExclusionList,
) -> Result<(Snapshot, Snapshot)> {
    let start = Instant::now();
    let first = exclusions.apply(Snapshot::load(state1)?);
    let second = exclusions.apply(Snapshot::load(state2)?);
    tracing::info!(
        elapsed_ms = start.elapsed().as_millis(),
        symlinks_state1 = first.symlinks.len(),
        symlinks_state2 = second.symlinks.len(),
        "snapshots loaded"
    );
    Ok((first, second))
}

fn cmd_symlinks(args: SymlinksArgs) -> Result<()> {
    let start = Instant::now();
    let config =
        config::resolve_config(args.config.as_deref(), args.max_depth, args.batch_size)?;
    let exclusions = load_exclusions(args.exclude.as_deref())?;
    let (state1, state2) = load_pair(&args.state1, &args.state2, &exclusions)?;

    let structure = structure::analyze_structure(&state1, &state2);
    structure::log_sample(&state1, config.structure_sample_size, config.max_depth);

    let results = matcher::find_equivalent_symlinks(
        &state1,
        &state2,
        config.max_depth,
        config.batch_size,
    );
    let mappings = mapping::analyze_store_paths(&results.observations);

    let state1_label = args.state1.display().to_string();
    let state2_label = args.state2.display().to_string();
    let report = report::build_report(report::ReportInputs {
        state1_path: &state1_label,
        state2_path: &state2_label,
        elapsed_ms: start.elapsed().as_millis(),
        generated_at_epoch_ms: util::epoch_ms(),
        config: &config,
        structure,
        results: &results,
        mappings,
    });

    for line in report::summary_lines(&report.summary) {
        println!("{line}");
    }
    if let Some(out) = &args.out {
        util::write_json_atomic(out, &report)?;
        println!("Wrote report to {}", out.display());
    }
    tracing::info!(elapsed_ms = start.elapsed().as_millis(), "analysis complete");
    Ok(())
}

fn cmd_store(args: StoreArgs) -> Result<()> {
    let exclusions = load_exclusions(args.exclude.as_deref())?;
    let (state1, state2) = load_pair(&args.state1, &args.state2, &exclusions)?;

    let index1 = store_diff::build_store_index(&state1);
    let index2 = store_diff::build_store_index(&state2);
    let diff = store_diff::compare_store(&index1, &index2);

    println!("Identical content: {}", diff.identical.len());
    println!("Different content: {}", diff.differing.len());
    println!("Only in state 1: {}", diff.only_in_state1.len());
    println!("Only in state 2: {}", diff.only_in_state2.len());
    if let Some(out) = &args.out {
        util::write_json_atomic(out, &diff)?;
        println!("Wrote store diff to {}", out.display());
    }
    Ok(())
}
