//! Generate a random valid snapshot

use std::path::PathBuf;
use std::process::ExitCode;

use banker_core::{ResourceState, SnapshotGenerator};
use clap::Args;

use crate::config::BankerConfig;
use crate::error::CliResult;
use crate::output::{print_single, print_success, OutputFormat};
use crate::snapshot;

/// Arguments for `banker generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Number of processes (defaults to configuration)
    #[arg(short = 'n', long)]
    pub processes: Option<usize>,

    /// Number of resource types (defaults to configuration)
    #[arg(short = 'm', long)]
    pub resources: Option<usize>,

    /// Random seed for a reproducible snapshot
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write the snapshot to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Evaluate the generated snapshot as well
    #[arg(long)]
    pub check: bool,
}

/// Execute `banker generate`
pub fn execute(
    args: GenerateArgs,
    config: &BankerConfig,
    format: OutputFormat,
) -> CliResult<ExitCode> {
    let mut generator_config = config.generator.clone();
    if let Some(processes) = args.processes {
        generator_config.processes = processes;
    }
    if let Some(resources) = args.resources {
        generator_config.resources = resources;
    }
    if args.seed.is_some() {
        generator_config.seed = args.seed;
    }

    let snapshot = SnapshotGenerator::new(generator_config)?.generate();

    match &args.out {
        Some(path) => {
            snapshot::save(path, &snapshot)?;
            print_success(&format!("Snapshot written to {}", path.display()));
        }
        None if !args.check => print_single(&snapshot, format)?,
        None => {}
    }

    if args.check {
        let state = ResourceState::try_from(snapshot)?;
        return super::check::report(&state, config, format);
    }
    Ok(ExitCode::SUCCESS)
}
