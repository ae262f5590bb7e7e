//! Apply one resource request to a snapshot

use std::path::PathBuf;
use std::process::ExitCode;

use banker_core::{Banker, ProcessId, RequestOutcome, ResourceState, SafetyEvaluator};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::config::BankerConfig;
use crate::error::CliResult;
use crate::output::{
    format_sequence, print_single, print_state, print_success, print_warning, OutputFormat,
};
use crate::snapshot;

use super::check::EXIT_UNSAFE;

/// Arguments for `banker request`
#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Snapshot file (.json, .yaml, .yml or .toml)
    pub snapshot: PathBuf,

    /// Requesting process id
    #[arg(short, long)]
    pub process: usize,

    /// Requested instances per resource type, comma separated
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    pub vector: Vec<i64>,

    /// Write the resulting snapshot to this file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(Serialize)]
struct RequestOutput<'a> {
    process: ProcessId,
    request: &'a [i64],
    #[serde(flatten)]
    outcome: &'a RequestOutcome,
    state: &'a ResourceState,
}

/// Execute `banker request`
pub fn execute(
    args: RequestArgs,
    config: &BankerConfig,
    format: OutputFormat,
) -> CliResult<ExitCode> {
    let state = ResourceState::try_from(snapshot::load(&args.snapshot)?)?;
    let mut banker =
        Banker::with_evaluator(state, SafetyEvaluator::new(config.evaluator.clone()));

    let pid = ProcessId(args.process);
    let outcome = banker.request(pid, &args.vector)?;

    if let Some(path) = &args.save {
        snapshot::save(path, &banker.state().to_snapshot())?;
    }

    match format {
        OutputFormat::Table => {
            match &outcome {
                RequestOutcome::Granted { sequence } => {
                    print_success(&format!("Request by {} {}", pid, "granted".green()));
                    println!("  Safe sequence: {}", format_sequence(sequence));
                }
                RequestOutcome::Denied(denial) => {
                    print_warning(&format!("Request by {} {}: {}", pid, "denied".red(), denial));
                }
            }
            println!();
            print_state(banker.state());
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            print_single(
                &RequestOutput {
                    process: pid,
                    request: &args.vector,
                    outcome: &outcome,
                    state: banker.state(),
                },
                format,
            )?;
        }
    }

    Ok(if outcome.is_granted() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNSAFE)
    })
}
