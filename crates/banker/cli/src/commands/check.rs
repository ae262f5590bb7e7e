//! Evaluate a snapshot file

use std::path::PathBuf;
use std::process::ExitCode;

use banker_core::{ResourceState, SafetyEvaluator, SafetyReport};
use clap::Args;
use serde::Serialize;

use crate::config::BankerConfig;
use crate::error::CliResult;
use crate::output::{print_report, print_single, print_state, OutputFormat};
use crate::snapshot;

/// Exit code for an UNSAFE verdict or a denied request
pub const EXIT_UNSAFE: u8 = 2;

/// Arguments for `banker check`
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Snapshot file (.json, .yaml, .yml or .toml)
    pub snapshot: PathBuf,
}

#[derive(Serialize)]
struct CheckOutput<'a> {
    state: &'a ResourceState,
    report: &'a SafetyReport,
}

/// Execute `banker check`
pub fn execute(
    args: CheckArgs,
    config: &BankerConfig,
    format: OutputFormat,
) -> CliResult<ExitCode> {
    let snapshot = snapshot::load(&args.snapshot)?;
    let state = ResourceState::try_from(snapshot)?;
    report(&state, config, format)
}

/// Evaluate `state` and print the result; shared with `generate --check`.
pub fn report(
    state: &ResourceState,
    config: &BankerConfig,
    format: OutputFormat,
) -> CliResult<ExitCode> {
    let evaluator = SafetyEvaluator::new(config.evaluator.clone());
    let report = evaluator.evaluate(state);

    match format {
        OutputFormat::Table => {
            print_state(state);
            println!();
            print_report(&report);
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            print_single(
                &CheckOutput {
                    state,
                    report: &report,
                },
                format,
            )?;
        }
    }

    Ok(verdict_exit_code(&report))
}

pub fn verdict_exit_code(report: &SafetyReport) -> ExitCode {
    if report.is_safe() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNSAFE)
    }
}
