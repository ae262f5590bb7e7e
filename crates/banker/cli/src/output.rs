//! Output formatting for CLI

use banker_core::{ProcessId, ResourceState, SafetyReport, ScanStep, StepOutcome, Verdict};
use clap::ValueEnum;
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::error::CliResult;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a single item as JSON or YAML.
///
/// Table format falls back to pretty JSON.
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Table | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// One row of the state table
#[derive(Debug, Serialize, Tabled)]
struct ProcessRow {
    /// Process id
    process: String,
    /// Declared maximum
    max: String,
    /// Currently held
    allocation: String,
    /// Still needed
    need: String,
}

/// One row of the scan trace
#[derive(Debug, Serialize, Tabled)]
struct StepRow {
    step: usize,
    process: String,
    outcome: String,
    detail: String,
}

pub fn format_vector(values: &[u64]) -> String {
    let items: Vec<String> = values.iter().map(u64::to_string).collect();
    format!("[{}]", items.join(", "))
}

pub fn format_sequence(sequence: &[ProcessId]) -> String {
    if sequence.is_empty() {
        return "(none)".to_string();
    }
    sequence
        .iter()
        .map(ProcessId::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Print Available and the per-process matrices.
pub fn print_state(state: &ResourceState) {
    println!("{} {}", "Available:".bold(), format_vector(state.available()));
    println!("{} {}", "Total:".bold(), format_vector(state.total()));

    let rows: Vec<ProcessRow> = state
        .processes()
        .map(|pid| {
            let i = pid.index();
            ProcessRow {
                process: pid.to_string(),
                max: format_vector(&state.max()[i]),
                allocation: format_vector(&state.allocation()[i]),
                need: format_vector(&state.need()[i]),
            }
        })
        .collect();

    if rows.is_empty() {
        println!("{}", "No processes".dimmed());
    } else {
        println!("{}", Table::new(rows));
    }
}

pub fn print_trace(trace: &[ScanStep]) {
    let rows: Vec<StepRow> = trace
        .iter()
        .enumerate()
        .map(|(step, s)| match &s.outcome {
            StepOutcome::Finished { available_after } => StepRow {
                step: step + 1,
                process: s.process.to_string(),
                outcome: "finished".to_string(),
                detail: format!("available now {}", format_vector(available_after)),
            },
            StepOutcome::Blocked { deficit } => StepRow {
                step: step + 1,
                process: s.process.to_string(),
                outcome: "blocked".to_string(),
                detail: format!("{} short by {}", deficit.resource, deficit.shortfall()),
            },
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", Table::new(rows));
    }
}

/// Print a safety report in table form.
pub fn print_report(report: &SafetyReport) {
    print_trace(&report.trace);

    match report.verdict {
        Verdict::Safe => {
            print_success(&format!("{}", "SAFE".bold()));
            println!("  Safe sequence: {}", format_sequence(&report.sequence));
        }
        Verdict::Unsafe => {
            println!("{} {}", "✗".red(), "UNSAFE".bold().red());
            println!("  Finished before stall: {}", format_sequence(&report.sequence));
            println!("  Blocked: {}", format_sequence(&report.blocked));
        }
    }
    println!("  {}", format!("{} checks", report.checks).dimmed());
}
