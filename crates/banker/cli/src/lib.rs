//! Banker CLI - Command-line interface for Banker's Algorithm
//!
//! This CLI lets operators and developers:
//! - Check whether a resource snapshot is safe and print a safe sequence
//! - Arbitrate a single resource request against a snapshot
//! - Generate random valid snapshots for experiments

use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;
mod snapshot;

use commands::{check, generate, request, ScanOrderArg};
pub use config::{BankerConfig, LoggingConfig};
pub use error::{CliError, CliResult};
pub use output::print_error;

/// Banker CLI application
#[derive(Parser)]
#[command(name = "banker")]
#[command(about = "Banker's Algorithm - deadlock avoidance safety checks", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "BANKER_CONFIG", global = true)]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: output::OutputFormat,

    /// Record and print every scan step
    #[arg(long, global = true)]
    trace: bool,

    /// Override the initial scan order
    #[arg(long, global = true)]
    scan_order: Option<ScanOrderArg>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Evaluate a snapshot and report SAFE or UNSAFE
    Check(check::CheckArgs),

    /// Grant or deny one resource request
    Request(request::RequestArgs),

    /// Generate a random valid snapshot
    #[command(alias = "gen")]
    Generate(generate::GenerateArgs),

    /// Show the effective configuration
    Config,
}

/// Run using the current process arguments.
pub fn run() -> CliResult<ExitCode> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
///
/// Exit codes: 0 for SAFE or granted, 2 for UNSAFE or denied.
pub fn run_with_args<I, T>(args: I) -> CliResult<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    let mut config = BankerConfig::load(cli.config.as_deref())?;
    if cli.trace {
        config.evaluator.record_trace = true;
    }
    if let Some(order) = cli.scan_order {
        config.evaluator.scan_order = order.into();
    }

    init_tracing(&config.logging, cli.verbose);
    tracing::debug!(?config, "Configuration loaded");

    match cli.command {
        Commands::Check(args) => check::execute(args, &config, cli.output),
        Commands::Request(args) => request::execute(args, &config, cli.output),
        Commands::Generate(args) => generate::execute(args, &config, cli.output),
        Commands::Config => {
            output::print_single(&config, cli.output)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so that JSON/YAML on stdout stays parseable.
fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // A subscriber may already be installed when running in-process.
    if logging.json {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init();
    }
}
