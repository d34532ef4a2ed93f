//! Banker CLI - operator interface for the deadlock-avoiding resource ledger
//!
//! Each invocation builds a fresh ledger from a configuration file and then:
//! - shows totals, availability and the claim / allocation / need matrices
//! - reports whether the state is safe, with a safe sequence or blocked set
//! - evaluates a single request or release against it
//! - replays a scenario of requests and releases against one ledger

use banker_core::Units;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;
mod scenario;

use commands::{inspect, mutate, run as replay};
pub use error::{CliError, CliResult};
pub use output::OutputFormat;
pub use scenario::{ScenarioFile, Step};

/// Banker CLI application
#[derive(Parser)]
#[command(name = "banker")]
#[command(about = "Banker's Algorithm resource ledger", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Show totals, availability and the per-process matrices
    Show {
        /// Ledger configuration (.toml, .yaml, .json)
        config: PathBuf,
    },

    /// Report whether the configured state is safe
    Check {
        /// Ledger configuration (.toml, .yaml, .json)
        config: PathBuf,
    },

    /// Evaluate a resource request against the configured state
    Request {
        /// Ledger configuration (.toml, .yaml, .json)
        config: PathBuf,
        /// Requesting process index
        #[arg(short, long)]
        process: usize,
        /// Units per resource, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        units: Vec<Units>,
    },

    /// Evaluate a resource release against the configured state
    Release {
        /// Ledger configuration (.toml, .yaml, .json)
        config: PathBuf,
        /// Releasing process index
        #[arg(short, long)]
        process: usize,
        /// Units per resource, comma separated
        #[arg(short, long, value_delimiter = ',', required = true)]
        units: Vec<Units>,
    },

    /// Replay a scenario of requests and releases against one ledger
    Run {
        /// Scenario file: ledger configuration plus `steps`
        scenario: PathBuf,
    },
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Logs go to stderr so stdout stays parseable
    let filter = if cli.verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .try_init();

    match cli.command {
        Commands::Show { config } => inspect::show(&config, cli.output),
        Commands::Check { config } => inspect::check(&config, cli.output),
        Commands::Request {
            config,
            process,
            units,
        } => mutate::request(&config, process, &units, cli.output),
        Commands::Release {
            config,
            process,
            units,
        } => mutate::release(&config, process, &units, cli.output),
        Commands::Run { scenario } => replay::execute(&scenario, cli.output),
    }
}
