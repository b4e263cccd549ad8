mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::dates::NormalizeDateArgs;
use commands::emissions::{AggregateArgs, MonthlyArgs, ScopeArgs, YoyArgs};
use commands::reporting::{CompareArgs, ReportArgs};
use commands::workforce::WorkforceArgs;

/// ESG emissions and workforce reporting
#[derive(Parser)]
#[command(
    name = "esgr",
    version,
    about = "ESG emissions and workforce reporting",
    long_about = "A CLI for aggregating activity-based emissions and workforce records \
                  with decimal precision. Supports category/subtype/location/month \
                  aggregation, monthly location views, year-over-year and scope \
                  summaries, workforce turnover statistics and report payloads."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (YAML or JSON); replaces the input's config
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate activity records by category, subtype, location or month
    Aggregate(AggregateArgs),
    /// Month-by-month emissions per location
    Monthly(MonthlyArgs),
    /// Year-over-year comparison by category
    Yoy(YoyArgs),
    /// Emissions split by GHG scope
    Scopes(ScopeArgs),
    /// Workforce headcount, turnover and composition
    Workforce(WorkforceArgs),
    /// Compare a current figure against a prior one
    Compare(CompareArgs),
    /// Assemble a report payload, optionally exporting the table as CSV
    Report(ReportArgs),
    /// Normalise a date value to ISO form and serial number
    NormalizeDate(NormalizeDateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("{}: {}", "warning".yellow().bold(), e);
    }

    let result = match cli.command {
        Commands::Version => {
            println!("esgr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
        command => run(command, cli.config.as_deref()),
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn run(
    command: Commands,
    config_path: Option<&str>,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let config = config_path.map(input::config::read_config).transpose()?;

    match command {
        Commands::Aggregate(args) => commands::emissions::run_aggregate(args, config),
        Commands::Monthly(args) => commands::emissions::run_monthly(args, config),
        Commands::Yoy(args) => commands::emissions::run_yoy(args, config),
        Commands::Scopes(args) => commands::emissions::run_scopes(args),
        Commands::Workforce(args) => commands::workforce::run_workforce(args, config),
        Commands::Compare(args) => commands::reporting::run_compare(args),
        Commands::Report(args) => commands::reporting::run_report(args, config),
        Commands::NormalizeDate(args) => commands::dates::run_normalize_date(args),
        Commands::Version => Ok(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") })),
    }
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ESGR_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {e}"))?;

    Ok(())
}
