use clap::Args;
use serde_json::Value;

use esg_report_core::workforce::{self, WorkforceInput};
use esg_report_core::EngineConfig;

use crate::input;

/// Arguments for workforce statistics
#[derive(Args)]
pub struct WorkforceArgs {
    /// Path to JSON input file
    #[arg(long, conflicts_with = "csv")]
    pub input: Option<String>,

    /// Employee roster as CSV with a header row
    #[arg(long)]
    pub csv: Option<String>,

    /// Reference year; required with --csv
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run_workforce(
    args: WorkforceArgs,
    config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut wf_input: WorkforceInput = if let Some(ref path) = args.csv {
        let reference_year = args
            .year
            .ok_or("--year is required when reading employees from --csv")?;
        WorkforceInput {
            employees: input::csv_in::read_employees(path)?,
            reference_year,
            config: EngineConfig::default(),
        }
    } else {
        input::read_input(args.input.as_deref(), "workforce statistics")?
    };
    if let Some(year) = args.year {
        wf_input.reference_year = year;
    }
    if let Some(config) = config {
        wf_input.config = config;
    }
    let result = workforce::compute_stats(&wf_input)?;
    Ok(serde_json::to_value(result)?)
}
