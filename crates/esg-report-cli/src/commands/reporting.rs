use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::fs;
use std::time::Instant;

use esg_report_core::comparison::{compare_labeled, PriorFigure};
use esg_report_core::reporting::{self, ReportInput};
use esg_report_core::{with_metadata, EngineConfig};

use crate::input;

/// Arguments for a period-over-period comparison
#[derive(Args)]
pub struct CompareArgs {
    /// Current-period figure
    #[arg(long)]
    pub current: Decimal,

    /// Prior-period figure
    #[arg(long)]
    pub prior: Decimal,

    /// Mark the prior figure as an estimate rather than measured data
    #[arg(long)]
    pub estimated: bool,
}

/// Arguments for report assembly
#[derive(Args)]
pub struct ReportArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the report title
    #[arg(long)]
    pub title: Option<String>,

    /// Leave the narrative paragraph out of the payload
    #[arg(long)]
    pub no_narrative: bool,

    /// Also write the report table as CSV to this path
    #[arg(long)]
    pub export_csv: Option<String>,
}

pub fn run_compare(args: CompareArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let prior = if args.estimated {
        PriorFigure::estimated(args.prior)
    } else {
        PriorFigure::measured(args.prior)
    };
    let comparison = compare_labeled(args.current, &prior);
    let mut warnings = Vec::new();
    if args.estimated {
        warnings.push("Prior figure is an estimate, not measured data.".to_string());
    }
    if args.prior.is_zero() {
        warnings.push("Prior figure is zero; percent change reported as 0.".to_string());
    }
    let output = with_metadata(
        "Period-over-period comparison",
        &json!({ "percent_change": "|current - prior| / |prior| × 100" }),
        warnings,
        start.elapsed().as_micros() as u64,
        comparison,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_report(
    args: ReportArgs,
    config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut report_input: ReportInput =
        input::read_input(args.input.as_deref(), "report assembly")?;
    if let Some(title) = args.title {
        report_input.title = title;
    }
    if args.no_narrative {
        report_input.include_narrative = false;
    }
    if let Some(config) = config {
        report_input.config = config;
    }
    let result = reporting::build_report(&report_input)?;

    if let Some(ref path) = args.export_csv {
        let csv = reporting::export_table(&result.result).to_csv()?;
        fs::write(path, csv).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
        tracing::info!(path = %path, rows = result.result.rows.len(), "wrote report CSV");
    }

    Ok(serde_json::to_value(result)?)
}
