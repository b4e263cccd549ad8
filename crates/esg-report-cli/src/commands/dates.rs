use clap::Args;
use serde_json::{json, Value};
use std::time::Instant;

use esg_report_core::dates::{self, DateValue};
use esg_report_core::{with_metadata, EsgReportError};

/// Arguments for date normalisation
#[derive(Args)]
pub struct NormalizeDateArgs {
    /// Date as ISO text, MM/DD/YYYY or a spreadsheet serial number
    pub value: String,
}

pub fn run_normalize_date(args: NormalizeDateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let date = dates::normalize(&DateValue::Text(args.value.clone()))
        .map_err(EsgReportError::from)?;
    let result = json!({
        "input": args.value,
        "iso": dates::to_iso(date),
        "serial": dates::to_serial(date),
    });
    let output = with_metadata(
        "Date normalisation",
        &json!({
            "order": ["ISO 8601", "spreadsheet serial", "MM/DD/YYYY"],
            "serial_epoch": "1899-12-30",
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
