use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::emissions::{AggregationOutput, PeriodAggregate};
use crate::error::EsgReportError;
use crate::EsgReportResult;

use super::assembler::ReportPayload;

/// Column headers of the tabular export.
pub const EXPORT_HEADER: [&str; 4] = ["Description", "Quantity", "EmissionFactor", "CO2Emitted"];

/// Decimal places for line items in text exports.
pub const LINE_ITEM_DP: u32 = 4;

/// Decimal places for dashboard headline totals.
pub const HEADLINE_DP: u32 = 2;

/// `{labels, values}` pair any charting library can consume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

/// Renderer-agnostic table: every cell is already formatted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabularExport {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Trailing `(label, value)` block
    pub summary: Vec<(String, String)>,
}

impl TabularExport {
    /// CSV text: header, line items, then the summary block as two-column
    /// records.
    pub fn to_csv(&self) -> EsgReportResult<String> {
        let mut wtr = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        for (label, value) in &self.summary {
            wtr.write_record([label.as_str(), value.as_str()])?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| EsgReportError::SerializationError(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| EsgReportError::SerializationError(e.to_string()))
    }
}

/// Round half away from zero and pad to exactly `dp` decimal places.
pub fn round_fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

pub fn format_fixed(value: Decimal, dp: u32) -> String {
    round_fixed(value, dp).to_string()
}

/// Table export of an assembled report.
pub fn export_table(payload: &ReportPayload) -> TabularExport {
    let rows = payload
        .rows
        .iter()
        .map(|r| {
            vec![
                r.description.clone(),
                format_fixed(r.quantity, LINE_ITEM_DP),
                format_fixed(r.factor, LINE_ITEM_DP),
                format_fixed(r.emissions, LINE_ITEM_DP),
            ]
        })
        .collect();
    let summary = vec![
        (
            "Total Quantity".to_string(),
            format_fixed(payload.summary.total_quantity, LINE_ITEM_DP),
        ),
        (
            "Total Active Sources".to_string(),
            payload.summary.total_active_sources.to_string(),
        ),
        (
            "Total Emissions".to_string(),
            format_fixed(payload.summary.total_emissions, LINE_ITEM_DP),
        ),
    ];
    TabularExport {
        header: EXPORT_HEADER.iter().map(|h| h.to_string()).collect(),
        rows,
        summary,
    }
}

/// Emissions per group, in the aggregation's order.
pub fn chart_series(aggregation: &AggregationOutput) -> ChartSeries {
    ChartSeries {
        labels: aggregation.groups.iter().map(|g| g.key.clone()).collect(),
        values: aggregation.groups.iter().map(|g| g.total_emissions).collect(),
    }
}

/// Month groups in calendar order for time-axis charts. Groups without a
/// `period_start` keep their relative order after the dated ones.
pub fn calendar_series(aggregation: &AggregationOutput) -> ChartSeries {
    let mut groups: Vec<&PeriodAggregate> = aggregation.groups.iter().collect();
    groups.sort_by_key(|g| (g.period_start.is_none(), g.period_start));
    ChartSeries {
        labels: groups.iter().map(|g| g.key.clone()).collect(),
        values: groups.iter().map(|g| g.total_emissions).collect(),
    }
}
