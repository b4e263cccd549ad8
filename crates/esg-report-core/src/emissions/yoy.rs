use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::comparison::{compare, Comparison};
use crate::config::EngineConfig;
use crate::dates::DateField;
use crate::records::{ActivityCategory, ActivityRecord};
use crate::types::{with_metadata, ComputationOutput, Emissions, Quantity, RecordIssue};
use crate::EsgReportResult;

use super::aggregate::{collect_issues, Totals};

/// Parallel totals of one category for the two comparison years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYearRow {
    pub key: String,
    pub prior_quantity: Quantity,
    pub prior_emissions: Emissions,
    pub current_quantity: Quantity,
    pub current_emissions: Emissions,
    pub quantity_change: Comparison,
    pub emissions_change: Comparison,
}

impl YearOverYearRow {
    fn new(key: String, prior: (Decimal, Decimal), current: (Decimal, Decimal)) -> Self {
        YearOverYearRow {
            key,
            prior_quantity: prior.0,
            prior_emissions: prior.1,
            current_quantity: current.0,
            current_emissions: current.1,
            quantity_change: compare(current.0, prior.0),
            emissions_change: compare(current.1, prior.1),
        }
    }
}

/// Year-over-year table. Only dated records in either year take part; the
/// all-time totals elsewhere still include undated records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearOverYearTable {
    pub prior_year: i32,
    pub current_year: i32,
    /// Categories with data in either year, in fixed category order
    pub rows: Vec<YearOverYearRow>,
    /// Emissions are in kgCO2e throughout. The quantity columns add each
    /// category's own unit together and carry no unit once `rows` spans
    /// more than one category.
    pub totals: YearOverYearRow,
    pub excluded_undated: usize,
    /// Records whose emissions, or whose addition to a year's total, overflowed
    #[serde(default)]
    pub excluded_overflow: usize,
    pub records_outside_years: usize,
    pub issues: Vec<RecordIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearOverYearInput {
    pub records: Vec<ActivityRecord>,
    /// `(prior, current)`; falls back to `config.comparison_years`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<(i32, i32)>,
    #[serde(default)]
    pub config: EngineConfig,
}

/// Sum each category separately for the prior and the current year.
pub fn year_over_year(
    input: &YearOverYearInput,
) -> EsgReportResult<ComputationOutput<YearOverYearTable>> {
    let start = Instant::now();
    let config = EngineConfig {
        comparison_years: input.years.unwrap_or(input.config.comparison_years),
        ..input.config.clone()
    };
    config.validate()?;

    let table = build_table(&input.records, &config);

    let mut warnings: Vec<String> = table.issues.iter().map(RecordIssue::to_warning).collect();
    if table.excluded_undated > 0 {
        warnings.push(format!(
            "{} record(s) without a usable date are not part of the year-over-year view.",
            table.excluded_undated
        ));
    }
    if table.excluded_overflow > 0 {
        warnings.push(format!(
            "{} record(s) left out because their emissions exceed the decimal range.",
            table.excluded_overflow
        ));
    }
    if table.rows.len() > 1 {
        warnings.push(
            "Total quantity adds different units across categories; compare emissions instead."
                .to_string(),
        );
    }

    tracing::debug!(
        prior_year = table.prior_year,
        current_year = table.current_year,
        rows = table.rows.len(),
        "built year-over-year table"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "prior_year": table.prior_year,
        "current_year": table.current_year,
        "bucketing": "calendar year of period date",
        "percent_change": "|current - prior| / prior × 100, 0 when prior is 0",
    });

    Ok(with_metadata(
        "Year-over-year emissions comparison by category",
        &assumptions,
        warnings,
        elapsed,
        table,
    ))
}

/// Pure table construction for the years in `config.comparison_years`.
pub fn build_table(records: &[ActivityRecord], config: &EngineConfig) -> YearOverYearTable {
    let (prior_year, current_year) = config.comparison_years;
    let n = ActivityCategory::ALL.len();
    let mut prior = vec![(Decimal::ZERO, Decimal::ZERO); n];
    let mut current = vec![(Decimal::ZERO, Decimal::ZERO); n];
    let mut prior_totals = Totals::default();
    let mut current_totals = Totals::default();
    let mut seen = vec![false; n];
    let mut excluded_undated = 0usize;
    let mut excluded_overflow = 0usize;
    let mut outside = 0usize;

    for record in records {
        let year = match record.period() {
            DateField::Parsed(d) => chrono::Datelike::year(&d),
            DateField::Missing | DateField::Unparseable(_) => {
                excluded_undated += 1;
                continue;
            }
        };
        let (slot, totals) = if year == prior_year {
            (&mut prior, &mut prior_totals)
        } else if year == current_year {
            (&mut current, &mut current_totals)
        } else {
            outside += 1;
            continue;
        };
        let Some((quantity, emissions)) = totals.try_add(record) else {
            excluded_overflow += 1;
            continue;
        };
        let i = record.category.index();
        slot[i].0 += quantity;
        slot[i].1 += emissions;
        seen[i] = true;
    }

    let rows: Vec<YearOverYearRow> = ActivityCategory::ALL
        .iter()
        .enumerate()
        .filter(|(i, _)| seen[*i])
        .map(|(i, c)| YearOverYearRow::new(c.label().to_string(), prior[i], current[i]))
        .collect();

    let totals = YearOverYearRow::new(
        "Total".to_string(),
        (prior_totals.quantity, prior_totals.emissions),
        (current_totals.quantity, current_totals.emissions),
    );

    YearOverYearTable {
        prior_year,
        current_year,
        rows,
        totals,
        excluded_undated,
        excluded_overflow,
        records_outside_years: outside,
        issues: collect_issues(records),
    }
}
