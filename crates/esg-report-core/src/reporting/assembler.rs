use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::comparison::{compare_labeled, LabeledComparison, PriorBasis, PriorFigure};
use crate::config::EngineConfig;
use crate::emissions::{group_records, AggregationOutput, GroupKey, RecordFilter};
use crate::records::{ActivityRecord, Location, LocationIndex};
use crate::types::{
    safe_div, with_metadata, ComputationOutput, Emissions, Factor, Quantity, RecordIssue,
};
use crate::EsgReportResult;

use super::export::{chart_series, round_fixed, ChartSeries, HEADLINE_DP};
use super::narrative::{self, NarrativeFacts, NarrativeInputs};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One line item of the report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub description: String,
    pub quantity: Quantity,
    pub factor: Factor,
    pub emissions: Emissions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Sum of row quantities in their own units. Unit-less once the rows
    /// span more than one category.
    pub total_quantity: Quantity,
    /// Line items with a positive quantity
    pub total_active_sources: usize,
    pub total_emissions: Emissions,
}

/// Dashboard headline figures, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineTotals {
    pub total_quantity: Decimal,
    pub total_emissions: Decimal,
}

/// Period-over-period comparisons feeding the report. Any of them may be
/// absent when no prior figure was supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportComparisons {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emission_factor: Option<LabeledComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<LabeledComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissions: Option<LabeledComparison>,
}

/// Structured report content handed to PDF/Excel/chart renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub title: String,
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
    pub headline: HeadlineTotals,
    pub comparisons: ReportComparisons,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    pub chart: ChartSeries,
    /// Row descriptions renderers may leave unlabelled on charts
    pub low_significance: Vec<String>,
}

/// Prior-period figures a report is compared against. Nothing is ever
/// derived from the current period to stand in for these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorPeriodFigures {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_quantity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_emissions: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weighted_factor: Option<Decimal>,
    #[serde(default)]
    pub basis: PriorBasis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    pub title: String,
    pub records: Vec<ActivityRecord>,
    /// Row granularity; subtype (fuel, vehicle, ...) by default
    #[serde(default = "default_row_grouping")]
    pub group_by: GroupKey,
    #[serde(default)]
    pub filter: RecordFilter,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior: Option<PriorPeriodFigures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_label: Option<String>,
    #[serde(default = "default_true")]
    pub include_narrative: bool,
    #[serde(default)]
    pub config: EngineConfig,
}

fn default_row_grouping() -> GroupKey {
    GroupKey::Subtype
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Aggregate, compare against the prior period and assemble the payload.
pub fn build_report(input: &ReportInput) -> EsgReportResult<ComputationOutput<ReportPayload>> {
    let start = Instant::now();
    input.config.validate()?;

    let index = LocationIndex::new(&input.locations);
    let rows = group_records(
        &input.records,
        input.group_by,
        &input.filter,
        &index,
        &input.config,
    );
    let months = group_records(
        &input.records,
        GroupKey::Month,
        &input.filter,
        &index,
        &input.config,
    );
    // Month groups come largest first, ties in calendar order.
    let peak_month = months
        .groups
        .iter()
        .find(|g| g.total_emissions > Decimal::ZERO)
        .map(|g| g.key.clone());
    let categories: BTreeSet<usize> = input
        .records
        .iter()
        .filter(|r| input.filter.matches(r))
        .map(|r| r.category.index())
        .collect();

    let comparisons = match &input.prior {
        Some(prior) => compare_with_prior(&rows, prior),
        None => ReportComparisons::default(),
    };

    let narrative_inputs = NarrativeInputs {
        period_label: input
            .period_label
            .clone()
            .or_else(|| input.filter.year.map(|y| y.to_string())),
        prior_label: input.prior.as_ref().and_then(|p| p.label.clone()),
        peak_month,
    };

    let mut payload = assemble(
        &rows,
        &comparisons,
        input.include_narrative.then_some(&narrative_inputs),
    );
    payload.title = input.title.clone();

    let mut warnings: Vec<String> = rows.issues.iter().map(RecordIssue::to_warning).collect();
    if input.prior.is_none() {
        warnings.push(
            "No prior-period figures supplied; comparisons are reported as (N/A).".into(),
        );
    } else if comparisons
        .emissions
        .as_ref()
        .is_some_and(|c| c.basis == PriorBasis::Estimated)
    {
        warnings.push("Prior-period figures are estimates, not measured data.".into());
    }
    if !months.monthly_breakdown_available {
        warnings.push(
            "All records are area-apportioned; no monthly breakdown or peak month.".into(),
        );
    }
    if categories.len() > 1 {
        warnings.push(
            "Total quantity adds different units across categories; compare emissions instead."
                .into(),
        );
    }
    if rows.excluded_overflow > 0 {
        warnings.push(format!(
            "{} record(s) left out because their emissions exceed the decimal range.",
            rows.excluded_overflow
        ));
    }

    tracing::debug!(
        title = %payload.title,
        rows = payload.rows.len(),
        total_emissions = %payload.summary.total_emissions,
        "assembled report payload"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "row_grouping": input.group_by,
        "filter": input.filter,
        "line_item_precision": 4,
        "headline_precision": 2,
        "prior_basis": input.prior.as_ref().map(|p| p.basis),
    });

    Ok(with_metadata(
        "ESG emissions report assembly",
        &assumptions,
        warnings,
        elapsed,
        payload,
    ))
}

/// Combine an aggregation, its comparisons and the narrative inputs into a
/// renderer-agnostic payload. Pure; the title is left empty.
pub fn assemble(
    aggregation: &AggregationOutput,
    comparisons: &ReportComparisons,
    narrative_inputs: Option<&NarrativeInputs>,
) -> ReportPayload {
    let rows: Vec<ReportRow> = aggregation
        .groups
        .iter()
        .map(|g| ReportRow {
            description: g.key.clone(),
            quantity: g.total_quantity,
            factor: g.weighted_factor,
            emissions: g.total_emissions,
        })
        .collect();

    let summary = ReportSummary {
        total_quantity: aggregation.total_quantity,
        total_active_sources: rows.iter().filter(|r| r.quantity > Decimal::ZERO).count(),
        total_emissions: aggregation.total_emissions,
    };

    let narrative = narrative_inputs.map(|inputs| {
        narrative::render(
            inputs,
            &NarrativeFacts {
                total_emissions: summary.total_emissions,
                active_sources: summary.total_active_sources,
                factor_change: comparisons.emission_factor.as_ref(),
                quantity_change: comparisons.quantity.as_ref(),
            },
        )
    });

    ReportPayload {
        title: String::new(),
        headline: HeadlineTotals {
            total_quantity: round_fixed(summary.total_quantity, HEADLINE_DP),
            total_emissions: round_fixed(summary.total_emissions, HEADLINE_DP),
        },
        rows,
        summary,
        comparisons: comparisons.clone(),
        narrative,
        chart: chart_series(aggregation),
        low_significance: aggregation
            .groups
            .iter()
            .filter(|g| g.low_significance)
            .map(|g| g.key.clone())
            .collect(),
    }
}

/// Comparisons of the current aggregation against supplied prior figures.
pub fn compare_with_prior(
    current: &AggregationOutput,
    prior: &PriorPeriodFigures,
) -> ReportComparisons {
    let figure = |value: Option<Decimal>| {
        value.map(|v| PriorFigure {
            value: v,
            basis: prior.basis,
        })
    };
    let current_factor = safe_div(current.total_emissions, current.total_quantity);
    ReportComparisons {
        emission_factor: figure(prior.weighted_factor).map(|p| compare_labeled(current_factor, &p)),
        quantity: figure(prior.total_quantity).map(|p| compare_labeled(current.total_quantity, &p)),
        emissions: figure(prior.total_emissions)
            .map(|p| compare_labeled(current.total_emissions, &p)),
    }
}
