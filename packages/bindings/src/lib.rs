use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use esg_report_core::comparison::{self, PriorFigure};
use esg_report_core::dates::{self, DateValue};
use esg_report_core::EsgReportError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Emissions
// ---------------------------------------------------------------------------

#[napi]
pub fn aggregate_emissions(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::emissions::AggregationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = esg_report_core::emissions::aggregate(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn monthly_by_location(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::emissions::MonthlyInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        esg_report_core::emissions::monthly_by_location(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn year_over_year(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::emissions::YearOverYearInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = esg_report_core::emissions::year_over_year(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_scopes(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::emissions::ScopeInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = esg_report_core::emissions::summarize_scopes(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Workforce
// ---------------------------------------------------------------------------

#[napi]
pub fn workforce_stats(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::workforce::WorkforceInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = esg_report_core::workforce::compute_stats(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Comparison & Reporting
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ComparePeriodsInput {
    current: Decimal,
    prior: PriorFigure,
}

#[napi]
pub fn compare_periods(input_json: String) -> NapiResult<String> {
    let input: ComparePeriodsInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = comparison::compare_labeled(input.current, &input.prior);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_report(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::reporting::ReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = esg_report_core::reporting::build_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// CSV text of the report table rather than JSON.
#[napi]
pub fn export_report_csv(input_json: String) -> NapiResult<String> {
    let input: esg_report_core::reporting::ReportInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = esg_report_core::reporting::build_report(&input).map_err(to_napi_error)?;
    esg_report_core::reporting::export_table(&output.result)
        .to_csv()
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Accepts a JSON string or number, e.g. `"03/04/2025"` or `45720`.
#[napi]
pub fn normalize_date(input_json: String) -> NapiResult<String> {
    let value: DateValue = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let date = dates::normalize(&value)
        .map_err(EsgReportError::from)
        .map_err(to_napi_error)?;
    let output = serde_json::json!({
        "iso": dates::to_iso(date),
        "serial": dates::to_serial(date),
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}
