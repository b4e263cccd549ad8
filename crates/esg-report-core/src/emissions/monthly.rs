use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::records::{ActivityRecord, Location, LocationIndex};
use crate::types::{with_metadata, ComputationOutput, Emissions, Quantity, RecordIssue};
use crate::EsgReportResult;

use super::aggregate::{collect_issues, tally, GroupKey, PeriodAggregate, RecordFilter};

/// Month-by-month view of one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationMonthly {
    pub location: String,
    /// False when the location is billed by area apportionment; `months` is
    /// then empty and only the whole-period figures apply.
    pub monthly_breakdown_available: bool,
    pub whole_period_quantity: Quantity,
    pub whole_period_emissions: Emissions,
    /// Largest month first; `period_start` gives calendar order
    pub months: Vec<PeriodAggregate>,
    /// Dated-view exclusions for this location
    pub excluded_undated: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub locations: Vec<LocationMonthly>,
    pub issues: Vec<RecordIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyInput {
    pub records: Vec<ActivityRecord>,
    #[serde(default)]
    pub filter: RecordFilter,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub config: EngineConfig,
}

/// Per-location monthly series. Locations are ordered by whole-period
/// emissions, largest first.
pub fn monthly_by_location(
    input: &MonthlyInput,
) -> EsgReportResult<ComputationOutput<MonthlyBreakdown>> {
    let start = Instant::now();
    input.config.validate()?;

    let index = LocationIndex::new(&input.locations);
    let config = &input.config;

    let mut by_location: BTreeMap<String, Vec<&ActivityRecord>> = BTreeMap::new();
    for record in input.records.iter().filter(|r| input.filter.matches(r)) {
        let name = index.name_for(record.location_id.as_deref(), &config.unknown_location_label);
        by_location.entry(name).or_default().push(record);
    }

    let mut locations: Vec<LocationMonthly> = by_location
        .into_iter()
        .map(|(location, records)| {
            let whole = tally(&records, GroupKey::Location, &index, config);
            let apportioned = records.iter().any(|r| r.is_apportioned());
            let (months, excluded_undated) = if apportioned {
                (Vec::new(), 0)
            } else {
                let monthly = tally(&records, GroupKey::Month, &index, config);
                (monthly.groups, monthly.excluded_undated)
            };
            LocationMonthly {
                location,
                monthly_breakdown_available: !apportioned,
                whole_period_quantity: whole.total_quantity,
                whole_period_emissions: whole.total_emissions,
                months,
                excluded_undated,
            }
        })
        .collect();
    locations.sort_by(|a, b| {
        b.whole_period_emissions
            .cmp(&a.whole_period_emissions)
            .then_with(|| a.location.cmp(&b.location))
    });

    let issues = collect_issues(&input.records);
    let mut warnings: Vec<String> = issues.iter().map(RecordIssue::to_warning).collect();
    for loc in locations.iter().filter(|l| !l.monthly_breakdown_available) {
        warnings.push(format!(
            "{}: area-apportioned billing, monthly breakdown not available.",
            loc.location
        ));
    }

    let total: Decimal = locations.iter().map(|l| l.whole_period_emissions).sum();
    tracing::debug!(
        locations = locations.len(),
        total_emissions = %total,
        "built monthly breakdown by location"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "filter": input.filter,
        "apportioned_locations": "whole-period figure only",
        "month_order": "descending total emissions",
    });

    Ok(with_metadata(
        "Monthly emissions by location",
        &assumptions,
        warnings,
        elapsed,
        MonthlyBreakdown { locations, issues },
    ))
}
