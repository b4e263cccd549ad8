use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::dates::DateField;
use crate::records::{ActivityCategory, ActivityRecord, Location, LocationIndex};
use crate::types::{
    safe_div, with_metadata, ComputationOutput, Emissions, Factor, Quantity, RecordIssue, Share,
};
use crate::EsgReportResult;

use chrono::{Datelike, NaiveDate};

pub(crate) const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Attribute records are partitioned by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    /// Fixed category enumeration order (1a, 1b, ...)
    #[default]
    Category,
    Subtype,
    Location,
    /// Calendar month of the period date, one group per year and month
    Month,
}

impl GroupKey {
    /// Whether output follows a fixed enumeration instead of magnitude.
    pub fn has_fixed_order(&self) -> bool {
        matches!(self, GroupKey::Category)
    }
}

/// Restricts which records take part in an aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Reporting year; records without a parseable date never match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ActivityCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl RecordFilter {
    pub fn year(year: i32) -> Self {
        RecordFilter {
            year: Some(year),
            ..Default::default()
        }
    }

    pub fn matches(&self, record: &ActivityRecord) -> bool {
        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }
        if let Some(ref id) = self.location_id {
            if record.location_id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        match self.year {
            Some(year) => record.period().year() == Some(year),
            None => true,
        }
    }
}

/// Totals for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodAggregate {
    pub key: String,
    /// Month grouping only: first day of the month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    pub record_count: usize,
    pub total_quantity: Quantity,
    pub total_emissions: Emissions,
    /// total_emissions / total_quantity, 0 when quantity is 0
    pub weighted_factor: Factor,
    /// Fraction of the grand total, 0 when the grand total is 0
    pub share: Share,
    /// Share below the display threshold; renderers may hide the label
    pub low_significance: bool,
}

/// Result of partitioning a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationOutput {
    pub group_by: GroupKey,
    pub groups: Vec<PeriodAggregate>,
    pub total_quantity: Quantity,
    pub total_emissions: Emissions,
    /// Records that contributed to `groups`
    pub records_included: usize,
    /// Records rejected by the filter
    pub records_filtered_out: usize,
    /// Month grouping only: records without a usable date
    pub excluded_undated: usize,
    /// Month grouping only: area-apportioned records, which have no monthly split
    pub excluded_apportioned: usize,
    /// Records whose emissions, or whose addition to the totals, overflowed
    #[serde(default)]
    pub excluded_overflow: usize,
    /// False when a month grouping came out empty because every eligible
    /// record was area-apportioned. Always true for other groupings.
    pub monthly_breakdown_available: bool,
    /// Locations holding area-apportioned records
    pub apportioned_locations: Vec<String>,
    pub issues: Vec<RecordIssue>,
}

/// Input for a single aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationInput {
    pub records: Vec<ActivityRecord>,
    #[serde(default)]
    pub group_by: GroupKey,
    #[serde(default)]
    pub filter: RecordFilter,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub config: EngineConfig,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Partition activity records by the requested key and total each group.
pub fn aggregate(input: &AggregationInput) -> EsgReportResult<ComputationOutput<AggregationOutput>> {
    let start = Instant::now();
    input.config.validate()?;

    let index = LocationIndex::new(&input.locations);
    let output = group_records(
        &input.records,
        input.group_by,
        &input.filter,
        &index,
        &input.config,
    );

    let mut warnings: Vec<String> = output.issues.iter().map(RecordIssue::to_warning).collect();
    if output.excluded_undated > 0 {
        warnings.push(format!(
            "{} record(s) without a usable date are left out of the monthly view but remain in overall totals.",
            output.excluded_undated
        ));
    }
    if output.excluded_apportioned > 0 {
        warnings.push(format!(
            "{} area-apportioned record(s) have no monthly split (locations: {}).",
            output.excluded_apportioned,
            output.apportioned_locations.join(", ")
        ));
    }
    if output.excluded_overflow > 0 {
        warnings.push(format!(
            "{} record(s) left out because their emissions exceed the decimal range.",
            output.excluded_overflow
        ));
    }

    tracing::debug!(
        group_by = ?input.group_by,
        groups = output.groups.len(),
        included = output.records_included,
        total_emissions = %output.total_emissions,
        "aggregated activity records"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "group_by": input.group_by,
        "filter": input.filter,
        "display_threshold": input.config.display_threshold,
        "ordering": if input.group_by.has_fixed_order() {
            "fixed enumeration"
        } else {
            "descending total emissions"
        },
        "emissions_unit": "kgCO2e",
    });

    Ok(with_metadata(
        "Activity-based emissions aggregation (quantity × emission factor)",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Pure grouping over a borrowed record set. The same input always yields
/// the same groups in the same order.
pub fn group_records(
    records: &[ActivityRecord],
    group_by: GroupKey,
    filter: &RecordFilter,
    locations: &LocationIndex<'_>,
    config: &EngineConfig,
) -> AggregationOutput {
    let selected: Vec<&ActivityRecord> = records.iter().filter(|r| filter.matches(r)).collect();
    let mut output = tally(&selected, group_by, locations, config);
    output.records_filtered_out = records.len() - selected.len();
    output.issues = collect_issues(records);
    output
}

/// Issues found on every record of the input, in input order.
pub fn collect_issues(records: &[ActivityRecord]) -> Vec<RecordIssue> {
    records
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.issues(i))
        .collect()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Bucket {
    rank: usize,
    key: String,
    period_start: Option<NaiveDate>,
    count: usize,
    quantity: Decimal,
    emissions: Decimal,
}

/// Running grand totals that refuse additions leaving the decimal range.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Totals {
    pub quantity: Decimal,
    pub emissions: Decimal,
}

impl Totals {
    /// Adds `record` and returns its `(quantity, emissions)`, or `None` when
    /// the record or the new totals overflow. Totals are left untouched then.
    pub fn try_add(&mut self, record: &ActivityRecord) -> Option<(Quantity, Emissions)> {
        let (quantity, emissions) = record.checked_amounts()?;
        let new_quantity = self.quantity.checked_add(quantity)?;
        let new_emissions = self.emissions.checked_add(emissions)?;
        self.quantity = new_quantity;
        self.emissions = new_emissions;
        Some((quantity, emissions))
    }
}

pub(crate) fn tally(
    records: &[&ActivityRecord],
    group_by: GroupKey,
    locations: &LocationIndex<'_>,
    config: &EngineConfig,
) -> AggregationOutput {
    // Keyed by (rank, key): subtypes sharing a name across categories stay apart.
    let mut buckets: HashMap<(usize, String), Bucket> = HashMap::new();
    let mut apportioned_locations: BTreeSet<String> = BTreeSet::new();
    let mut categories: BTreeSet<usize> = BTreeSet::new();
    let mut totals = Totals::default();
    let mut excluded_undated = 0usize;
    let mut excluded_apportioned = 0usize;
    let mut excluded_overflow = 0usize;
    let mut included = 0usize;

    for record in records {
        let location = locations.name_for(
            record.location_id.as_deref(),
            &config.unknown_location_label,
        );
        if record.is_apportioned() {
            apportioned_locations.insert(location.clone());
        }

        let (rank, key, period_start) = match group_by {
            GroupKey::Category => (
                record.category.index(),
                record.category.label().to_string(),
                None,
            ),
            GroupKey::Subtype => {
                let subtype = record.subtype.trim();
                let key = if subtype.is_empty() {
                    config.unknown_label.clone()
                } else {
                    subtype.to_string()
                };
                (record.category.index(), key, None)
            }
            GroupKey::Location => (0, location, None),
            GroupKey::Month => {
                if record.is_apportioned() {
                    excluded_apportioned += 1;
                    continue;
                }
                match record.period() {
                    DateField::Parsed(d) => {
                        let month = d.month0() as usize;
                        let rank = d.year().max(0) as usize * 12 + month;
                        let key = format!("{} {}", MONTH_NAMES[month], d.year());
                        (rank, key, d.with_day(1))
                    }
                    DateField::Missing | DateField::Unparseable(_) => {
                        excluded_undated += 1;
                        continue;
                    }
                }
            }
        };

        let Some((quantity, emissions)) = totals.try_add(record) else {
            excluded_overflow += 1;
            continue;
        };

        included += 1;
        categories.insert(record.category.index());
        let bucket = buckets
            .entry((rank, key.clone()))
            .or_insert_with(|| Bucket {
                rank,
                key,
                period_start,
                count: 0,
                quantity: Decimal::ZERO,
                emissions: Decimal::ZERO,
            });
        // Bounded by the grand totals, which were checked above.
        bucket.count += 1;
        bucket.quantity += quantity;
        bucket.emissions += emissions;
    }

    let mut buckets: Vec<Bucket> = buckets.into_values().collect();
    if group_by == GroupKey::Subtype && categories.len() > 1 {
        for bucket in &mut buckets {
            if let Some(category) = ActivityCategory::ALL.get(bucket.rank) {
                bucket.key = format!("{} ({})", bucket.key, category.label());
            }
        }
    }
    if group_by.has_fixed_order() {
        buckets.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.key.cmp(&b.key)));
    } else {
        buckets.sort_by(|a, b| {
            b.emissions
                .cmp(&a.emissions)
                .then_with(|| a.rank.cmp(&b.rank))
                .then_with(|| a.key.cmp(&b.key))
        });
    }

    let groups: Vec<PeriodAggregate> = buckets
        .into_iter()
        .map(|b| {
            let share = safe_div(b.emissions, totals.emissions);
            PeriodAggregate {
                key: b.key,
                period_start: b.period_start,
                record_count: b.count,
                total_quantity: b.quantity,
                total_emissions: b.emissions,
                weighted_factor: safe_div(b.emissions, b.quantity),
                share,
                low_significance: share < config.display_threshold,
            }
        })
        .collect();

    let monthly_breakdown_available =
        !(group_by == GroupKey::Month && groups.is_empty() && excluded_apportioned > 0);

    AggregationOutput {
        group_by,
        groups,
        total_quantity: totals.quantity,
        total_emissions: totals.emissions,
        records_included: included,
        records_filtered_out: 0,
        excluded_undated,
        excluded_apportioned,
        excluded_overflow,
        monthly_breakdown_available,
        apportioned_locations: apportioned_locations.into_iter().collect(),
        issues: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rec(category: ActivityCategory, subtype: &str, qty: Decimal, ef: Decimal) -> ActivityRecord {
        ActivityRecord::new(category, subtype, qty, ef)
    }

    fn run(records: &[ActivityRecord], group_by: GroupKey) -> AggregationOutput {
        group_records(
            records,
            group_by,
            &RecordFilter::default(),
            &LocationIndex::default(),
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_single_stationary_record() {
        let records = vec![rec(
            ActivityCategory::StationaryCombustion,
            "Diesel oil",
            dec!(100),
            dec!(2.68),
        )];
        let out = run(&records, GroupKey::Category);
        assert_eq!(out.groups.len(), 1);
        let g = &out.groups[0];
        assert_eq!(g.key, "Stationary Combustion");
        assert_eq!(g.total_quantity, dec!(100));
        assert_eq!(g.total_emissions, dec!(268));
        assert_eq!(g.weighted_factor, dec!(2.68));
        assert_eq!(g.share, Decimal::ONE);
        assert!(!g.low_significance);
    }

    #[test]
    fn test_category_order_is_fixed() {
        let records = vec![
            rec(ActivityCategory::Refrigerant, "R-410A", dec!(1), dec!(2088)),
            rec(ActivityCategory::StationaryCombustion, "LNG", dec!(1), dec!(1)),
            rec(ActivityCategory::MobileCombustion, "Gasoline", dec!(10), dec!(2.3)),
        ];
        let out = run(&records, GroupKey::Category);
        let keys: Vec<&str> = out.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["Stationary Combustion", "Mobile Combustion", "Refrigerant"]
        );
    }

    #[test]
    fn test_subtype_order_descending_by_emissions() {
        let records = vec![
            rec(ActivityCategory::StationaryCombustion, "LNG", dec!(1), dec!(1)),
            rec(ActivityCategory::StationaryCombustion, "Diesel oil", dec!(100), dec!(2.68)),
            rec(ActivityCategory::StationaryCombustion, "", dec!(10), dec!(2)),
        ];
        let out = run(&records, GroupKey::Subtype);
        let keys: Vec<&str> = out.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Diesel oil", "Unknown", "LNG"]);
    }

    #[test]
    fn test_low_significance_flag() {
        let records = vec![
            rec(ActivityCategory::Electricity, "Grid", dec!(1000), dec!(1)),
            rec(ActivityCategory::Water, "Tap", dec!(10), dec!(1)),
        ];
        let out = run(&records, GroupKey::Category);
        assert!(!out.groups[0].low_significance);
        assert!(out.groups[1].low_significance);
        // still part of the totals
        assert_eq!(out.total_emissions, dec!(1010));
    }

    #[test]
    fn test_month_grouping_excludes_undated_and_apportioned() {
        let records = vec![
            rec(ActivityCategory::Electricity, "Grid", dec!(10), dec!(1)).with_period_date("2025-02-10"),
            rec(ActivityCategory::Electricity, "Grid", dec!(20), dec!(1)).with_period_date("01/15/2025"),
            rec(ActivityCategory::Electricity, "Grid", dec!(30), dec!(1)),
            rec(ActivityCategory::Electricity, "Grid", dec!(40), dec!(1)).with_period_date("??"),
            rec(ActivityCategory::Electricity, "Grid", dec!(5000), dec!(0.45))
                .with_period_date("2025-03-01")
                .with_location("tower")
                .apportioned(dec!(200), dec!(1000)),
        ];
        let out = run(&records, GroupKey::Month);
        let keys: Vec<&str> = out.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["January 2025", "February 2025"]);
        assert_eq!(
            out.groups[1].period_start,
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );
        assert_eq!(out.excluded_undated, 2);
        assert_eq!(out.excluded_apportioned, 1);
        assert_eq!(out.apportioned_locations, vec!["tower".to_string()]);
        assert!(out.monthly_breakdown_available);
        assert_eq!(out.total_emissions, dec!(30));
    }

    #[test]
    fn test_month_grouping_only_apportioned_signals_unavailable() {
        let records = vec![rec(ActivityCategory::Electricity, "Grid", dec!(5000), dec!(0.45))
            .with_period_date("2025-03-01")
            .apportioned(dec!(200), dec!(1000))];
        let out = run(&records, GroupKey::Month);
        assert!(out.groups.is_empty());
        assert!(!out.monthly_breakdown_available);
        // the same record is a single whole-period figure elsewhere
        let by_category = run(&records, GroupKey::Category);
        assert_eq!(by_category.total_emissions, dec!(450));
    }

    #[test]
    fn test_year_filter_drops_undated() {
        let records = vec![
            rec(ActivityCategory::Water, "Tap", dec!(1), dec!(1)).with_period_date("2025-06-01"),
            rec(ActivityCategory::Water, "Tap", dec!(2), dec!(1)).with_period_date("2024-06-01"),
            rec(ActivityCategory::Water, "Tap", dec!(4), dec!(1)),
        ];
        let out = group_records(
            &records,
            GroupKey::Category,
            &RecordFilter::year(2025),
            &LocationIndex::default(),
            &EngineConfig::default(),
        );
        assert_eq!(out.total_quantity, dec!(1));
        assert_eq!(out.records_filtered_out, 2);
    }

    #[test]
    fn test_empty_input_is_empty_not_error() {
        let out = run(&[], GroupKey::Location);
        assert!(out.groups.is_empty());
        assert_eq!(out.total_emissions, Decimal::ZERO);
        assert!(out.monthly_breakdown_available);
    }

    #[test]
    fn test_zero_total_shares_are_zero() {
        let records = vec![rec(ActivityCategory::Water, "Tap", Decimal::ZERO, dec!(1))];
        let out = run(&records, GroupKey::Category);
        assert_eq!(out.groups[0].share, Decimal::ZERO);
        assert_eq!(out.groups[0].weighted_factor, Decimal::ZERO);
    }

    #[test]
    fn test_aggregate_rejects_bad_threshold() {
        let input = AggregationInput {
            records: vec![],
            group_by: GroupKey::Category,
            filter: RecordFilter::default(),
            locations: vec![],
            config: EngineConfig {
                display_threshold: dec!(-0.1),
                ..EngineConfig::default()
            },
        };
        assert!(aggregate(&input).is_err());
    }

    #[test]
    fn test_aggregate_envelope_warnings() {
        let input = AggregationInput {
            records: vec![
                rec(ActivityCategory::Water, "Tap", dec!(-1), dec!(1)),
                rec(ActivityCategory::Water, "Tap", dec!(3), dec!(1)),
            ],
            group_by: GroupKey::Month,
            filter: RecordFilter::default(),
            locations: vec![],
            config: EngineConfig::default(),
        };
        let out = aggregate(&input).unwrap();
        assert_eq!(out.result.issues.len(), 1);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_month_groups_keep_years_apart() {
        let records = vec![
            rec(ActivityCategory::Water, "Tap", dec!(10), dec!(1)).with_period_date("2024-01-10"),
            rec(ActivityCategory::Water, "Tap", dec!(20), dec!(1)).with_period_date("2025-01-10"),
        ];
        let out = run(&records, GroupKey::Month);
        let keys: Vec<&str> = out.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["January 2025", "January 2024"]);
        assert_eq!(out.groups[1].total_emissions, dec!(10));
    }

    #[test]
    fn test_month_groups_sorted_by_emissions() {
        let records = vec![
            rec(ActivityCategory::Water, "Tap", dec!(5), dec!(1)).with_period_date("2025-01-10"),
            rec(ActivityCategory::Water, "Tap", dec!(50), dec!(1)).with_period_date("2025-07-10"),
            rec(ActivityCategory::Water, "Tap", dec!(5), dec!(1)).with_period_date("2025-03-10"),
        ];
        let out = run(&records, GroupKey::Month);
        let keys: Vec<&str> = out.groups.iter().map(|g| g.key.as_str()).collect();
        // ties fall back to calendar order
        assert_eq!(keys, vec!["July 2025", "January 2025", "March 2025"]);
    }

    #[test]
    fn test_same_subtype_in_two_categories_stays_apart() {
        let records = vec![
            rec(ActivityCategory::StationaryCombustion, "Other", dec!(100), dec!(2.68)),
            rec(ActivityCategory::Water, "Other", dec!(50), dec!(0.3)),
        ];
        let out = run(&records, GroupKey::Subtype);
        assert_eq!(out.groups.len(), 2);
        assert_eq!(out.groups[0].key, "Other (Stationary Combustion)");
        assert_eq!(out.groups[0].weighted_factor, dec!(2.68));
        assert_eq!(out.groups[1].key, "Other (Water)");
        assert_eq!(out.groups[1].total_quantity, dec!(50));
    }

    #[test]
    fn test_overflowing_record_excluded_without_panic() {
        let records = vec![
            rec(ActivityCategory::StationaryCombustion, "Diesel oil", dec!(100), dec!(2.68)),
            rec(
                ActivityCategory::StationaryCombustion,
                "Coal",
                Decimal::from_i128_with_scale(10i128.pow(20), 0),
                dec!(10000000000),
            ),
        ];
        let out = run(&records, GroupKey::Subtype);
        assert_eq!(out.excluded_overflow, 1);
        assert_eq!(out.total_emissions, dec!(268));
        assert_eq!(out.groups.len(), 1);
        assert_eq!(out.issues[0].kind, crate::types::IssueKind::Overflow);
    }

    #[test]
    fn test_overflowing_running_total_excluded() {
        let big = rec(ActivityCategory::Water, "Tap", Decimal::MAX, Decimal::ONE);
        let records = vec![big.clone(), big];
        let out = run(&records, GroupKey::Category);
        assert_eq!(out.records_included, 1);
        assert_eq!(out.excluded_overflow, 1);
        assert_eq!(out.total_emissions, Decimal::MAX);
    }
}
