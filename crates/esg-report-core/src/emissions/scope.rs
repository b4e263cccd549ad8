use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::records::{ActivityRecord, Scope};
use crate::types::{safe_div, with_metadata, ComputationOutput, Emissions, RecordIssue, Share};
use crate::EsgReportResult;

use super::aggregate::{collect_issues, RecordFilter, Totals};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeTotal {
    pub scope: Scope,
    pub label: String,
    pub record_count: usize,
    pub total_emissions: Emissions,
    pub share: Share,
}

/// Emissions split by GHG scope. Every scope is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeSummary {
    pub scopes: Vec<ScopeTotal>,
    pub total_emissions: Emissions,
    /// Records whose emissions, or whose addition to the total, overflowed
    #[serde(default)]
    pub excluded_overflow: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeInput {
    pub records: Vec<ActivityRecord>,
    #[serde(default)]
    pub filter: RecordFilter,
}

pub fn summarize_scopes(input: &ScopeInput) -> EsgReportResult<ComputationOutput<ScopeSummary>> {
    let start = Instant::now();
    let selected: Vec<ActivityRecord> = input
        .records
        .iter()
        .filter(|r| input.filter.matches(r))
        .cloned()
        .collect();
    let summary = scope_totals(&selected);
    let mut warnings: Vec<String> = collect_issues(&input.records)
        .iter()
        .map(RecordIssue::to_warning)
        .collect();
    if summary.excluded_overflow > 0 {
        warnings.push(format!(
            "{} record(s) left out because their emissions exceed the decimal range.",
            summary.excluded_overflow
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "scope_1": "stationary, mobile, process, refrigerant",
        "scope_2": "electricity (location-based)",
        "scope_3": "water, paper waste",
        "filter": input.filter,
    });

    Ok(with_metadata(
        "GHG Protocol scope summary",
        &assumptions,
        warnings,
        elapsed,
        summary,
    ))
}

/// Pure per-scope totals over all given records.
pub fn scope_totals(records: &[ActivityRecord]) -> ScopeSummary {
    let mut totals = [(0usize, Decimal::ZERO); 3];
    let mut grand = Totals::default();
    let mut excluded_overflow = 0usize;
    for record in records {
        let Some((_, emissions)) = grand.try_add(record) else {
            excluded_overflow += 1;
            continue;
        };
        let slot = &mut totals[scope_index(record.category.scope())];
        slot.0 += 1;
        slot.1 += emissions;
    }
    let total_emissions = grand.emissions;
    let scopes = Scope::ALL
        .iter()
        .map(|scope| {
            let (count, emissions) = totals[scope_index(*scope)];
            ScopeTotal {
                scope: *scope,
                label: scope.label().to_string(),
                record_count: count,
                total_emissions: emissions,
                share: safe_div(emissions, total_emissions),
            }
        })
        .collect();
    ScopeSummary {
        scopes,
        total_emissions,
        excluded_overflow,
    }
}

fn scope_index(scope: Scope) -> usize {
    match scope {
        Scope::Scope1 => 0,
        Scope::Scope2 => 1,
        Scope::Scope3 => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ActivityCategory;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scope_split() {
        let records = vec![
            ActivityRecord::new(ActivityCategory::StationaryCombustion, "LNG", dec!(10), dec!(2)),
            ActivityRecord::new(ActivityCategory::Refrigerant, "R-134a", dec!(1), dec!(10)),
            ActivityRecord::new(ActivityCategory::Electricity, "Grid", dec!(100), dec!(0.5)),
        ];
        let s = scope_totals(&records);
        assert_eq!(s.total_emissions, dec!(80));
        assert_eq!(s.scopes[0].total_emissions, dec!(30));
        assert_eq!(s.scopes[0].record_count, 2);
        assert_eq!(s.scopes[1].total_emissions, dec!(50));
        assert_eq!(s.scopes[2].total_emissions, Decimal::ZERO);
        assert_eq!(s.scopes[2].share, Decimal::ZERO);
    }

    #[test]
    fn test_empty_has_all_scopes() {
        let s = scope_totals(&[]);
        assert_eq!(s.scopes.len(), 3);
        assert_eq!(s.total_emissions, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_record_skipped() {
        let records = vec![
            ActivityRecord::new(ActivityCategory::Water, "Tap", dec!(3), dec!(1)),
            ActivityRecord::new(ActivityCategory::Water, "Tap", Decimal::MAX, dec!(3)),
        ];
        let s = scope_totals(&records);
        assert_eq!(s.excluded_overflow, 1);
        assert_eq!(s.scopes[2].record_count, 1);
        assert_eq!(s.total_emissions, dec!(3));
    }
}
