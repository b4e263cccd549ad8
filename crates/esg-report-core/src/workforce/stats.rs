use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use crate::config::EngineConfig;
use crate::dates::DateField;
use crate::records::{AgeBand, EmployeeRecord, Sex};
use crate::types::{
    percent_of, with_metadata, ComputationOutput, IssueKind, Percent, RecordIssue,
};
use crate::EsgReportResult;

use super::turnover::{CohortCounter, CohortDimension, TurnoverStat, YearPosition};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Count and percentage of total employees for one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: u32,
    /// count / total_employees × 100
    pub percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub total: u32,
    pub male: u32,
    pub female: u32,
    pub unknown: u32,
    /// female / total × 100
    pub female_percent: Percent,
}

/// Workforce composition and movement for one reference year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkforceStats {
    pub reference_year: i32,
    /// Every record, regardless of date quality
    pub total_employees: u32,
    pub headcount_at_start: u32,
    pub headcount_at_end: u32,
    pub new_hires: u32,
    pub leavers: u32,
    pub overall_turnover_rate: Percent,
    /// Overall first, then each sex, then each age band
    pub turnover: Vec<TurnoverStat>,
    pub sex_distribution: Vec<DistributionEntry>,
    pub age_distribution: Vec<DistributionEntry>,
    pub executives: ExecutiveSummary,
    /// Descending by count, then by name
    pub countries: Vec<DistributionEntry>,
    /// Distinct exit years plus the reference year, newest first
    pub available_years: Vec<i32>,
    /// Records left out of date-bucketed counts
    pub excluded_from_dated_counts: u32,
    pub issues: Vec<RecordIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkforceInput {
    pub employees: Vec<EmployeeRecord>,
    pub reference_year: i32,
    #[serde(default)]
    pub config: EngineConfig,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Headcount, turnover, diversity and geography for the reference year.
pub fn compute_stats(input: &WorkforceInput) -> EsgReportResult<ComputationOutput<WorkforceStats>> {
    let start = Instant::now();

    let stats = workforce_stats(&input.employees, input.reference_year, &input.config);

    let mut warnings: Vec<String> = stats.issues.iter().map(RecordIssue::to_warning).collect();
    if stats.total_employees == 0 {
        warnings.push("No employee records supplied; all statistics are zero.".into());
    }
    for issue in stats.issues.iter().filter(|i| i.kind == IssueKind::ExitBeforeHire) {
        tracing::warn!(index = issue.index, "{}", issue.detail);
    }
    tracing::debug!(
        reference_year = stats.reference_year,
        total = stats.total_employees,
        turnover = %stats.overall_turnover_rate,
        "computed workforce statistics"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "reference_year": input.reference_year,
        "headcount_at_start": "hired on/before Jan 1 and not exited before it",
        "headcount_at_end": "hired by Dec 31 and no exit on/before Dec 31",
        "turnover_rate": "leavers / ((start + end) / 2) × 100",
        "age_bands": ["<30", "30-50", ">50"],
        "executive_position": input.config.executive_position,
    });

    Ok(with_metadata(
        "Workforce statistics (average-headcount turnover)",
        &assumptions,
        warnings,
        elapsed,
        stats,
    ))
}

/// Pure statistics over a borrowed employee list.
pub fn workforce_stats(
    employees: &[EmployeeRecord],
    reference_year: i32,
    config: &EngineConfig,
) -> WorkforceStats {
    let mut overall = CohortCounter::default();
    let mut by_sex: HashMap<Sex, CohortCounter> = HashMap::new();
    let mut by_age: HashMap<AgeBand, CohortCounter> = HashMap::new();
    let mut sex_counts: HashMap<Sex, u32> = HashMap::new();
    let mut age_counts: HashMap<AgeBand, u32> = HashMap::new();
    let mut country_counts: HashMap<String, u32> = HashMap::new();
    let mut exit_years: BTreeSet<i32> = BTreeSet::new();
    let mut executives = ExecutiveSummary {
        total: 0,
        male: 0,
        female: 0,
        unknown: 0,
        female_percent: Decimal::ZERO,
    };
    let mut issues: Vec<RecordIssue> = Vec::new();
    let mut excluded = 0u32;

    for (i, employee) in employees.iter().enumerate() {
        let band = employee.age_band();
        *sex_counts.entry(employee.sex).or_default() += 1;
        *age_counts.entry(band).or_default() += 1;
        if let Some(country) = employee.country_name() {
            *country_counts.entry(country.to_string()).or_default() += 1;
        }
        if employee.is_executive(config) {
            executives.total += 1;
            match employee.sex {
                Sex::Male => executives.male += 1,
                Sex::Female => executives.female += 1,
                Sex::Unknown => executives.unknown += 1,
            }
        }

        let hire = employee.hire();
        let exit = employee.exit();
        issues.extend(date_issues(i, employee, &hire, &exit));
        if let Some(year) = exit.year() {
            exit_years.insert(year);
        }

        match YearPosition::of(&hire, &exit, reference_year) {
            Some(pos) => {
                overall.observe(&pos);
                by_sex.entry(employee.sex).or_default().observe(&pos);
                by_age.entry(band).or_default().observe(&pos);
            }
            None => excluded += 1,
        }
    }

    let total = employees.len() as u32;
    executives.female_percent = percent_of(executives.female.into(), executives.total.into());

    let overall_stat = overall.to_stat(CohortDimension::Overall, "Overall", reference_year);
    let mut turnover = vec![overall_stat.clone()];
    turnover.extend(Sex::ALL.iter().map(|s| {
        by_sex
            .get(s)
            .copied()
            .unwrap_or_default()
            .to_stat(CohortDimension::Sex, s.label(), reference_year)
    }));
    turnover.extend(AgeBand::ALL.iter().map(|b| {
        by_age
            .get(b)
            .copied()
            .unwrap_or_default()
            .to_stat(CohortDimension::AgeBand, b.label(), reference_year)
    }));

    let distribution = |label: &str, count: u32| DistributionEntry {
        label: label.to_string(),
        count,
        percent: percent_of(count.into(), total.into()),
    };
    let sex_distribution = Sex::ALL
        .iter()
        .map(|s| distribution(s.label(), sex_counts.get(s).copied().unwrap_or(0)))
        .collect();
    let age_distribution = AgeBand::ALL
        .iter()
        .map(|b| distribution(b.label(), age_counts.get(b).copied().unwrap_or(0)))
        .collect();
    let mut countries: Vec<DistributionEntry> = country_counts
        .iter()
        .map(|(name, count)| distribution(name, *count))
        .collect();
    countries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));

    exit_years.insert(reference_year);
    let available_years: Vec<i32> = exit_years.into_iter().rev().collect();

    WorkforceStats {
        reference_year,
        total_employees: total,
        headcount_at_start: overall_stat.headcount_at_start,
        headcount_at_end: overall_stat.headcount_at_end,
        new_hires: overall_stat.new_hires_in_year,
        leavers: overall_stat.leavers_in_year,
        overall_turnover_rate: overall_stat.turnover_rate,
        turnover,
        sex_distribution,
        age_distribution,
        executives,
        countries,
        available_years,
        excluded_from_dated_counts: excluded,
        issues,
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn date_issues(
    index: usize,
    employee: &EmployeeRecord,
    hire: &DateField,
    exit: &DateField,
) -> Vec<RecordIssue> {
    let mut issues = Vec::new();
    for (field, value) in [("hire date", hire), ("exit date", exit)] {
        if let Some(failure) = value.failure() {
            issues.push(RecordIssue::new(
                index,
                IssueKind::UnparseableDate,
                format!("{} {}: {}", employee.name, field, failure),
            ));
        }
    }
    if let (Some(h), Some(e)) = (hire.date(), exit.date()) {
        if e < h {
            issues.push(RecordIssue::new(
                index,
                IssueKind::ExitBeforeHire,
                format!(
                    "{}: exit date {} is before hire date {}; excluded from headcount and turnover",
                    employee.name, e, h
                ),
            ));
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn emp(sex: &str, age: u32, hire: &str, exit: Option<&str>) -> EmployeeRecord {
        EmployeeRecord {
            name: format!("{sex}-{age}"),
            sex: Sex::from_label(sex),
            age: Some(age),
            hire_date: Some(hire.into()),
            exit_date: exit.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_all_zero() {
        let s = workforce_stats(&[], 2025, &EngineConfig::default());
        assert_eq!(s.total_employees, 0);
        assert_eq!(s.turnover.len(), 1 + 3 + 4);
        assert!(s.turnover.iter().all(|t| t.turnover_rate == Decimal::ZERO));
        assert_eq!(s.available_years, vec![2025]);
        assert!(s.sex_distribution.iter().all(|d| d.percent == Decimal::ZERO));
    }

    #[test]
    fn test_cohort_turnover() {
        let employees = vec![
            emp("F", 25, "2020-01-01", Some("2025-06-30")),
            emp("F", 28, "2021-01-01", None),
            emp("M", 45, "2019-01-01", None),
            emp("M", 55, "2018-01-01", None),
        ];
        let s = workforce_stats(&employees, 2025, &EngineConfig::default());
        let female = s.turnover.iter().find(|t| t.cohort == "Female").unwrap();
        assert_eq!(female.headcount_at_start, 2);
        assert_eq!(female.headcount_at_end, 1);
        assert_eq!(female.average_headcount, dec!(1.5));
        let young = s.turnover.iter().find(|t| t.cohort == "<30").unwrap();
        assert_eq!(young.leavers_in_year, 1);
        let male = s.turnover.iter().find(|t| t.cohort == "Male").unwrap();
        assert_eq!(male.turnover_rate, Decimal::ZERO);
        assert_eq!(s.available_years, vec![2025]);
    }

    #[test]
    fn test_unparseable_dates_stay_in_totals() {
        let employees = vec![
            emp("M", 40, "someday", None),
            emp("F", 40, "2020-01-01", None),
        ];
        let s = workforce_stats(&employees, 2025, &EngineConfig::default());
        assert_eq!(s.total_employees, 2);
        assert_eq!(s.headcount_at_end, 1);
        assert_eq!(s.excluded_from_dated_counts, 1);
        assert_eq!(s.issues[0].kind, IssueKind::UnparseableDate);
    }

    #[test]
    fn test_exit_before_hire_flagged() {
        let employees = vec![emp("M", 40, "2025-05-01", Some("2024-01-01"))];
        let s = workforce_stats(&employees, 2025, &EngineConfig::default());
        assert_eq!(s.issues.len(), 1);
        assert_eq!(s.issues[0].kind, IssueKind::ExitBeforeHire);
        assert_eq!(s.headcount_at_end, 0);
        assert_eq!(s.total_employees, 1);
    }
}
