use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::dates::DateField;
use crate::types::{percent_of, Percent};

/// Dimension a cohort is cut along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortDimension {
    Overall,
    Sex,
    AgeBand,
}

/// Headcount movement and turnover of one cohort over one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverStat {
    pub dimension: CohortDimension,
    pub cohort: String,
    pub reference_year: i32,
    /// Hired on or before Jan 1 and not gone before it
    pub headcount_at_start: u32,
    /// Hired by Dec 31 and still employed after it
    pub headcount_at_end: u32,
    pub leavers_in_year: u32,
    pub new_hires_in_year: u32,
    /// (start + end) / 2
    pub average_headcount: Decimal,
    /// leavers / average_headcount × 100, 0 when the average is 0
    pub turnover_rate: Percent,
}

/// Where one employee sits relative to a reference year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct YearPosition {
    pub at_start: bool,
    pub at_end: bool,
    pub left_in_year: bool,
    pub hired_in_year: bool,
}

impl YearPosition {
    /// `None` when a date is present but unusable; such records only count
    /// toward unconditional totals.
    pub fn of(hire: &DateField, exit: &DateField, year: i32) -> Option<YearPosition> {
        let (Some(first), Some(last)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return None;
        };

        let hire = match hire {
            DateField::Parsed(d) => Some(*d),
            DateField::Missing => None,
            DateField::Unparseable(_) => return None,
        };
        let exit = match exit {
            DateField::Parsed(d) => Some(*d),
            DateField::Missing => None,
            DateField::Unparseable(_) => return None,
        };
        if let (Some(h), Some(e)) = (hire, exit) {
            if e < h {
                return None;
            }
        }

        let employed_through = |boundary: NaiveDate, inclusive: bool| match exit {
            None => true,
            Some(e) if inclusive => e >= boundary,
            Some(e) => e > boundary,
        };

        Some(YearPosition {
            at_start: hire.is_some_and(|h| h <= first) && employed_through(first, true),
            at_end: hire.is_some_and(|h| h <= last) && employed_through(last, false),
            left_in_year: exit.is_some_and(|e| e.year() == year),
            hired_in_year: hire.is_some_and(|h| h.year() == year),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CohortCounter {
    start: u32,
    end: u32,
    leavers: u32,
    hires: u32,
}

impl CohortCounter {
    pub fn observe(&mut self, pos: &YearPosition) {
        self.start += u32::from(pos.at_start);
        self.end += u32::from(pos.at_end);
        self.leavers += u32::from(pos.left_in_year);
        self.hires += u32::from(pos.hired_in_year);
    }

    pub fn to_stat(self, dimension: CohortDimension, cohort: &str, year: i32) -> TurnoverStat {
        let average = Decimal::from(self.start + self.end) / dec!(2);
        TurnoverStat {
            dimension,
            cohort: cohort.to_string(),
            reference_year: year,
            headcount_at_start: self.start,
            headcount_at_end: self.end,
            leavers_in_year: self.leavers,
            new_hires_in_year: self.hires,
            average_headcount: average,
            turnover_rate: percent_of(Decimal::from(self.leavers), average),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> DateField {
        DateField::Parsed(NaiveDate::from_ymd_opt(y, m, day).unwrap())
    }

    #[test]
    fn test_hired_on_jan_first_counts_at_start() {
        let p = YearPosition::of(&d(2025, 1, 1), &DateField::Missing, 2025).unwrap();
        assert!(p.at_start && p.at_end && p.hired_in_year);
    }

    #[test]
    fn test_leaver_on_dec_31_not_at_end() {
        let p = YearPosition::of(&d(2020, 5, 1), &d(2025, 12, 31), 2025).unwrap();
        assert!(p.at_start);
        assert!(!p.at_end);
        assert!(p.left_in_year);
    }

    #[test]
    fn test_left_before_year_not_counted() {
        let p = YearPosition::of(&d(2020, 5, 1), &d(2023, 6, 1), 2025).unwrap();
        assert_eq!(p, YearPosition::default());
    }

    #[test]
    fn test_exit_before_hire_excluded() {
        assert!(YearPosition::of(&d(2025, 5, 1), &d(2025, 1, 1), 2025).is_none());
    }

    #[test]
    fn test_missing_hire_still_counts_leaver() {
        let p = YearPosition::of(&DateField::Missing, &d(2025, 3, 1), 2025).unwrap();
        assert!(p.left_in_year);
        assert!(!p.at_start && !p.at_end);
    }

    #[test]
    fn test_counter_zero_guard() {
        let s = CohortCounter::default().to_stat(CohortDimension::Overall, "Overall", 2025);
        assert_eq!(s.average_headcount, Decimal::ZERO);
        assert_eq!(s.turnover_rate, Decimal::ZERO);
    }
}
