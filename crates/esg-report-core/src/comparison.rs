use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{safe_div, Percent};

/// Which way a figure moved between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

impl Direction {
    /// Lower-case word used in narratives ("increased", "decreased", ...).
    pub fn word(&self) -> &'static str {
        match self {
            Direction::Increased => "increased",
            Direction::Decreased => "decreased",
            Direction::Unchanged => "remained unchanged",
        }
    }
}

/// Change between a current and a prior figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub direction: Direction,
    /// |current - prior| / |prior| × 100, or 0 when prior is 0
    pub percent_change: Percent,
}

/// Where a prior-period figure came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorBasis {
    /// Taken from recorded data for that period.
    #[default]
    Measured,
    /// Supplied by the caller as an estimate; must be labelled as such.
    Estimated,
}

/// A prior-period figure together with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorFigure {
    pub value: Decimal,
    #[serde(default)]
    pub basis: PriorBasis,
}

impl PriorFigure {
    pub fn measured(value: Decimal) -> Self {
        PriorFigure {
            value,
            basis: PriorBasis::Measured,
        }
    }

    pub fn estimated(value: Decimal) -> Self {
        PriorFigure {
            value,
            basis: PriorBasis::Estimated,
        }
    }
}

/// A comparison that remembers whether its baseline was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledComparison {
    pub current: Decimal,
    pub prior: Decimal,
    pub basis: PriorBasis,
    #[serde(flatten)]
    pub comparison: Comparison,
}

/// Compare a current figure against a prior one.
pub fn compare(current: Decimal, prior: Decimal) -> Comparison {
    let direction = match current.cmp(&prior) {
        std::cmp::Ordering::Greater => Direction::Increased,
        std::cmp::Ordering::Less => Direction::Decreased,
        std::cmp::Ordering::Equal => Direction::Unchanged,
    };
    let percent_change =
        safe_div(current.saturating_sub(prior).abs(), prior.abs()).saturating_mul(dec!(100));
    Comparison {
        direction,
        percent_change,
    }
}

/// [`compare`] against a figure whose provenance is carried to the output.
pub fn compare_labeled(current: Decimal, prior: &PriorFigure) -> LabeledComparison {
    LabeledComparison {
        current,
        prior: prior.value,
        basis: prior.basis,
        comparison: compare(current, prior.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_fifteen_percent() {
        let c = compare(dec!(115), dec!(100));
        assert_eq!(c.direction, Direction::Increased);
        assert_eq!(c.percent_change, dec!(15));
    }

    #[test]
    fn test_decrease_is_positive_magnitude() {
        let c = compare(dec!(80), dec!(100));
        assert_eq!(c.direction, Direction::Decreased);
        assert_eq!(c.percent_change, dec!(20));
    }

    #[test]
    fn test_zero_prior_defined_as_zero() {
        let c = compare(dec!(50), Decimal::ZERO);
        assert_eq!(c.direction, Direction::Increased);
        assert_eq!(c.percent_change, Decimal::ZERO);
    }

    #[test]
    fn test_unchanged_only_when_equal() {
        assert_eq!(compare(dec!(10), dec!(10.0)).direction, Direction::Unchanged);
        assert_eq!(
            compare(dec!(10.0000001), dec!(10)).direction,
            Direction::Increased
        );
    }

    #[test]
    fn test_estimated_basis_carried() {
        let c = compare_labeled(dec!(115), &PriorFigure::estimated(dec!(100)));
        assert_eq!(c.basis, PriorBasis::Estimated);
        assert_eq!(c.comparison.percent_change, dec!(15));
    }

    #[test]
    fn test_extreme_figures_saturate() {
        let c = compare(Decimal::MAX, dec!(-1));
        assert_eq!(c.direction, Direction::Increased);
        assert_eq!(c.percent_change, Decimal::MAX);
    }
}
