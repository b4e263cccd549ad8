use serde::{Deserialize, Serialize};

use crate::comparison::{LabeledComparison, PriorBasis};
use crate::types::{Emissions, Percent};

use super::export::{format_fixed, HEADLINE_DP};

/// Placeholder for any template slot whose input is unavailable.
pub const NOT_AVAILABLE: &str = "(N/A)";

/// Free inputs to the narrative template. Everything else is computed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeInputs {
    /// e.g. "2025"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_label: Option<String>,
    /// e.g. "2024"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_month: Option<String>,
}

/// Computed values the template is filled with.
pub(crate) struct NarrativeFacts<'a> {
    pub total_emissions: Emissions,
    pub active_sources: usize,
    pub factor_change: Option<&'a LabeledComparison>,
    pub quantity_change: Option<&'a LabeledComparison>,
}

/// Fill the fixed report paragraph. Sentence structure never changes; a
/// missing input becomes [`NOT_AVAILABLE`].
pub(crate) fn render(inputs: &NarrativeInputs, facts: &NarrativeFacts<'_>) -> String {
    let period = inputs.period_label.as_deref().unwrap_or(NOT_AVAILABLE);
    let mut prior = inputs
        .prior_label
        .clone()
        .unwrap_or_else(|| "the prior period".to_string());
    let estimated = [facts.factor_change, facts.quantity_change]
        .iter()
        .flatten()
        .any(|c| c.basis == PriorBasis::Estimated);
    if estimated {
        prior.push_str(" (estimated baseline)");
    }

    let (factor_word, factor_pct) = match facts.factor_change {
        Some(c) => (
            c.comparison.direction.word(),
            pct(c.comparison.percent_change),
        ),
        None => (NOT_AVAILABLE, NOT_AVAILABLE.to_string()),
    };
    let quantity_word = facts
        .quantity_change
        .map(|c| c.comparison.direction.word())
        .unwrap_or(NOT_AVAILABLE);
    let peak = inputs.peak_month.as_deref().unwrap_or(NOT_AVAILABLE);

    format!(
        "In {period}, total emissions were {total} kgCO2e across {sources} active sources. \
         The weighted emission factor {factor_word} by {factor_pct}% compared with {prior}. \
         Activity quantity {quantity_word} over the same period. \
         Emissions peaked in {peak}.",
        total = format_fixed(facts.total_emissions, HEADLINE_DP),
        sources = facts.active_sources,
    )
}

fn pct(value: Percent) -> String {
    format_fixed(value, HEADLINE_DP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::{compare_labeled, PriorFigure};
    use rust_decimal_macros::dec;

    #[test]
    fn test_full_narrative() {
        let factor = compare_labeled(dec!(2.5), &PriorFigure::measured(dec!(2)));
        let quantity = compare_labeled(dec!(80), &PriorFigure::measured(dec!(100)));
        let text = render(
            &NarrativeInputs {
                period_label: Some("2025".into()),
                prior_label: Some("2024".into()),
                peak_month: Some("March".into()),
            },
            &NarrativeFacts {
                total_emissions: dec!(1234.567),
                active_sources: 3,
                factor_change: Some(&factor),
                quantity_change: Some(&quantity),
            },
        );
        assert_eq!(
            text,
            "In 2025, total emissions were 1234.57 kgCO2e across 3 active sources. \
             The weighted emission factor increased by 25.00% compared with 2024. \
             Activity quantity decreased over the same period. \
             Emissions peaked in March."
        );
    }

    #[test]
    fn test_missing_inputs_use_placeholder() {
        let text = render(
            &NarrativeInputs::default(),
            &NarrativeFacts {
                total_emissions: dec!(0),
                active_sources: 0,
                factor_change: None,
                quantity_change: None,
            },
        );
        assert!(text.contains("In (N/A), total emissions were 0.00 kgCO2e"));
        assert!(text.contains("factor (N/A) by (N/A)%"));
        assert!(text.contains("quantity (N/A) over"));
        assert!(text.ends_with("peaked in (N/A)."));
    }

    #[test]
    fn test_estimated_baseline_is_labelled() {
        let factor = compare_labeled(dec!(2), &PriorFigure::estimated(dec!(2)));
        let text = render(
            &NarrativeInputs::default(),
            &NarrativeFacts {
                total_emissions: dec!(1),
                active_sources: 1,
                factor_change: Some(&factor),
                quantity_change: None,
            },
        );
        assert!(text.contains("remained unchanged by 0.00% compared with the prior period (estimated baseline)"));
    }
}
