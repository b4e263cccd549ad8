use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::EsgReportError;
use crate::types::Share;
use crate::EsgReportResult;

/// Tunables shared by every engine operation.
///
/// All fields carry serde defaults so a partial YAML/JSON document (or `{}`)
/// deserializes to a usable configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Groups whose share of the grand total falls below this fraction are
    /// flagged `low_significance` (still counted in totals and tables).
    pub display_threshold: Share,
    /// Position text that marks an employee as an executive.
    pub executive_position: String,
    /// `(prior, current)` years used by the year-over-year table.
    pub comparison_years: (i32, i32),
    /// Group key for records missing the grouping attribute.
    pub unknown_label: String,
    /// Group key for records without a location.
    pub unknown_location_label: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            display_threshold: dec!(0.05),
            executive_position: "Executive".to_string(),
            comparison_years: (2024, 2025),
            unknown_label: "Unknown".to_string(),
            unknown_location_label: "Unknown Location".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> EsgReportResult<()> {
        if self.display_threshold < Decimal::ZERO || self.display_threshold > Decimal::ONE {
            return Err(EsgReportError::InvalidInput {
                field: "display_threshold".into(),
                reason: "Display threshold must be between 0 and 1.".into(),
            });
        }
        let (prior, current) = self.comparison_years;
        if prior == current {
            return Err(EsgReportError::InvalidInput {
                field: "comparison_years".into(),
                reason: "Comparison years must differ.".into(),
            });
        }
        Ok(())
    }

    /// Whether a free-text position names the executive sentinel.
    pub fn is_executive_position(&self, position: &str) -> bool {
        position
            .trim()
            .eq_ignore_ascii_case(self.executive_position.trim())
    }
}
