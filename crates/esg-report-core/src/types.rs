use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Activity quantities in the unit implied by the record's category.
pub type Quantity = Decimal;

/// Emission factors (kg CO2e per unit of activity).
pub type Factor = Decimal;

/// Emissions in kg CO2e.
pub type Emissions = Decimal;

/// Fractions of a whole (0.05 = 5%). Never as percentages.
pub type Share = Decimal;

/// Percentages expressed 0-100.
pub type Percent = Decimal;

/// Kind of problem found on an otherwise usable input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A date field could not be parsed; the record is left out of
    /// date-bucketed views only.
    UnparseableDate,
    /// Exit date earlier than hire date.
    ExitBeforeHire,
    NegativeQuantity,
    NegativeFactor,
    /// Area-apportioned record with a zero or negative building area.
    InvalidArea,
    /// Occupied area larger than the whole building.
    AreaExceedsBuilding,
    /// Quantity × factor, or a running total, left the decimal range.
    Overflow,
}

/// An inconsistent input record, reported alongside normal results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordIssue {
    /// Position of the record in the caller's input slice
    pub index: usize,
    pub kind: IssueKind,
    pub detail: String,
}

impl RecordIssue {
    pub fn new(index: usize, kind: IssueKind, detail: impl Into<String>) -> Self {
        RecordIssue {
            index,
            kind,
            detail: detail.into(),
        }
    }

    /// One-line rendering used for the envelope's `warnings`.
    pub fn to_warning(&self) -> String {
        format!("record #{}: {}", self.index, self.detail)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// `part / whole × 100`, or zero when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Percent {
    safe_div(part, whole).saturating_mul(dec!(100))
}
