use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dates::{self, DateField, DateValue};
use crate::types::{Emissions, Factor, IssueKind, Quantity, RecordIssue};

// ---------------------------------------------------------------------------
// Types: categories
// ---------------------------------------------------------------------------

/// GHG Protocol scope a category reports under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    Scope1,
    Scope2,
    Scope3,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Scope1, Scope::Scope2, Scope::Scope3];

    pub fn label(&self) -> &'static str {
        match self {
            Scope::Scope1 => "Scope 1",
            Scope::Scope2 => "Scope 2",
            Scope::Scope3 => "Scope 3",
        }
    }
}

/// Activity category. Declaration order is the fixed report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    #[serde(alias = "stationary")]
    StationaryCombustion,
    #[serde(alias = "mobile")]
    MobileCombustion,
    #[serde(alias = "process")]
    ProcessEmission,
    Refrigerant,
    Electricity,
    Water,
    #[serde(alias = "paper")]
    PaperWaste,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 7] = [
        ActivityCategory::StationaryCombustion,
        ActivityCategory::MobileCombustion,
        ActivityCategory::ProcessEmission,
        ActivityCategory::Refrigerant,
        ActivityCategory::Electricity,
        ActivityCategory::Water,
        ActivityCategory::PaperWaste,
    ];

    /// Position in [`ActivityCategory::ALL`], the fixed report order.
    pub const fn index(&self) -> usize {
        match self {
            ActivityCategory::StationaryCombustion => 0,
            ActivityCategory::MobileCombustion => 1,
            ActivityCategory::ProcessEmission => 2,
            ActivityCategory::Refrigerant => 3,
            ActivityCategory::Electricity => 4,
            ActivityCategory::Water => 5,
            ActivityCategory::PaperWaste => 6,
        }
    }

    /// Short report code, e.g. "1a".
    pub fn code(&self) -> &'static str {
        match self {
            ActivityCategory::StationaryCombustion => "1a",
            ActivityCategory::MobileCombustion => "1b",
            ActivityCategory::ProcessEmission => "1c",
            ActivityCategory::Refrigerant => "1d",
            ActivityCategory::Electricity => "2",
            ActivityCategory::Water => "3a",
            ActivityCategory::PaperWaste => "3b",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityCategory::StationaryCombustion => "Stationary Combustion",
            ActivityCategory::MobileCombustion => "Mobile Combustion",
            ActivityCategory::ProcessEmission => "Process Emission",
            ActivityCategory::Refrigerant => "Refrigerant",
            ActivityCategory::Electricity => "Electricity",
            ActivityCategory::Water => "Water",
            ActivityCategory::PaperWaste => "Paper Waste",
        }
    }

    pub fn scope(&self) -> Scope {
        match self {
            ActivityCategory::StationaryCombustion
            | ActivityCategory::MobileCombustion
            | ActivityCategory::ProcessEmission
            | ActivityCategory::Refrigerant => Scope::Scope1,
            ActivityCategory::Electricity => Scope::Scope2,
            ActivityCategory::Water | ActivityCategory::PaperWaste => Scope::Scope3,
        }
    }

    /// Unit of `quantity` for this category. Quantities are never converted
    /// between categories.
    pub fn unit(&self) -> &'static str {
        match self {
            ActivityCategory::StationaryCombustion | ActivityCategory::MobileCombustion => "L",
            ActivityCategory::ProcessEmission
            | ActivityCategory::Refrigerant
            | ActivityCategory::PaperWaste => "kg",
            ActivityCategory::Electricity => "kWh",
            ActivityCategory::Water => "m3",
        }
    }
}

// ---------------------------------------------------------------------------
// Types: records
// ---------------------------------------------------------------------------

/// How a utility quantity was billed to the organisation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BillingMode {
    /// The organisation is billed for exactly its own consumption.
    #[default]
    DirectBilling,
    /// A whole-building bill shared by floor area. The record's `quantity`
    /// is the building total.
    AreaApportioned {
        org_area: Decimal,
        building_area: Decimal,
    },
}

/// One measured activity contributing to emissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub category: ActivityCategory,
    /// Fuel, vehicle, refrigerant type or disposal method
    #[serde(default)]
    pub subtype: String,
    pub quantity: Quantity,
    pub emission_factor: Factor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_date: Option<DateValue>,
    #[serde(default)]
    pub billing: BillingMode,
}

impl ActivityRecord {
    pub fn new(
        category: ActivityCategory,
        subtype: impl Into<String>,
        quantity: Quantity,
        emission_factor: Factor,
    ) -> Self {
        ActivityRecord {
            category,
            subtype: subtype.into(),
            quantity,
            emission_factor,
            location_id: None,
            period_date: None,
            billing: BillingMode::DirectBilling,
        }
    }

    pub fn with_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_period_date(mut self, date: impl Into<DateValue>) -> Self {
        self.period_date = Some(date.into());
        self
    }

    pub fn apportioned(mut self, org_area: Decimal, building_area: Decimal) -> Self {
        self.billing = BillingMode::AreaApportioned {
            org_area,
            building_area,
        };
        self
    }

    pub fn is_apportioned(&self) -> bool {
        matches!(self.billing, BillingMode::AreaApportioned { .. })
    }

    /// Fraction of the billed quantity attributable to the organisation.
    /// `None` when the division overflows.
    pub fn area_ratio(&self) -> Option<Decimal> {
        match &self.billing {
            BillingMode::DirectBilling => Some(Decimal::ONE),
            BillingMode::AreaApportioned {
                org_area,
                building_area,
            } => {
                if *building_area <= Decimal::ZERO || *org_area <= Decimal::ZERO {
                    Some(Decimal::ZERO)
                } else {
                    org_area.checked_div(*building_area)
                }
            }
        }
    }

    /// `(attributed quantity, emissions)`, or `None` when either product
    /// falls outside the decimal range. Negative inputs count as 0.
    pub fn checked_amounts(&self) -> Option<(Quantity, Emissions)> {
        let quantity = self
            .quantity
            .max(Decimal::ZERO)
            .checked_mul(self.area_ratio()?)?;
        let emissions = quantity.checked_mul(self.emission_factor.max(Decimal::ZERO))?;
        Some((quantity, emissions))
    }

    /// Quantity attributed to the organisation (never negative, 0 on overflow).
    pub fn attributed_quantity(&self) -> Quantity {
        self.checked_amounts().map_or(Decimal::ZERO, |(q, _)| q)
    }

    /// `quantity × factor`, or `(org_area / building_area) × quantity × factor`
    /// for apportioned bills. Always derived, never stored. Records whose
    /// product overflows count as 0 and carry an [`IssueKind::Overflow`].
    pub fn emissions(&self) -> Emissions {
        self.checked_amounts().map_or(Decimal::ZERO, |(_, e)| e)
    }

    pub fn period(&self) -> DateField {
        dates::resolve(self.period_date.as_ref())
    }

    /// Inconsistencies on this record. `index` is its position in the input.
    pub fn issues(&self, index: usize) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        if self.quantity < Decimal::ZERO {
            issues.push(RecordIssue::new(
                index,
                IssueKind::NegativeQuantity,
                format!("negative quantity {} treated as 0", self.quantity),
            ));
        }
        if self.emission_factor < Decimal::ZERO {
            issues.push(RecordIssue::new(
                index,
                IssueKind::NegativeFactor,
                format!(
                    "negative emission factor {} treated as 0",
                    self.emission_factor
                ),
            ));
        }
        if let BillingMode::AreaApportioned {
            org_area,
            building_area,
        } = &self.billing
        {
            if *building_area <= Decimal::ZERO {
                issues.push(RecordIssue::new(
                    index,
                    IssueKind::InvalidArea,
                    "building area must be positive; apportioned emissions set to 0",
                ));
            } else if *org_area < Decimal::ZERO {
                issues.push(RecordIssue::new(
                    index,
                    IssueKind::InvalidArea,
                    format!(
                        "negative occupied area {} treated as 0; apportioned emissions set to 0",
                        org_area
                    ),
                ));
            } else if org_area > building_area {
                issues.push(RecordIssue::new(
                    index,
                    IssueKind::AreaExceedsBuilding,
                    format!(
                        "occupied area {} exceeds building area {}",
                        org_area, building_area
                    ),
                ));
            }
        }
        if self.checked_amounts().is_none() {
            issues.push(RecordIssue::new(
                index,
                IssueKind::Overflow,
                format!(
                    "quantity {} × factor {} is out of range; excluded from totals",
                    self.quantity, self.emission_factor
                ),
            ));
        }
        if let DateField::Unparseable(failure) = self.period() {
            issues.push(RecordIssue::new(
                index,
                IssueKind::UnparseableDate,
                format!("{}; excluded from period breakdowns", failure),
            ));
        }
        issues
    }
}
