use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dates::{self, DateField, DateValue};

/// Sex as reported, normalized from free text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub const ALL: [Sex; 3] = [Sex::Male, Sex::Female, Sex::Unknown];

    /// Accepts "M", "Male", "F", "Female" (any case) and the Korean
    /// equivalents used on uploaded sheets. Anything else is `Unknown`.
    pub fn from_label(label: &str) -> Sex {
        match label.trim().to_lowercase().as_str() {
            "m" | "male" | "man" | "남" | "남성" | "남자" => Sex::Male,
            "f" | "female" | "woman" | "여" | "여성" | "여자" => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Unknown => "Unknown",
        }
    }
}

impl From<Option<String>> for Sex {
    fn from(label: Option<String>) -> Self {
        label.as_deref().map(Sex::from_label).unwrap_or_default()
    }
}

/// Age cohorts used in workforce breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeBand {
    Under30,
    From30To50,
    Over50,
    Unknown,
}

impl AgeBand {
    pub const ALL: [AgeBand; 4] = [
        AgeBand::Under30,
        AgeBand::From30To50,
        AgeBand::Over50,
        AgeBand::Unknown,
    ];

    /// 30 and 50 both fall in the middle band.
    pub fn of(age: Option<u32>) -> AgeBand {
        match age {
            Some(a) if a < 30 => AgeBand::Under30,
            Some(a) if a <= 50 => AgeBand::From30To50,
            Some(_) => AgeBand::Over50,
            None => AgeBand::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Under30 => "<30",
            AgeBand::From30To50 => "30-50",
            AgeBand::Over50 => ">50",
            AgeBand::Unknown => "Unknown",
        }
    }
}

/// One workforce member snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sex: Sex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// Free-text job title; compared against the executive sentinel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<DateValue>,
    /// Absent while the person is still employed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_date: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl EmployeeRecord {
    pub fn is_executive(&self, config: &EngineConfig) -> bool {
        self.position
            .as_deref()
            .is_some_and(|p| config.is_executive_position(p))
    }

    pub fn age_band(&self) -> AgeBand {
        AgeBand::of(self.age)
    }

    pub fn hire(&self) -> DateField {
        dates::resolve(self.hire_date.as_ref())
    }

    pub fn exit(&self) -> DateField {
        dates::resolve(self.exit_date.as_ref())
    }

    /// Trimmed, non-empty country.
    pub fn country_name(&self) -> Option<&str> {
        self.country
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_normalization() {
        assert_eq!(Sex::from_label("M"), Sex::Male);
        assert_eq!(Sex::from_label(" female "), Sex::Female);
        assert_eq!(Sex::from_label("여"), Sex::Female);
        assert_eq!(Sex::from_label("x"), Sex::Unknown);
        assert_eq!(Sex::from_label(""), Sex::Unknown);
    }

    #[test]
    fn test_age_bands_boundaries() {
        assert_eq!(AgeBand::of(Some(29)), AgeBand::Under30);
        assert_eq!(AgeBand::of(Some(30)), AgeBand::From30To50);
        assert_eq!(AgeBand::of(Some(50)), AgeBand::From30To50);
        assert_eq!(AgeBand::of(Some(51)), AgeBand::Over50);
        assert_eq!(AgeBand::of(None), AgeBand::Unknown);
    }

    #[test]
    fn test_deserialize_free_text_sex() {
        let json = r#"[
            {"name": "A", "sex": "F", "position": "Executive", "hire_date": 43831},
            {"name": "B", "sex": null},
            {"name": "C"}
        ]"#;
        let rows: Vec<EmployeeRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(rows[0].sex, Sex::Female);
        assert!(rows[0].is_executive(&EngineConfig::default()));
        assert_eq!(rows[0].hire().year(), Some(2020));
        assert_eq!(rows[1].sex, Sex::Unknown);
        assert_eq!(rows[2].sex, Sex::Unknown);
        assert!(!rows[2].is_executive(&EngineConfig::default()));
    }

    #[test]
    fn test_country_name_blank_is_none() {
        let e = EmployeeRecord {
            country: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(e.country_name(), None);
    }
}
