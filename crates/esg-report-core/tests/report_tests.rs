use chrono::NaiveDate;
use esg_report_core::comparison::{compare, Direction, PriorBasis};
use esg_report_core::dates::{self, DateValue};
use esg_report_core::emissions::{GroupKey, RecordFilter};
use esg_report_core::records::{ActivityCategory, ActivityRecord};
use esg_report_core::reporting::{build_report, export_table, PriorPeriodFigures, ReportInput};
use esg_report_core::EngineConfig;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

fn mobile_records() -> Vec<ActivityRecord> {
    vec![
        ActivityRecord::new(ActivityCategory::MobileCombustion, "Gasoline", dec!(300), dec!(2.3))
            .with_period_date("2025-02-11"),
        ActivityRecord::new(ActivityCategory::MobileCombustion, "Diesel", dec!(120), dec!(2.6))
            .with_period_date("2025-05-20"),
        ActivityRecord::new(ActivityCategory::MobileCombustion, "LPG", dec!(2), dec!(1.8))
            .with_period_date("2025-05-21"),
        ActivityRecord::new(ActivityCategory::MobileCombustion, "Hydrogen", Decimal::ZERO, dec!(0))
            .with_period_date("2025-05-22"),
    ]
}

fn report_input(prior: Option<PriorPeriodFigures>) -> ReportInput {
    ReportInput {
        title: "Mobile combustion".into(),
        records: mobile_records(),
        group_by: GroupKey::Subtype,
        filter: RecordFilter::year(2025),
        locations: vec![],
        prior,
        period_label: None,
        include_narrative: true,
        config: EngineConfig::default(),
    }
}

// ===========================================================================
// Comparison and dates
// ===========================================================================

#[test]
fn test_year_comparison_scenario() {
    let c = compare(dec!(115), dec!(100));
    assert_eq!(c.direction, Direction::Increased);
    assert_eq!(c.percent_change, dec!(15));
}

#[test]
fn test_comparison_against_zero_prior() {
    let c = compare(dec!(40), Decimal::ZERO);
    assert_eq!(c.direction, Direction::Increased);
    assert_eq!(c.percent_change, Decimal::ZERO);
}

#[test]
fn test_date_round_trip_serial_and_iso() {
    let samples = [
        NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
        NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
    ];
    for date in samples {
        let serial = DateValue::Serial(dates::to_serial(date));
        assert_eq!(dates::normalize(&serial).unwrap(), date);
        let iso = DateValue::Text(dates::to_iso(date));
        assert_eq!(dates::normalize(&iso).unwrap(), date);
    }
}

// ===========================================================================
// Report assembly
// ===========================================================================

#[test]
fn test_report_rows_and_export() {
    let out = build_report(&report_input(None)).unwrap();
    let payload = &out.result;

    assert_eq!(payload.title, "Mobile combustion");
    let descriptions: Vec<&str> = payload.rows.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(descriptions, vec!["Gasoline", "Diesel", "LPG", "Hydrogen"]);
    assert_eq!(payload.summary.total_active_sources, 3);
    assert_eq!(payload.summary.total_emissions, dec!(1005.6));
    assert_eq!(payload.headline.total_emissions.to_string(), "1005.60");
    assert_eq!(payload.low_significance, vec!["LPG".to_string(), "Hydrogen".to_string()]);

    let csv = export_table(payload).to_csv().unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Description,Quantity,EmissionFactor,CO2Emitted");
    assert_eq!(lines[1], "Gasoline,300.0000,2.3000,690.0000");
    assert_eq!(lines[5], "Total Quantity,422.0000");
    assert_eq!(lines[6], "Total Active Sources,3");
    assert_eq!(lines[7], "Total Emissions,1005.6000");
}

#[test]
fn test_report_narrative_without_prior() {
    let payload = build_report(&report_input(None)).unwrap().result;
    let text = payload.narrative.unwrap();
    assert!(text.starts_with("In 2025, total emissions were 1005.60 kgCO2e across 3 active sources."));
    assert!(text.contains("(N/A)"));
    assert!(text.ends_with("Emissions peaked in February 2025."));
}

#[test]
fn test_report_with_estimated_prior_is_labelled() {
    let prior = PriorPeriodFigures {
        label: Some("2024".into()),
        total_quantity: Some(dec!(400)),
        total_emissions: Some(dec!(1100)),
        weighted_factor: Some(dec!(2.75)),
        basis: PriorBasis::Estimated,
    };
    let out = build_report(&report_input(Some(prior))).unwrap();
    let payload = &out.result;

    let emissions = payload.comparisons.emissions.unwrap();
    assert_eq!(emissions.basis, PriorBasis::Estimated);
    assert_eq!(emissions.comparison.direction, Direction::Decreased);
    let quantity = payload.comparisons.quantity.unwrap();
    assert_eq!(quantity.comparison.direction, Direction::Increased);
    assert_eq!(quantity.comparison.percent_change, dec!(5.5));

    let text = payload.narrative.as_deref().unwrap();
    assert!(text.contains("compared with 2024 (estimated baseline)"));
    assert!(out.warnings.iter().any(|w| w.contains("estimates")));
}

#[test]
fn test_report_over_empty_records() {
    let mut input = report_input(None);
    input.records.clear();
    let payload = build_report(&input).unwrap().result;
    assert!(payload.rows.is_empty());
    assert_eq!(payload.summary.total_active_sources, 0);
    assert!(payload.chart.labels.is_empty());
    assert!(payload.narrative.unwrap().ends_with("Emissions peaked in (N/A)."));
}
