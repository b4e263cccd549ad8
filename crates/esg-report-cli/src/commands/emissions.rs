use clap::{Args, ValueEnum};
use serde_json::Value;

use esg_report_core::emissions::{
    self, AggregationInput, GroupKey, MonthlyInput, ScopeInput, YearOverYearInput,
};
use esg_report_core::EngineConfig;

use crate::input;

/// Grouping key accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupBy {
    Category,
    Subtype,
    Location,
    Month,
}

impl From<GroupBy> for GroupKey {
    fn from(g: GroupBy) -> Self {
        match g {
            GroupBy::Category => GroupKey::Category,
            GroupBy::Subtype => GroupKey::Subtype,
            GroupBy::Location => GroupKey::Location,
            GroupBy::Month => GroupKey::Month,
        }
    }
}

/// Arguments for emissions aggregation
#[derive(Args)]
pub struct AggregateArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Override the input's grouping key
    #[arg(long)]
    pub group_by: Option<GroupBy>,

    /// Only include records dated in this year
    #[arg(long)]
    pub year: Option<i32>,
}

/// Arguments for the monthly view by location
#[derive(Args)]
pub struct MonthlyArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Only include records dated in this year
    #[arg(long)]
    pub year: Option<i32>,
}

/// Arguments for the year-over-year table
#[derive(Args)]
pub struct YoyArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Prior comparison year
    #[arg(long, requires = "current_year")]
    pub prior_year: Option<i32>,

    /// Current comparison year
    #[arg(long, requires = "prior_year")]
    pub current_year: Option<i32>,
}

/// Arguments for the scope summary
#[derive(Args)]
pub struct ScopeArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Only include records dated in this year
    #[arg(long)]
    pub year: Option<i32>,
}

pub fn run_aggregate(
    args: AggregateArgs,
    config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut agg_input: AggregationInput =
        input::read_input(args.input.as_deref(), "emissions aggregation")?;
    if let Some(group_by) = args.group_by {
        agg_input.group_by = group_by.into();
    }
    if let Some(year) = args.year {
        agg_input.filter.year = Some(year);
    }
    if let Some(config) = config {
        agg_input.config = config;
    }
    let result = emissions::aggregate(&agg_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_monthly(
    args: MonthlyArgs,
    config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut monthly_input: MonthlyInput =
        input::read_input(args.input.as_deref(), "the monthly breakdown")?;
    if let Some(year) = args.year {
        monthly_input.filter.year = Some(year);
    }
    if let Some(config) = config {
        monthly_input.config = config;
    }
    let result = emissions::monthly_by_location(&monthly_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_yoy(
    args: YoyArgs,
    config: Option<EngineConfig>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut yoy_input: YearOverYearInput =
        input::read_input(args.input.as_deref(), "the year-over-year table")?;
    if let (Some(prior), Some(current)) = (args.prior_year, args.current_year) {
        yoy_input.years = Some((prior, current));
    }
    if let Some(config) = config {
        yoy_input.config = config;
    }
    let result = emissions::year_over_year(&yoy_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_scopes(args: ScopeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut scope_input: ScopeInput =
        input::read_input(args.input.as_deref(), "the scope summary")?;
    if let Some(year) = args.year {
        scope_input.filter.year = Some(year);
    }
    let result = emissions::summarize_scopes(&scope_input)?;
    Ok(serde_json::to_value(result)?)
}
