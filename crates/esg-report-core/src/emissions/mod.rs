pub mod aggregate;
pub mod monthly;
pub mod scope;
pub mod yoy;

pub use aggregate::{
    aggregate, group_records, AggregationInput, AggregationOutput, GroupKey, PeriodAggregate,
    RecordFilter,
};
pub use monthly::{monthly_by_location, LocationMonthly, MonthlyBreakdown, MonthlyInput};
pub use scope::{scope_totals, summarize_scopes, ScopeInput, ScopeSummary, ScopeTotal};
pub use yoy::{year_over_year, YearOverYearInput, YearOverYearRow, YearOverYearTable};
