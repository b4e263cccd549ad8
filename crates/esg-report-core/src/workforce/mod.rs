pub mod stats;
pub mod turnover;

pub use stats::{
    compute_stats, workforce_stats, DistributionEntry, ExecutiveSummary, WorkforceInput,
    WorkforceStats,
};
pub use turnover::{CohortDimension, TurnoverStat};
