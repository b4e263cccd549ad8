pub mod assembler;
pub mod export;
pub mod narrative;

pub use assembler::{
    assemble, build_report, compare_with_prior, HeadlineTotals, PriorPeriodFigures,
    ReportComparisons, ReportInput, ReportPayload, ReportRow, ReportSummary,
};
pub use export::{calendar_series, chart_series, export_table, ChartSeries, TabularExport};
pub use narrative::{NarrativeInputs, NOT_AVAILABLE};
