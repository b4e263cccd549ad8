pub mod comparison;
pub mod config;
pub mod dates;
pub mod error;
pub mod records;
pub mod types;

#[cfg(feature = "emissions")]
pub mod emissions;

#[cfg(feature = "workforce")]
pub mod workforce;

#[cfg(feature = "reporting")]
pub mod reporting;

pub use config::EngineConfig;
pub use error::EsgReportError;
pub use types::*;

/// Standard result type for all esg-report operations
pub type EsgReportResult<T> = Result<T, EsgReportError>;
