use thiserror::Error;

use crate::dates::ParseFailure;

#[derive(Debug, Error)]
pub enum EsgReportError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<ParseFailure> for EsgReportError {
    fn from(e: ParseFailure) -> Self {
        EsgReportError::DateError(e.to_string())
    }
}

impl From<serde_json::Error> for EsgReportError {
    fn from(e: serde_json::Error) -> Self {
        EsgReportError::SerializationError(e.to_string())
    }
}

impl From<csv::Error> for EsgReportError {
    fn from(e: csv::Error) -> Self {
        EsgReportError::SerializationError(e.to_string())
    }
}
