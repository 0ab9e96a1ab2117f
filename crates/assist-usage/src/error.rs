//! Error types for assist-usage

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using assist-usage Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while downloading or formatting usage
#[derive(Error, Debug)]
pub enum Error {
    /// The requested range is empty or reversed
    #[error("Start date {start} should be before end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The request never completed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The usage endpoint answered with a non-success status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// The response body was not a usage document
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Every attempt for one day failed
    #[error("Download failed for {date} after {attempts} attempts: {source}")]
    ExhaustedRetries {
        date: NaiveDate,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// The error that ended a day's attempts, if this is a retry exhaustion
    pub fn last_cause(&self) -> Option<&Error> {
        match self {
            Error::ExhaustedRetries { source, .. } => Some(source),
            _ => None,
        }
    }
}
