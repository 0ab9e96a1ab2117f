//! Error types for assist-chat

use thiserror::Error;

/// Result type alias using assist-chat Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running a chat session
#[derive(Error, Debug)]
pub enum Error {
    /// The request never completed (connect, DNS, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status
    #[error("HTTP status {status}")]
    Status { status: u16 },

    /// Reading the response body failed after the reply had started
    #[error("Stream error: {0}")]
    Stream(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the history file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokenizer tables could not be loaded
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Nothing to send
    #[error("Input is empty")]
    EmptyInput,

    /// Nothing to copy or export
    #[error("No messages")]
    EmptyHistory,
}

impl Error {
    /// Whether this error happened before any reply was received
    pub fn is_request_failure(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Status { .. })
    }

    /// Whether this is a local guard rather than an I/O failure
    pub fn is_guard(&self) -> bool {
        matches!(self, Error::EmptyInput | Error::EmptyHistory)
    }
}
