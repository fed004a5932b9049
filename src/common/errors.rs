//! Error types for the application

use thiserror::Error;

/// Result type alias using our MonitorError
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for monitor operations
#[derive(Error, Debug)]
pub enum MonitorError {
    /// HTTP request errors
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded: {message}, retry after {retry_after_seconds:?} seconds")]
    RateLimit {
        message: String,
        retry_after_seconds: Option<u64>,
    },

    /// Upstream server failure (5xx)
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Invalid API response
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Candle data that violates series ordering or value constraints
    #[error("Invalid candle series: {0}")]
    InvalidSeries(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Persistence store errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    /// A persisted value that cannot be decoded
    #[error("Corrupt persisted state: {0}")]
    CorruptState(String),

    /// Illegal position transition
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            MonitorError::HttpRequest(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.is_request()
                    || e.status().map(|s| s.is_server_error()).unwrap_or(false)
            }
            MonitorError::RateLimit { .. }
            | MonitorError::Server { .. }
            | MonitorError::Timeout(_) => true,
            _ => false,
        }
    }
}

impl From<config::ConfigError> for MonitorError {
    fn from(err: config::ConfigError) -> Self {
        MonitorError::Configuration(err.to_string())
    }
}
