//! Error types for provider access

use thiserror::Error;

/// Result type alias for fetch operations
pub type Result<T> = std::result::Result<T, FetchError>;

/// Errors raised while talking to an external statistics provider
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport failures (DNS, TLS, timeouts, connection resets)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider returned {status} for {url}")]
    Status { status: u16, url: String },

    /// Malformed CSV leaderboard
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON payload
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider answered but had nothing for the query
    #[error("Empty result for {0}")]
    EmptyResult(String),

    /// Season or threshold outside the accepted range
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Create a new invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether a retry could plausibly change the answer
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Http(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<config::ConfigError> for FetchError {
    fn from(err: config::ConfigError) -> Self {
        FetchError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: u16) -> FetchError {
        FetchError::Status { status: code, url: "https://baseballsavant.mlb.com".to_string() }
    }

    #[test]
    fn test_transient_classification() {
        assert!(status(429).is_transient());
        assert!(status(500).is_transient());
        assert!(status(503).is_transient());

        assert!(!status(404).is_transient());
        assert!(!status(400).is_transient());
        assert!(!FetchError::EmptyResult("sprint speed 2024".to_string()).is_transient());
        assert!(!FetchError::invalid_request("threshold must be positive").is_transient());
        assert!(!FetchError::config("bad").is_transient());
    }
}
