//! Error types for snapshot building

use thiserror::Error;

/// Result type alias for snapshot operations
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Errors that can occur while building, writing or reading snapshots
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// I/O errors (snapshot files, output directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot document does not have the expected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fetcher setup errors
    #[error("Fetcher error: {0}")]
    Fetch(#[from] savant_fetcher::FetchError),

    /// Identity resolution setup errors
    #[error("Registry error: {0}")]
    Registry(#[from] player_registry::RegistryError),
}

impl SnapshotError {
    /// Create a new schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is a missing file
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl From<config::ConfigError> for SnapshotError {
    fn from(err: config::ConfigError) -> Self {
        SnapshotError::Config(err.to_string())
    }
}
