//! Error types for blockingmachine.

use thiserror::Error;

/// Error type for blockingmachine operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid source fields, unknown category
    #[error("configuration error: {0}")]
    Config(String),

    /// Unknown category identifier
    #[error("invalid category: {0}")]
    InvalidCategory(String),

    /// No sources configured
    #[error("no sources configured: at least one source is required")]
    NoSources,

    /// No configuration file found
    #[error("no configuration file found in {0}")]
    ConfigNotFound(String),

    /// Retry budget exhausted for a source download
    #[error("failed to fetch {url} after {attempts} attempts: {cause}")]
    Fetch {
        url: String,
        attempts: u32,
        cause: String,
    },

    /// Record store failure
    #[error("store error: {0}")]
    Persist(String),

    /// Unrecognized export format
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON store encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether this error only affects a single source during ingestion.
    ///
    /// Source-scoped errors are recorded in the run summary; everything else
    /// ends the run.
    pub fn is_source_scoped(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::InvalidCategory(_) | Error::Fetch { .. }
        )
    }
}

/// Result type alias for blockingmachine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single HTTP attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// Server answered with a non-success status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Connection, TLS, timeout or body read failure
    #[error("transport error: {0}")]
    Transport(String),
}
