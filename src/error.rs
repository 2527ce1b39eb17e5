//! Error types for the job runner.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the job runner.
#[derive(Error, Debug)]
pub enum Error {
    // Script errors
    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("Invalid script: {0}")]
    InvalidScript(String),

    #[error("Unknown job type: {0}")]
    UnknownJobType(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    // Database errors
    #[error("Unknown database: {0}")]
    UnknownDatabase(String),

    #[error("Query failed: {0}")]
    Query(String),

    // Job errors
    #[error("Missing setting: {0}")]
    MissingSetting(String),

    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },

    #[error("Job failed: {0}")]
    JobFailed(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // TOML errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Create an invalid setting error.
    pub fn invalid_setting<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Error::InvalidSetting {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        Error::Query(e.to_string())
    }
}
