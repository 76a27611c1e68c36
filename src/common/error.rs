//! Error types for testdeck
//!
//! Decode-time anomalies (unknown paths, malformed records) are recoverable
//! by design: the run keeps consuming output and the offending line is
//! downgraded or dropped, never allowed to abort an otherwise healthy suite.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testdeck
#[derive(Error, Debug)]
pub enum Error {
    // === Tree Lookup Errors ===
    #[error("No test found for '{0}'")]
    NotFound(String),

    #[error("Test id '{path}' matched {matches} tests; cannot attribute results")]
    AmbiguousMatch { path: String, matches: usize },

    // === Protocol Errors ===
    #[error("Malformed result record: {0}")]
    MalformedRecord(String),

    #[error("Test output ended unexpectedly: {0}")]
    ProcessEndedUnexpectedly(String),

    // === Discovery Errors ===
    #[error("Test discovery failed:\n{0}")]
    SuiteDiscoveryFailed(String),

    // === Process Errors ===
    #[error("Failed to start '{command}': {error}")]
    SpawnFailed { command: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a spawn failure error from the attempted argument vector
    pub fn spawn_failed(command: &[String], error: &io::Error) -> Self {
        Self::SpawnFailed {
            command: command.join(" "),
            error: error.to_string(),
        }
    }
}
