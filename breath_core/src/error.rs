//! Error types for the breath_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for breath_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A session was requested while every exercise is disabled
    #[error("Please enable at least one exercise.")]
    NoActiveItems,

    /// Duration edits must be positive and at most a day
    #[error("Invalid duration for '{id}': {seconds} (must be between 1 and 86400 seconds)")]
    InvalidDuration { id: String, seconds: i64 },

    /// No catalog item matches the given id or name
    #[error("Unknown exercise: {0}")]
    UnknownItem(String),

    /// Persisted data could not be decoded
    #[error("Storage corruption: {0}")]
    StorageCorruption(String),

    /// Wake lock or audio could not be acquired
    #[error("Resource unavailable: {0}")]
    ResourceAcquisition(String),

    /// Sequencer state error
    #[error("State error: {0}")]
    State(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
