//! Error types for the workout_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for workout_core operations
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

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Requested day is not in the catalog
    #[error("Unknown workout day {index} (catalog has {count} days)")]
    UnknownDay { index: usize, count: usize },

    /// Workout plan edit rejected (bad day/exercise index)
    #[error("Plan error: {0}")]
    Plan(String),

    /// Body-weight entry rejected at the input boundary
    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    /// A summary could not be handed to storage
    #[error("Persistence error: {0}")]
    Persistence(String),
}
