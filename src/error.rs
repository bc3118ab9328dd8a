//! Error types for Fatigue Check

use crate::validation::ValidationError;
use thiserror::Error;

/// Errors that can occur while assessing, persisting or configuring
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid clock time (expected HH:MM): {0}")]
    InvalidClockTime(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Audit storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
