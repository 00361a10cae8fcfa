// File: src/error.rs
use thiserror::Error;

/// Errors surfaced by the recipe engine and its file-backed collaborators.
///
/// Empty lookups are never errors; they come back as empty lists or a zero
/// average. Only rejected input and collaborator I/O land here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// View-count snapshot could not be encoded or decoded
    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("rating must be between 1 and 5, got {rating}")]
    InvalidRating { rating: f64 },

    #[error("recipe name must not be empty")]
    EmptyRecipeName,

    #[error("username must not be empty")]
    EmptyUsername,

    #[error("invalid configuration: {reason}")]
    Config { reason: String },
}

pub type Result<T> = std::result::Result<T, EngineError>;
