//! Error types for bugtrack.
//!
//! Store lookups that report "not found" through their return value
//! (`update` -> `Option`, `delete` -> `bool`) do not appear here; the enum
//! covers the failures that abort an operation outright.

use thiserror::Error;

use crate::fields::Status;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bugtrack operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Not permitted: {0}")]
    Forbidden(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
