//! Shared error definitions for scene primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing scene primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided session identifier could not be parsed.
    #[error("invalid session id: {source}")]
    InvalidSessionId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Scene counts start at one.
    #[error("scene count must be at least 1, got {value}")]
    InvalidSceneCount {
        /// The rejected value.
        value: i64,
    },

    /// Style image payload failed validation.
    #[error("invalid style image: {reason}")]
    InvalidStyleImage {
        /// Human-readable reason for rejection.
        reason: String,
    },
}
