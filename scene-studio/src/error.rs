use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors raised by the terminal front end.
#[derive(Debug, Error)]
pub enum StudioError {
    /// A reference image could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Requested file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file contents could not be used as a style image.
    #[error("unusable style image: {0}")]
    Image(#[from] scene_primitives::Error),

    /// The preview copy could not be created.
    #[error("failed to create preview: {0}")]
    Preview(#[source] io::Error),

    /// Terminal input or output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}
