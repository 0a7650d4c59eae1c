//! Error types for trellis_app

use thiserror::Error;
use trellis_core::TrellisError;

/// Errors that can occur while running a trellis application
#[derive(Error, Debug)]
pub enum AppError {
    /// Widget tree, layout or state failure
    #[error(transparent)]
    Trellis(#[from] TrellisError),

    /// The renderer failed to present a frame
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

/// Result type for trellis_app operations
pub type Result<T> = std::result::Result<T, AppError>;
