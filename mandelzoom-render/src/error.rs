use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from coloring, palettes, and frame output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("palette is empty")]
    EmptyPalette,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid format {input:?}: {reason}")]
    InvalidFormat { input: String, reason: String },

    #[error("invalid zoom scale factor: {0} (must be in (0, 1))")]
    InvalidScaleFactor(f64),

    #[error("grid size mismatch: expected {expected} cells, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("failed to write {}: {reason}", path.display())]
    Export { path: PathBuf, reason: String },

    #[error(transparent)]
    Core(#[from] mandelzoom_core::CoreError),
}

impl RenderError {
    pub(crate) fn format(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
