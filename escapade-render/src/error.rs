use std::path::PathBuf;

use escapade_core::CoreError;
use thiserror::Error;

/// Errors originating from the rendering pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("palette `{palette}` cannot color {formula} results")]
    PaletteMismatch {
        palette: &'static str,
        formula: &'static str,
    },

    #[error("invalid palette: {reason}")]
    InvalidPalette { reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Errors from writing a rendered image to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PNG encoding failed: {0}")]
    Encoding(#[from] png::EncodingError),

    #[error("pixel data is {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}
