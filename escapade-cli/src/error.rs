use std::path::PathBuf;

use escapade_core::CoreError;
use escapade_render::{ExportError, RenderError};
use thiserror::Error;

/// Everything that can end a CLI run early.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read settings {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("--{flag} does not apply to {target}")]
    FlagMismatch { flag: &'static str, target: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
