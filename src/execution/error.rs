//! Error types for running steps

use crate::core::RenderError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or supervising a step
///
/// These never escape a pipeline run: the engine records them against the
/// failing step and the pipeline reports failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to render command: {0}")]
    Render(#[from] RenderError),

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open data file {path}: {source}")]
    DataFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO mode binds a data file but none was configured")]
    MissingDataFiles,

    #[error("runner was already started")]
    AlreadyStarted,

    #[error("runner is not running")]
    NotRunning,

    #[error("stdin of the running process is not piped")]
    StdinNotPiped,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
