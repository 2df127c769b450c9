use std::path::PathBuf;

use crate::errors::ReaperError;

#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("Failed to read flag state '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Flag state '{path}' is corrupted: {message}")]
    Corrupted { path: PathBuf, message: String },

    #[error("Failed to write flag state '{path}': {message}")]
    WriteFailed { path: PathBuf, message: String },
}

impl ReaperError for StateStoreError {
    fn error_code(&self) -> &'static str {
        match self {
            StateStoreError::ReadFailed { .. } => "STATE_READ_FAILED",
            StateStoreError::Corrupted { .. } => "STATE_CORRUPTED",
            StateStoreError::WriteFailed { .. } => "STATE_WRITE_FAILED",
        }
    }
}
