//! Error types for option resolution and uploads.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// The binary path was empty or does not exist. Carries the path as supplied.
    #[error("Couldn't find ipa file at path '{0}'")]
    MissingIpaFile(String),

    /// The symbols archive was given but does not exist. Carries the expanded path.
    #[error("Symbols on path '{0}' not found")]
    MissingSymbolsFile(String),

    #[error("Missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("Invalid value '{value}' for option '{option}' (expected one of {expected})")]
    InvalidOption {
        option: &'static str,
        value: String,
        expected: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to read {}: {}", path.display(), source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload failed {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),
}

impl UploadError {
    /// True for the two file validation failures raised before any upload.
    pub fn is_missing_file(&self) -> bool {
        matches!(
            self,
            UploadError::MissingIpaFile(_) | UploadError::MissingSymbolsFile(_)
        )
    }
}
