//! Error types and exit codes for cpp-header-model

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for model extraction operations
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse file: {message}")]
    ParseFailure { message: String },

    #[error("Model extraction failed: {message}")]
    ExtractionFailure { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: File not found / IO error
    /// - 3: Parse failure
    /// - 4: Internal model extraction failure
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::FileNotFound { .. } => ExitCode::from(1),
            Self::ParseFailure { .. } => ExitCode::from(3),
            Self::ExtractionFailure { .. } => ExitCode::from(4),
            Self::Io(_) => ExitCode::from(1),
        }
    }
}

/// Result type alias for cpp-header-model operations
pub type Result<T> = std::result::Result<T, ModelError>;
