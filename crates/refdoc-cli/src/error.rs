//! Error types and handling for the CLI
//!
//! Loader failures are passed through unchanged; each failure class gets
//! its own exit code so scripts can tell them apart.

use refdoc_loader::LoaderError;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the document loader
    #[error(transparent)]
    Loader(#[from] LoaderError),

    /// Output file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Loader(e) => match e {
                LoaderError::IoError { .. } | LoaderError::LocationNotFound { .. } => 3,
                LoaderError::YamlParseError { .. }
                | LoaderError::JsonParseError { .. }
                | LoaderError::UnsupportedFormat { .. } => 4,
                LoaderError::TransportFailure { .. } | LoaderError::InvalidCredentials { .. } => 10,
                LoaderError::CircularReference { .. } | LoaderError::DepthExceeded { .. } => 20,
                LoaderError::AmbiguousPath { .. }
                | LoaderError::InvalidPath { .. }
                | LoaderError::InvalidAnchor { .. }
                | LoaderError::KeyNotFound { .. }
                | LoaderError::ReferenceError { .. } => 21,
                LoaderError::TemplateError { .. } => 22,
            },
            Self::WriteFailed { .. } => 5,
            Self::InvalidArgs(_) => 6,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let hint = match error {
        Error::Loader(e) => e.location().map(|location| format!("\n  in {location}")),
        _ => None,
    };
    let hint = hint.unwrap_or_default();

    if use_color {
        use colored::Colorize;
        format!("{} {}{}", "Error:".red().bold(), error, hint.dimmed())
    } else {
        format!("Error: {}{}", error, hint)
    }
}
