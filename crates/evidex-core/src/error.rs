//! Error types for evidex

use thiserror::Error;

/// Result type alias using EvidexError
pub type Result<T> = std::result::Result<T, EvidexError>;

/// Error type alias for convenience
pub type Error = EvidexError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const CANCELLED: i32 = 130;
}

/// Main error type for evidex
#[derive(Debug, Error)]
pub enum EvidexError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Case not found: {0}")]
    CaseNotFound(String),

    #[error("Case already exists: {0}")]
    CaseExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser '{parser}' failed on {file}: {message}")]
    Parse {
        parser: String,
        file: String,
        message: String,
    },

    #[error("Parser '{parser}' reported completion more than once for {file}")]
    OverSignal { parser: String, file: String },

    #[error("Parsing was cancelled")]
    Cancelled,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl EvidexError {
    /// Build a parser failure for `file`
    pub fn parse(
        parser: impl Into<String>,
        file: impl AsRef<std::path::Path>,
        message: impl Into<String>,
    ) -> Self {
        Self::Parse {
            parser: parser.into(),
            file: file.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::CaseNotFound(_) => exit_codes::NOT_FOUND,
            Self::CaseExists(_) | Self::InvalidInput(_) | Self::Config(_) => {
                exit_codes::INVALID_INPUT
            }
            Self::Cancelled => exit_codes::CANCELLED,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
