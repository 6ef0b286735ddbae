//! Error types shared across Clipforge crates.

use std::path::PathBuf;

/// Top-level error type for Clipforge operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipforgeError {
    /// Malformed render request. Rejected before any job record exists.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The media engine could not be started at all.
    #[error("Failed to dispatch {program}: {message} (check that the engine is installed and configured)")]
    Dispatch { program: String, message: String },

    /// The media engine ran but exited unsuccessfully.
    #[error("Stage {stage} failed (exit code {}): {diagnostic}", format_exit_code(.exit_code))]
    StageFailure {
        stage: String,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Not ready: {message}")]
    NotReady { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ClipforgeError.
pub type ClipforgeResult<T> = Result<T, ClipforgeError>;

impl ClipforgeError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn dispatch(program: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Dispatch {
            program: program.into(),
            message: msg.into(),
        }
    }

    pub fn stage_failure(
        stage: impl Into<String>,
        exit_code: Option<i32>,
        diagnostic: impl Into<String>,
    ) -> Self {
        Self::StageFailure {
            stage: stage.into(),
            exit_code,
            diagnostic: diagnostic.into(),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error means the engine environment itself is unusable.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch { .. })
    }

    /// Unknown job or a file that should exist but does not.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::FileNotFound { .. })
    }
}

fn format_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none, terminated by signal".to_string(),
    }
}
