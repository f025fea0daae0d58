//! Unified error types for flacpress
//!
//! Error strategy:
//! - Per-job errors (source read, codec subprocess, tag values): Recoverable,
//!   record and continue with the remaining jobs
//! - Batch errors (interrupt, output directories, configuration): Fatal,
//!   abort batch
//!
//! All errors include actionable suggestions where possible.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for flacpress operations
#[derive(Debug, Error)]
pub enum FlacpressError {
    // =========================================================================
    // Recoverable errors - fail the job, continue the batch
    // =========================================================================
    #[error("Failed to read source '{path}': {reason}\n  Tip: If the file plays in other apps, its metadata blocks may be corrupt")]
    SourceRead { path: PathBuf, reason: String },

    #[error("{tool} failed for '{path}': {reason}")]
    Subprocess {
        tool: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Malformed numeric tag value: {field} = {value:?}")]
    TagValue { field: String, value: String },

    // =========================================================================
    // Batch-level errors - stop the whole run
    // =========================================================================
    #[error("Interrupted")]
    Cancelled,

    #[error("Cannot write output to '{path}': {reason}\n  Tip: Check write permissions for the output directory")]
    Output { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for flacpress operations
pub type Result<T> = std::result::Result<T, FlacpressError>;

impl FlacpressError {
    /// Returns true if this error fails one job but the batch should continue
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FlacpressError::SourceRead { .. }
                | FlacpressError::Subprocess { .. }
                | FlacpressError::TagValue { .. }
        )
    }

    /// Create a source read error with context about the file
    pub fn source_read(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        FlacpressError::SourceRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a subprocess error naming the failing codec tool
    pub fn subprocess(
        tool: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        FlacpressError::Subprocess {
            tool: tool.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a malformed tag value error
    pub fn tag_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        FlacpressError::TagValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!(
                    "Permission denied. Check that you have write access to {}",
                    path.display()
                )
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        FlacpressError::Output { path, reason }
    }
}
