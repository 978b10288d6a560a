//! Output error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while writing or reading output files.
#[derive(Debug, Error)]
pub enum OutputError {
    /// File I/O error.
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Temp file could not be renamed into place.
    #[error("failed to replace {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write CSV to {path}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize {what}")]
    Serialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid session file {path}")]
    InvalidSession {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl OutputError {
    /// Message suitable for a processing log line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {operation} {}", path.display()),
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save {}. Please check disk space and permissions.",
                target_path.display()
            ),
            Self::Csv { path, source } => {
                format!("Could not write {}: {source}", path.display())
            }
            Self::Serialization { what, .. } => format!("Could not encode the {what}"),
            Self::InvalidSession { path, source } => format!(
                "{} is not a valid session file (line {}, column {})",
                path.display(),
                source.line(),
                source.column()
            ),
        }
    }

    /// How the user might fix this, when there is something to suggest.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Io { operation, .. } if *operation == "read" => {
                Some("Check that the file exists and is readable.")
            }
            Self::Io { .. } | Self::AtomicWriteFailed { .. } | Self::Csv { .. } => {
                Some("Check that the output directory is writable.")
            }
            Self::InvalidSession { .. } => {
                Some("Expected {\"masterColumns\": [...], \"mappings\": {...}, \"activeStep\": n}.")
            }
            Self::Serialization { .. } => None,
        }
    }
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
