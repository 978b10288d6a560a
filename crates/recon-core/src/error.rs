use recon_model::{InvalidSchemaError, SessionStep};
use thiserror::Error;

/// Why a single file could not be reconciled.
///
/// Only that file is affected; the others still merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    #[error("{file_name}: header row {header_row} is outside the sheet ({row_count} rows)")]
    HeaderRowOutOfRange {
        file_name: String,
        header_row: usize,
        row_count: usize,
    },

    #[error("{file_name}: name column '{column}' is not on the header row")]
    UnknownNameColumn { file_name: String, column: String },

    #[error("{file_name}: source column '{column}' is not on the header row")]
    UnknownSourceColumn { file_name: String, column: String },

    #[error("{file_name}: target column '{column}' is not in the master schema")]
    UnknownTargetColumn { file_name: String, column: String },

    #[error("{file_name}: no parsed rows available")]
    MissingRows { file_name: String },
}

impl ReconcileError {
    pub fn file_name(&self) -> &str {
        match self {
            Self::HeaderRowOutOfRange { file_name, .. }
            | Self::UnknownNameColumn { file_name, .. }
            | Self::UnknownSourceColumn { file_name, .. }
            | Self::UnknownTargetColumn { file_name, .. }
            | Self::MissingRows { file_name } => file_name,
        }
    }
}

/// Session-level misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("reconciliation requires a validated session (current step: {step})")]
    NotValidated { step: SessionStep },

    #[error(transparent)]
    InvalidSchema(#[from] InvalidSchemaError),
}

/// Result type for single-file reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;
