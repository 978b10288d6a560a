//! Error types for sheet ingestion.
//!
//! Every variant is fatal for the file it concerns and for nothing else.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a source sheet.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit.
    #[error("file {path} is {size} bytes, limit is {max_size}")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    // === Format Errors ===
    /// Extension is not a supported sheet type.
    #[error("unsupported format for {path}: {extension}")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Text encoding other than UTF-8.
    #[error("unsupported encoding {encoding} in {path}")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Failed to parse delimited text.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Workbook container or worksheet could not be read.
    #[error("failed to read workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },

    /// File has no rows at all.
    #[error("file is empty: {path}")]
    EmptyFile { path: PathBuf },
}

impl IngestError {
    /// Short message suitable for a processing log line.
    pub fn user_message(&self) -> String {
        match self {
            Self::FileNotFound { path } => format!("{} could not be found", display_name(path)),
            Self::FileRead { path, .. } => format!("{} could not be read", display_name(path)),
            Self::FileTooLarge { path, max_size, .. } => format!(
                "{} is larger than {} MB",
                display_name(path),
                max_size / (1024 * 1024)
            ),
            Self::UnsupportedFormat { path, .. } => format!(
                "{} is not a supported spreadsheet (use .csv, .tsv, .xlsx or .xls)",
                display_name(path)
            ),
            Self::UnsupportedEncoding { path, encoding } => {
                format!("{} is encoded as {encoding}; save it as UTF-8", display_name(path))
            }
            Self::CsvParse { path, message } => {
                format!("{} could not be parsed: {message}", display_name(path))
            }
            Self::Workbook { path, message } => {
                format!("{} could not be opened as a workbook: {message}", display_name(path))
            }
            Self::EmptyFile { path } => format!("{} contains no rows", display_name(path)),
        }
    }
}

fn display_name(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string)
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
