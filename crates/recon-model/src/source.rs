use serde::{Deserialize, Serialize};

/// What the parser learned about one uploaded file.
///
/// Immutable once built; a re-upload produces a new descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFileDescriptor {
    /// Unique key of the file within a session.
    pub file_name: String,
    /// Column names found on the header row.
    pub raw_headers: Vec<String>,
    /// Total number of raw rows, header rows included.
    pub row_count: usize,
}

impl SourceFileDescriptor {
    pub fn new(file_name: impl Into<String>, raw_headers: Vec<String>, row_count: usize) -> Self {
        Self {
            file_name: file_name.into(),
            raw_headers,
            row_count,
        }
    }

    pub fn has_header(&self, column: &str) -> bool {
        self.raw_headers.iter().any(|h| h == column)
    }
}
