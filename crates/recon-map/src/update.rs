//! Update operations accepted by the store.

use std::fmt;
use std::sync::Arc;

use recon_model::{ColumnMapping, FileMapping, MappingField};
use serde::{Deserialize, Serialize};

/// A single edit to one file's mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MappingUpdate {
    /// Creates the mapping with defaults if missing.
    SetHeaderRow { header_row: usize },
    /// Creates the mapping with defaults if missing.
    SetNameColumn { name_column: String },
    /// Appends an empty pair. No-op when the file has no mapping.
    AddColumnMapping,
    /// No-op when the file has no mapping or `index` is out of bounds.
    RemoveColumnMapping { index: usize },
    /// No-op when the file has no mapping or `index` is out of bounds.
    UpdateColumnMapping {
        index: usize,
        field: MappingField,
        value: String,
    },
}

/// Shallow field-by-field merge applied by
/// [`FileMappingStore::upsert`](crate::FileMappingStore::upsert).
///
/// `column_mappings` replaces the whole list when present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMappingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_mappings: Option<Vec<ColumnMapping>>,
}

impl FileMappingPatch {
    pub fn name_column(mut self, name_column: impl Into<String>) -> Self {
        self.name_column = Some(name_column.into());
        self
    }

    pub fn header_row(mut self, header_row: usize) -> Self {
        self.header_row = Some(header_row);
        self
    }

    pub fn column_mappings(mut self, column_mappings: Vec<ColumnMapping>) -> Self {
        self.column_mappings = Some(column_mappings);
        self
    }

    pub(crate) fn apply_to(self, mapping: &mut FileMapping) {
        if let Some(name_column) = self.name_column {
            mapping.name_column = name_column;
        }
        if let Some(header_row) = self.header_row {
            mapping.header_row = header_row;
        }
        if let Some(column_mappings) = self.column_mappings {
            mapping.column_mappings = column_mappings;
        }
    }
}

/// Result of a store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The entry was replaced; carries the new value.
    Applied(Arc<FileMapping>),
    /// Nothing changed.
    NoOp(NoOpReason),
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Why an update was ignored.
///
/// Stale indices are expected while a user edits quickly, so these are
/// reported instead of raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    UnknownFile,
    IndexOutOfBounds { index: usize, len: usize },
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFile => f.write_str("file has no mapping"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for {len} column mappings")
            }
        }
    }
}
