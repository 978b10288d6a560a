//! Validation issue types.
//!
//! Each variant carries only the data needed to render it next to the
//! offending field.

use serde::{Deserialize, Serialize};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks the transition to validated.
    Error,
    /// Reported only.
    Warning,
}

impl Severity {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// A problem found in a file mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Issue {
    /// Header row is zero or beyond the last raw row.
    InvalidHeaderRow { header_row: usize, row_count: usize },
    /// No name column chosen.
    MissingNameColumn,
    /// Name column is not one of the file's headers.
    UnknownNameColumn { column: String },
    /// Source side of a pair is blank or not one of the file's headers.
    UnknownSourceColumn { index: usize, column: String },
    /// Target side of a pair is blank or not in the master schema.
    UnknownTargetColumn { index: usize, column: String },
    /// Several pairs write into the same master column.
    DuplicateTargetColumn { column: String, indices: Vec<usize> },
    /// A master column receives no data from this file.
    UnmappedColumn { column: String },
    /// The mapping refers to a file that was never parsed.
    MissingSourceFile { file_name: String },
}

impl Issue {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Issue::InvalidHeaderRow { .. } => "invalid_header_row",
            Issue::MissingNameColumn => "missing_name_column",
            Issue::UnknownNameColumn { .. } => "unknown_name_column",
            Issue::UnknownSourceColumn { .. } => "unknown_source_column",
            Issue::UnknownTargetColumn { .. } => "unknown_target_column",
            Issue::DuplicateTargetColumn { .. } => "duplicate_target_column",
            Issue::UnmappedColumn { .. } => "unmapped_column",
            Issue::MissingSourceFile { .. } => "missing_source_file",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Issue::UnmappedColumn { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// Path of the offending field within the file mapping, for per-field rendering.
    pub fn field(&self) -> Option<String> {
        match self {
            Issue::InvalidHeaderRow { .. } => Some("headerRow".to_string()),
            Issue::MissingNameColumn | Issue::UnknownNameColumn { .. } => {
                Some("nameColumn".to_string())
            }
            Issue::UnknownSourceColumn { index, .. } => {
                Some(format!("columnMappings[{index}].sourceColumn"))
            }
            Issue::UnknownTargetColumn { index, .. } => {
                Some(format!("columnMappings[{index}].targetColumn"))
            }
            Issue::DuplicateTargetColumn { .. } => Some("columnMappings".to_string()),
            Issue::UnmappedColumn { .. } | Issue::MissingSourceFile { .. } => None,
        }
    }

    /// Mapping indices the issue points at.
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Issue::UnknownSourceColumn { index, .. } | Issue::UnknownTargetColumn { index, .. } => {
                vec![*index]
            }
            Issue::DuplicateTargetColumn { indices, .. } => indices.clone(),
            _ => Vec::new(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Issue::InvalidHeaderRow {
                header_row,
                row_count,
            } => format!("Header row {header_row} must be between 1 and {row_count}"),
            Issue::MissingNameColumn => "No name column selected".to_string(),
            Issue::UnknownNameColumn { column } => {
                format!("Name column '{column}' is not a header of this file")
            }
            Issue::UnknownSourceColumn { index, column } if column.trim().is_empty() => {
                format!("Mapping {} has no source column", index + 1)
            }
            Issue::UnknownSourceColumn { index, column } => format!(
                "Mapping {}: source column '{column}' is not a header of this file",
                index + 1
            ),
            Issue::UnknownTargetColumn { index, column } if column.trim().is_empty() => {
                format!("Mapping {} has no target column", index + 1)
            }
            Issue::UnknownTargetColumn { index, column } => format!(
                "Mapping {}: target column '{column}' is not in the master schema",
                index + 1
            ),
            Issue::DuplicateTargetColumn { column, indices } => {
                let positions: Vec<String> = indices.iter().map(|i| (i + 1).to_string()).collect();
                format!(
                    "Master column '{column}' is targeted by mappings {}",
                    positions.join(", ")
                )
            }
            Issue::UnmappedColumn { column } => {
                format!("Master column '{column}' is not mapped and will stay empty")
            }
            Issue::MissingSourceFile { file_name } => {
                format!("No parsed data for '{file_name}'")
            }
        }
    }
}
