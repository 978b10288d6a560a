//! Single-file mapping validation.

use recon_model::{FileMapping, MasterSchema, SourceFileDescriptor};
use serde::{Deserialize, Serialize};

use crate::issue::Issue;

/// Outcome of validating one file mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff `errors` is empty.
    pub valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationResult {
    /// Splits issues by severity and derives `valid`.
    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let (errors, warnings): (Vec<Issue>, Vec<Issue>) =
            issues.into_iter().partition(Issue::is_error);
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Errors and warnings touching the given field path.
    pub fn issues_for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .filter(move |issue| issue.field().as_deref() == Some(field))
    }
}

/// Checks `mapping` against the file's headers and the master schema.
///
/// Pure: the same inputs always give the same result. Errors are reported
/// in check order (header row, name column, sources, targets, duplicates);
/// unmapped master columns follow schema order as warnings.
pub fn validate(
    mapping: &FileMapping,
    source: &SourceFileDescriptor,
    schema: &MasterSchema,
) -> ValidationResult {
    let mut issues = Vec::new();

    if mapping.header_row == 0 || mapping.header_row > source.row_count {
        issues.push(Issue::InvalidHeaderRow {
            header_row: mapping.header_row,
            row_count: source.row_count,
        });
    }

    if mapping.name_column.trim().is_empty() {
        issues.push(Issue::MissingNameColumn);
    } else if !source.has_header(&mapping.name_column) {
        issues.push(Issue::UnknownNameColumn {
            column: mapping.name_column.clone(),
        });
    }

    for (index, pair) in mapping.column_mappings.iter().enumerate() {
        if pair.source_column.trim().is_empty() || !source.has_header(&pair.source_column) {
            issues.push(Issue::UnknownSourceColumn {
                index,
                column: pair.source_column.clone(),
            });
        }
    }

    for (index, pair) in mapping.column_mappings.iter().enumerate() {
        if pair.target_column.trim().is_empty() || !schema.contains(&pair.target_column) {
            issues.push(Issue::UnknownTargetColumn {
                index,
                column: pair.target_column.clone(),
            });
        }
    }

    issues.extend(duplicate_targets(mapping));

    for column in schema.iter() {
        if mapping.mapping_for_target(column).is_none() {
            issues.push(Issue::UnmappedColumn {
                column: column.to_string(),
            });
        }
    }

    ValidationResult::from_issues(issues)
}

/// Groups pair indices by target column, first-seen order, blank targets skipped.
fn duplicate_targets(mapping: &FileMapping) -> Vec<Issue> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (index, pair) in mapping.column_mappings.iter().enumerate() {
        let target = pair.target_column.as_str();
        if target.trim().is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(column, _)| *column == target) {
            Some((_, indices)) => indices.push(index),
            None => groups.push((target, vec![index])),
        }
    }
    groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(column, indices)| Issue::DuplicateTargetColumn {
            column: column.to_string(),
            indices,
        })
        .collect()
}
