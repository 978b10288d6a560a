//! Validation across every file of a session.

use recon_model::{MappingSet, MasterSchema, SourceFileDescriptor};
use serde::Serialize;
use tracing::debug;

use crate::issue::Issue;
use crate::validator::{ValidationResult, validate};

/// Validation result for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileValidation {
    pub file_name: String,
    pub result: ValidationResult,
}

/// Validation results for a whole mapping set, in mapping order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub files: Vec<FileValidation>,
}

impl ValidationReport {
    /// True when no file has a blocking error.
    pub fn is_valid(&self) -> bool {
        self.files.iter().all(|f| f.result.valid)
    }

    pub fn error_count(&self) -> usize {
        self.files.iter().map(|f| f.result.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.files.iter().map(|f| f.result.warnings.len()).sum()
    }

    pub fn get(&self, file_name: &str) -> Option<&ValidationResult> {
        self.files
            .iter()
            .find(|f| f.file_name == file_name)
            .map(|f| &f.result)
    }
}

/// Validates every mapping in `mappings`.
///
/// `descriptor_for` resolves a file name to its parsed descriptor; a
/// mapping whose file cannot be resolved gets a
/// [`Issue::MissingSourceFile`] error.
pub fn validate_all<F>(
    mappings: &MappingSet,
    schema: &MasterSchema,
    mut descriptor_for: F,
) -> ValidationReport
where
    F: FnMut(&str) -> Option<SourceFileDescriptor>,
{
    let files = mappings
        .iter()
        .map(|mapping| {
            let result = match descriptor_for(&mapping.file_name) {
                Some(descriptor) => validate(mapping, &descriptor, schema),
                None => ValidationResult::from_issues([Issue::MissingSourceFile {
                    file_name: mapping.file_name.clone(),
                }]),
            };
            debug!(
                file_name = %mapping.file_name,
                errors = result.errors.len(),
                warnings = result.warnings.len(),
                "validated mapping"
            );
            FileValidation {
                file_name: mapping.file_name.clone(),
                result,
            }
        })
        .collect();
    ValidationReport { files }
}
