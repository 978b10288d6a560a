//! Mapping validation.
//!
//! [`validate`] checks one [`FileMapping`](recon_model::FileMapping)
//! against the file's detected headers and the master schema. Problems are
//! returned as [`Issue`] values, split into blocking errors and advisory
//! warnings; nothing here fails.

#![deny(unsafe_code)]

mod issue;
mod report;
mod validator;

pub use issue::{Issue, Severity};
pub use report::{FileValidation, ValidationReport, validate_all};
pub use validator::{ValidationResult, validate};
