//! Errors raised by schema registry misuse.

use thiserror::Error;

/// A master schema was rejected because its column names are not usable.
///
/// This is the only hard caller error in the data model; everything else is
/// reported as data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSchemaError {
    /// A column name is empty or whitespace only.
    #[error("master column at position {index} has an empty name")]
    EmptyName { index: usize },

    /// The same column name appears twice.
    #[error("master column '{name}' appears at positions {first} and {second}")]
    Duplicate {
        name: String,
        first: usize,
        second: usize,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, InvalidSchemaError>;
