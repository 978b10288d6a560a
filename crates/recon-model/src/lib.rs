//! Data model for reconciling spreadsheet files against a master schema.
//!
//! The types here are shared by every other crate in the workspace:
//!
//! - [`MasterSchema`] / [`SchemaRegistry`]: the ordered target column names
//! - [`FileMapping`] / [`MappingSet`]: per-file header row, name column and
//!   source-to-target column pairs
//! - [`SourceFileDescriptor`]: what the parser learned about one file
//! - [`CanonicalRecord`]: a row projected onto the master schema
//! - [`SessionState`]: the persisted session shape

#![deny(unsafe_code)]

mod cell;
mod error;
mod mapping;
mod record;
mod schema;
mod session;
mod source;

pub use cell::CellValue;
pub use error::{InvalidSchemaError, Result};
pub use mapping::{ColumnMapping, DEFAULT_HEADER_ROW, FileMapping, MappingField, MappingSet};
pub use record::{CanonicalRecord, RecordField};
pub use schema::{MasterSchema, SchemaRegistry};
pub use session::{SessionState, SessionStep};
pub use source::SourceFileDescriptor;
