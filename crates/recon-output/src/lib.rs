//! Output side of a reconciliation.
//!
//! - `io/` - atomic writes, session JSON save/load
//! - `records.rs` - CSV and JSON record export
//! - `sink.rs` - the [`ReconciliationSink`] contract and [`DirectorySink`]
//! - `error.rs` - error types with user-facing messages
//!
//! # Example
//!
//! ```ignore
//! use recon_output::{DirectorySink, OutputFormat, ReconciliationSink, Submission};
//!
//! let sink = DirectorySink::new("out", OutputFormat::Csv);
//! let outcome = sink.submit(&submission);
//! for line in &outcome.log {
//!     println!("{line}");
//! }
//! ```

#![deny(unsafe_code)]

mod error;
mod io;
mod records;
mod sink;

pub use error::{OutputError, Result};
pub use io::{load_session, save_session, write_atomic};
pub use records::{IDENTITY_COLUMN, OutputFormat, write_collisions, write_records, write_records_json};
pub use sink::{DirectorySink, ReconciliationSink, SinkOutcome, Submission};
