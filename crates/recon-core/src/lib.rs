//! Reconciliation engine.
//!
//! - [`reconcile`] projects one file's raw rows onto the master schema
//! - [`merge_all`] runs every file of a mapping set and merges records by
//!   identity under a [`ConflictPolicy`]
//! - [`Session`] drives the `Idle -> FilesSelected -> MappingInProgress ->
//!   Validated -> Reconciled` workflow over these pieces

#![deny(unsafe_code)]

mod engine;
mod error;
mod header;
mod merge;
mod session;

pub use engine::{FileReconciliation, reconcile};
pub use error::{ReconcileError, Result, SessionError};
pub use header::HeaderIndex;
pub use merge::{
    Collision, ConflictPolicy, FileFailure, MergeOutcome, RowSource, merge_all, merge_records,
};
pub use session::{
    AttachOutcome, Session, SessionEvent, SessionSnapshot, SubscriptionId, transition,
};
