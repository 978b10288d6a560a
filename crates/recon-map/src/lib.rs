//! File mapping store.
//!
//! Holds one [`FileMapping`](recon_model::FileMapping) per source file and
//! mutates it only through a closed set of update operations. Every
//! mutation swaps in a freshly built entry, so a snapshot taken before the
//! call is never partially modified.

#![deny(unsafe_code)]

mod store;
mod update;

pub use store::FileMappingStore;
pub use update::{FileMappingPatch, MappingUpdate, NoOpReason, UpdateOutcome};
