//! In-memory store of file mappings.

use std::sync::Arc;

use recon_model::{ColumnMapping, FileMapping, MappingField, MappingSet};
use tracing::debug;

use crate::update::{FileMappingPatch, MappingUpdate, NoOpReason, UpdateOutcome};

/// Keyed collection of per-file mappings.
///
/// The store is versioned: every applied mutation bumps [`version`], so a
/// consumer can tell whether results computed from an earlier snapshot are
/// stale.
///
/// [`version`]: FileMappingStore::version
#[derive(Debug, Clone, Default)]
pub struct FileMappingStore {
    mappings: MappingSet,
    version: u64,
}

impl FileMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store from an existing set (e.g. a loaded session).
    pub fn from_set(mappings: MappingSet) -> Self {
        Self {
            mappings,
            version: 0,
        }
    }

    pub fn get(&self, file_name: &str) -> Option<&FileMapping> {
        self.mappings.get(file_name)
    }

    pub fn get_all(&self) -> &MappingSet {
        &self.mappings
    }

    /// Cheap copy of the current state for validation or reconciliation.
    pub fn snapshot(&self) -> MappingSet {
        self.mappings.clone()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Creates the mapping with defaults if missing, then merges `patch` over it.
    pub fn upsert(&mut self, file_name: &str, patch: FileMappingPatch) -> Arc<FileMapping> {
        let mut next = self
            .mappings
            .get(file_name)
            .cloned()
            .unwrap_or_else(|| FileMapping::new(file_name));
        patch.apply_to(&mut next);
        self.commit(next)
    }

    /// Applies one tagged update.
    pub fn apply(&mut self, file_name: &str, update: MappingUpdate) -> UpdateOutcome {
        match update {
            MappingUpdate::SetHeaderRow { header_row } => UpdateOutcome::Applied(
                self.upsert(file_name, FileMappingPatch::default().header_row(header_row)),
            ),
            MappingUpdate::SetNameColumn { name_column } => UpdateOutcome::Applied(
                self.upsert(file_name, FileMappingPatch::default().name_column(name_column)),
            ),
            MappingUpdate::AddColumnMapping => self.add_column_mapping(file_name),
            MappingUpdate::RemoveColumnMapping { index } => {
                self.remove_column_mapping(file_name, index)
            }
            MappingUpdate::UpdateColumnMapping {
                index,
                field,
                value,
            } => self.update_column_mapping(file_name, index, field, value),
        }
    }

    /// Appends an empty source/target pair.
    pub fn add_column_mapping(&mut self, file_name: &str) -> UpdateOutcome {
        self.edit(file_name, None, |mapping| {
            mapping.column_mappings.push(ColumnMapping::default());
        })
    }

    /// Removes the pair at `index`; out-of-bounds is a logged no-op.
    pub fn remove_column_mapping(&mut self, file_name: &str, index: usize) -> UpdateOutcome {
        self.edit(file_name, Some(index), |mapping| {
            mapping.column_mappings.remove(index);
        })
    }

    /// Sets one side of the pair at `index`; out-of-bounds is a logged no-op.
    pub fn update_column_mapping(
        &mut self,
        file_name: &str,
        index: usize,
        field: MappingField,
        value: impl Into<String>,
    ) -> UpdateOutcome {
        let value = value.into();
        self.edit(file_name, Some(index), |mapping| {
            mapping.column_mappings[index].set(field, value);
        })
    }

    /// Drops a file's mapping when the file leaves the working set.
    pub fn remove_file(&mut self, file_name: &str) -> Option<Arc<FileMapping>> {
        let removed = self.mappings.remove(file_name);
        if removed.is_some() {
            self.version += 1;
        }
        removed
    }

    /// Forgets every mapping (new session).
    pub fn clear(&mut self) {
        if !self.mappings.is_empty() {
            self.mappings = MappingSet::new();
            self.version += 1;
        }
    }

    fn edit(
        &mut self,
        file_name: &str,
        index: Option<usize>,
        change: impl FnOnce(&mut FileMapping),
    ) -> UpdateOutcome {
        let Some(current) = self.mappings.get(file_name) else {
            return no_op(file_name, NoOpReason::UnknownFile);
        };
        if let Some(index) = index {
            let len = current.column_mappings.len();
            if index >= len {
                return no_op(file_name, NoOpReason::IndexOutOfBounds { index, len });
            }
        }
        let mut next = current.clone();
        change(&mut next);
        UpdateOutcome::Applied(self.commit(next))
    }

    fn commit(&mut self, next: FileMapping) -> Arc<FileMapping> {
        let next = Arc::new(next);
        self.mappings.insert(Arc::clone(&next));
        self.version += 1;
        next
    }
}

fn no_op(file_name: &str, reason: NoOpReason) -> UpdateOutcome {
    debug!(file_name, %reason, "mapping update ignored");
    UpdateOutcome::NoOp(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_creates_with_defaults() {
        let mut store = FileMappingStore::new();
        let mapping = store.upsert("a.csv", FileMappingPatch::default().name_column("Id"));
        assert_eq!(mapping.file_name, "a.csv");
        assert_eq!(mapping.name_column, "Id");
        assert_eq!(mapping.header_row, 1);
        assert!(mapping.column_mappings.is_empty());
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn upsert_replaces_column_mappings_wholesale() {
        let mut store = FileMappingStore::new();
        store.upsert(
            "a.csv",
            FileMappingPatch::default().column_mappings(vec![
                ColumnMapping::new("A", "X"),
                ColumnMapping::new("B", "Y"),
            ]),
        );
        let mapping = store.upsert(
            "a.csv",
            FileMappingPatch::default().column_mappings(vec![ColumnMapping::new("C", "Z")]),
        );
        assert_eq!(mapping.column_mappings, vec![ColumnMapping::new("C", "Z")]);
    }

    #[test]
    fn add_on_unknown_file_is_no_op() {
        let mut store = FileMappingStore::new();
        let outcome = store.add_column_mapping("missing.csv");
        assert_eq!(outcome, UpdateOutcome::NoOp(NoOpReason::UnknownFile));
        assert!(store.get("missing.csv").is_none());
        assert_eq!(store.version(), 0);
    }

    #[test]
    fn snapshot_is_not_affected_by_later_edits() {
        let mut store = FileMappingStore::new();
        store.upsert("a.csv", FileMappingPatch::default());
        let before = store.snapshot();
        store.add_column_mapping("a.csv");
        assert!(before.get("a.csv").unwrap().column_mappings.is_empty());
        assert_eq!(store.get("a.csv").unwrap().column_mappings.len(), 1);
    }

    #[test]
    fn remove_file_bumps_version_once() {
        let mut store = FileMappingStore::new();
        store.upsert("a.csv", FileMappingPatch::default());
        assert!(store.remove_file("a.csv").is_some());
        assert!(store.remove_file("a.csv").is_none());
        assert_eq!(store.version(), 2);
    }
}
