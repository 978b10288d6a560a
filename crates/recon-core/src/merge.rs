//! Cross-file merge by identity.

use std::collections::{BTreeMap, HashMap};

use recon_model::{CanonicalRecord, CellValue, MappingSet, MasterSchema};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{FileReconciliation, reconcile};
use crate::error::ReconcileError;

/// Which value survives when two rows disagree on a non-empty cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The row processed later replaces the earlier value.
    #[default]
    LastWriteWins,
    /// The first non-empty value is kept.
    FirstWriteWins,
}

impl ConflictPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LastWriteWins => "last_write_wins",
            Self::FirstWriteWins => "first_write_wins",
        }
    }
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Two rows with the same identity supplied different non-empty values
/// for one master column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    pub identity: String,
    pub column: String,
    pub kept: CellValue,
    pub discarded: CellValue,
    pub kept_from: String,
    pub discarded_from: String,
}

/// A file that could not be reconciled. Other files are unaffected.
#[derive(Debug, Clone, PartialEq)]
pub struct FileFailure {
    pub file_name: String,
    pub error: ReconcileError,
}

/// Result of reconciling and merging a whole mapping set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Merged records in order of first appearance.
    pub records: Vec<CanonicalRecord>,
    pub collisions: Vec<Collision>,
    /// Per-file results, in processing order.
    pub files: Vec<FileReconciliation>,
    pub failures: Vec<FileFailure>,
}

impl MergeOutcome {
    pub fn skipped_rows(&self) -> usize {
        self.files.iter().map(|f| f.skipped_rows).sum()
    }

    pub fn file(&self, file_name: &str) -> Option<&FileReconciliation> {
        self.files.iter().find(|f| f.file_name == file_name)
    }
}

/// Raw rows per file, as handed over by the parser.
pub trait RowSource {
    /// Every raw row of the sheet, header rows included.
    fn rows(&self, file_name: &str) -> Option<&[Vec<CellValue>]>;
}

impl RowSource for HashMap<String, Vec<Vec<CellValue>>> {
    fn rows(&self, file_name: &str) -> Option<&[Vec<CellValue>]> {
        self.get(file_name).map(Vec::as_slice)
    }
}

impl RowSource for BTreeMap<String, Vec<Vec<CellValue>>> {
    fn rows(&self, file_name: &str) -> Option<&[Vec<CellValue>]> {
        self.get(file_name).map(Vec::as_slice)
    }
}

/// Record under construction; remembers which file supplied each value.
struct Pending {
    identity: String,
    values: Vec<CellValue>,
    origins: Vec<Option<String>>,
    sources: Vec<String>,
}

impl Pending {
    fn new(identity: &str, width: usize) -> Self {
        Self {
            identity: identity.to_string(),
            values: vec![CellValue::Empty; width],
            origins: vec![None; width],
            sources: Vec::new(),
        }
    }

    fn absorb(
        &mut self,
        record: &CanonicalRecord,
        file_name: &str,
        policy: ConflictPolicy,
        collisions: &mut Vec<Collision>,
    ) {
        if !self.sources.iter().any(|s| s == file_name) {
            self.sources.push(file_name.to_string());
        }
        for (position, field) in record.fields().iter().enumerate() {
            let incoming = &field.value;
            if incoming.is_empty() || position >= self.values.len() {
                continue;
            }
            let current = &self.values[position];
            if current.is_empty() {
                self.values[position] = incoming.clone();
                self.origins[position] = Some(file_name.to_string());
                continue;
            }
            if current.to_string() == incoming.to_string() {
                continue;
            }

            let previous_from = self.origins[position].clone().unwrap_or_default();
            let collision = match policy {
                ConflictPolicy::LastWriteWins => Collision {
                    identity: self.identity.clone(),
                    column: field.column.clone(),
                    kept: incoming.clone(),
                    discarded: current.clone(),
                    kept_from: file_name.to_string(),
                    discarded_from: previous_from,
                },
                ConflictPolicy::FirstWriteWins => Collision {
                    identity: self.identity.clone(),
                    column: field.column.clone(),
                    kept: current.clone(),
                    discarded: incoming.clone(),
                    kept_from: previous_from,
                    discarded_from: file_name.to_string(),
                },
            };
            warn!(
                column = %collision.column,
                kept_from = %collision.kept_from,
                discarded_from = %collision.discarded_from,
                %policy,
                "merge collision"
            );
            if policy == ConflictPolicy::LastWriteWins {
                self.values[position] = incoming.clone();
                self.origins[position] = Some(file_name.to_string());
            }
            collisions.push(collision);
        }
    }

    fn finish(self, schema: &MasterSchema) -> CanonicalRecord {
        CanonicalRecord::from_values(self.identity, schema, self.values, self.sources)
    }
}

/// Merges per-file results by identity.
///
/// Files are taken in the given order; rows inside a file in row order.
/// Identities compare case-sensitively. An empty value never replaces a
/// non-empty one and equal values are not collisions.
pub fn merge_records(
    per_file: &[FileReconciliation],
    schema: &MasterSchema,
    policy: ConflictPolicy,
) -> (Vec<CanonicalRecord>, Vec<Collision>) {
    let mut order: Vec<Pending> = Vec::new();
    let mut by_identity: HashMap<String, usize> = HashMap::new();
    let mut collisions = Vec::new();

    for file in per_file {
        for record in &file.records {
            let slot = *by_identity
                .entry(record.identity().to_string())
                .or_insert_with(|| {
                    order.push(Pending::new(record.identity(), schema.len()));
                    order.len() - 1
                });
            order[slot].absorb(record, &file.file_name, policy, &mut collisions);
        }
    }

    let records = order.into_iter().map(|p| p.finish(schema)).collect();
    (records, collisions)
}

/// Reconciles every file of `mappings` in insertion order, then merges.
///
/// A file without rows or with a mapping the engine rejects is recorded
/// in [`MergeOutcome::failures`] and left out of the merge.
pub fn merge_all<R>(
    mappings: &MappingSet,
    rows: &R,
    schema: &MasterSchema,
    policy: ConflictPolicy,
) -> MergeOutcome
where
    R: RowSource + ?Sized,
{
    let mut files = Vec::with_capacity(mappings.len());
    let mut failures = Vec::new();

    for mapping in mappings.iter() {
        let result = rows
            .rows(&mapping.file_name)
            .ok_or_else(|| ReconcileError::MissingRows {
                file_name: mapping.file_name.clone(),
            })
            .and_then(|file_rows| reconcile(mapping, file_rows, schema));
        match result {
            Ok(file) => files.push(file),
            Err(error) => {
                warn!(file_name = %mapping.file_name, %error, "file not reconciled");
                failures.push(FileFailure {
                    file_name: mapping.file_name.clone(),
                    error,
                });
            }
        }
    }

    let (records, collisions) = merge_records(&files, schema, policy);
    info!(
        files = files.len(),
        failed = failures.len(),
        records = records.len(),
        collisions = collisions.len(),
        %policy,
        "merge complete"
    );

    MergeOutcome {
        records,
        collisions,
        files,
        failures,
    }
}
