//! Reconciliation sink.
//!
//! The sink is the last stop of a session: it receives the validated
//! mapping set with the merged result and reports pass/fail plus
//! human-readable log lines.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use recon_core::{ConflictPolicy, MergeOutcome};
use recon_model::{CanonicalRecord, MasterSchema, SessionState};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{OutputError, Result};
use crate::io::{save_session, write_atomic};
use crate::records::{OutputFormat, write_collisions, write_records, write_records_json};

/// Everything handed to a sink.
#[derive(Debug, Clone, Copy)]
pub struct Submission<'a> {
    /// Master columns and the validated mapping set.
    pub state: &'a SessionState,
    /// Source files in processing order.
    pub sources: &'a [String],
    pub outcome: &'a MergeOutcome,
    pub policy: ConflictPolicy,
}

/// Pass/fail plus the log lines to show the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SinkOutcome {
    pub success: bool,
    pub log: Vec<String>,
}

impl SinkOutcome {
    fn failed(log: Vec<String>) -> Self {
        Self {
            success: false,
            log,
        }
    }
}

/// Receiver of a finished reconciliation.
pub trait ReconciliationSink {
    /// Never panics or errors; failures come back as `success: false`.
    fn submit(&self, submission: &Submission<'_>) -> SinkOutcome;
}

/// Writes every artefact of a run into one directory.
///
/// Layout:
///
/// ```text
/// <dir>/merged.<ext>               identity + master columns
/// <dir>/<file>.records.<ext>       per source file
/// <dir>/collisions.csv
/// <dir>/session.json
/// <dir>/manifest.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    format: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a> {
    generated_at: DateTime<Utc>,
    policy: ConflictPolicy,
    master_columns: &'a [String],
    records: usize,
    collisions: usize,
    skipped_rows: usize,
    files: Vec<ManifestFile<'a>>,
    failures: Vec<ManifestFailure<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFile<'a> {
    file_name: &'a str,
    records: usize,
    skipped_rows: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFailure<'a> {
    file_name: &'a str,
    error: String,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn write(&self, submission: &Submission<'_>, log: &mut Vec<String>) -> Result<()> {
        let schema = &submission.state.master_columns;
        let outcome = submission.outcome;

        let merged = self.path_for("merged");
        self.write_record_file(&merged, schema, &outcome.records)?;
        log.push(format!(
            "Wrote {} ({} records)",
            display_name(&merged),
            outcome.records.len()
        ));

        for file in &outcome.files {
            let path = self.path_for(&format!("{}.records", sanitize(&file.file_name)));
            self.write_record_file(&path, schema, &file.records)?;
            log.push(format!(
                "{}: {} records, {} skipped rows without identity",
                file.file_name,
                file.records.len(),
                file.skipped_rows
            ));
        }

        let collisions = self.dir.join("collisions.csv");
        let mut buf = Vec::new();
        write_collisions(&mut buf, &outcome.collisions).map_err(|source| OutputError::Csv {
            path: collisions.clone(),
            source,
        })?;
        write_atomic(&collisions, &buf)?;
        if !outcome.collisions.is_empty() {
            log.push(format!(
                "{} collisions resolved ({})",
                outcome.collisions.len(),
                submission.policy
            ));
        }

        save_session(submission.state, &self.dir.join("session.json"))?;

        let manifest = Manifest {
            generated_at: Utc::now(),
            policy: submission.policy,
            master_columns: schema.columns(),
            records: outcome.records.len(),
            collisions: outcome.collisions.len(),
            skipped_rows: outcome.skipped_rows(),
            files: outcome
                .files
                .iter()
                .map(|f| ManifestFile {
                    file_name: &f.file_name,
                    records: f.records.len(),
                    skipped_rows: f.skipped_rows,
                })
                .collect(),
            failures: outcome
                .failures
                .iter()
                .map(|f| ManifestFailure {
                    file_name: &f.file_name,
                    error: f.error.to_string(),
                })
                .collect(),
        };
        let bytes =
            serde_json::to_vec_pretty(&manifest).map_err(|source| OutputError::Serialization {
                what: "manifest",
                source,
            })?;
        write_atomic(&self.dir.join("manifest.json"), &bytes)?;
        Ok(())
    }

    fn write_record_file(
        &self,
        path: &Path,
        schema: &MasterSchema,
        records: &[CanonicalRecord],
    ) -> Result<()> {
        let bytes = match self.format {
            OutputFormat::Csv => {
                let mut buf = Vec::new();
                write_records(&mut buf, schema, records).map_err(|source| OutputError::Csv {
                    path: path.to_path_buf(),
                    source,
                })?;
                buf
            }
            OutputFormat::Json => {
                write_records_json(records).map_err(|source| OutputError::Serialization {
                    what: "records",
                    source,
                })?
            }
        };
        write_atomic(path, &bytes)
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        self.dir
            .join(format!("{stem}.{}", self.format.extension()))
    }
}

impl ReconciliationSink for DirectorySink {
    fn submit(&self, submission: &Submission<'_>) -> SinkOutcome {
        if submission.sources.is_empty() || submission.state.mappings.is_empty() {
            warn!("submission refused: no source files or mappings");
            return SinkOutcome::failed(vec!["Missing required files or mapping".to_string()]);
        }

        let mut log = vec![format!(
            "Processing {} source files into {}",
            submission.sources.len(),
            self.dir.display()
        )];
        for failure in &submission.outcome.failures {
            log.push(format!("Skipped {}: {}", failure.file_name, failure.error));
        }

        match self.write(submission, &mut log) {
            Ok(()) => {
                info!(
                    dir = %self.dir.display(),
                    records = submission.outcome.records.len(),
                    "reconciliation written"
                );
                log.push("Processing complete".to_string());
                SinkOutcome { success: true, log }
            }
            Err(error) => {
                warn!(%error, "writing output failed");
                log.push(format!("Error: {}", error.user_message()));
                SinkOutcome::failed(log)
            }
        }
    }
}

fn sanitize(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
