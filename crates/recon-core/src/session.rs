//! Session state machine.
//!
//! [`transition`] is the pure step function. [`Session`] owns the schema
//! registry, mapping store, working set and parse results, and is the only
//! place that notifies subscribers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use recon_ingest::{IngestError, ParsedSheet};
use recon_map::{FileMappingPatch, FileMappingStore, MappingUpdate, UpdateOutcome};
use recon_model::{
    CellValue, FileMapping, MasterSchema, SchemaRegistry, SessionState, SessionStep,
};
use recon_validate::{ValidationReport, validate_all};
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::merge::{ConflictPolicy, MergeOutcome, RowSource, merge_all};

/// Something that happened to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Files were added to or removed from the working set, or new parse
    /// results arrived.
    FilesChanged { remaining: usize },
    MappingEdited,
    SchemaChanged,
    /// The merge conflict policy changed; mappings are untouched.
    PolicyChanged,
    ValidationPassed,
    ValidationFailed,
    Reconciled,
    Reset,
}

/// Next step after `event`.
///
/// Any change to inputs after validation drops back to
/// `MappingInProgress`, so stale results are never reported as current.
pub fn transition(step: SessionStep, event: SessionEvent) -> SessionStep {
    use SessionEvent as E;
    use SessionStep as S;

    match (step, event) {
        (_, E::Reset | E::FilesChanged { remaining: 0 }) => S::Idle,
        (S::Idle, E::FilesChanged { .. }) => S::FilesSelected,
        (S::Validated | S::Reconciled, E::FilesChanged { .. } | E::SchemaChanged) => {
            S::MappingInProgress
        }
        (current, E::FilesChanged { .. } | E::SchemaChanged) => current,
        (S::Reconciled, E::PolicyChanged) => S::Validated,
        (current, E::PolicyChanged) => current,
        (_, E::MappingEdited) => S::MappingInProgress,
        (S::Idle, E::ValidationPassed | E::ValidationFailed) => S::Idle,
        (_, E::ValidationPassed) => S::Validated,
        (_, E::ValidationFailed) => S::MappingInProgress,
        (S::Validated | S::Reconciled, E::Reconciled) => S::Reconciled,
        (current, E::Reconciled) => current,
    }
}

/// What happened to a parse result handed to [`Session::attach_sheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Stored,
    /// The file left the working set before its parse finished.
    Discarded,
}

/// Handle returned by [`Session::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What subscribers see after each change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub version: u64,
    pub step: SessionStep,
    pub files: Vec<String>,
    pub mapping_version: u64,
    /// `None` until validation has run against the current inputs.
    pub valid: Option<bool>,
    /// `None` until reconciliation has run against the current inputs.
    pub record_count: Option<usize>,
}

type Observer = Box<dyn FnMut(&SessionSnapshot)>;

impl RowSource for HashMap<String, ParsedSheet> {
    fn rows(&self, file_name: &str) -> Option<&[Vec<CellValue>]> {
        self.get(file_name).map(ParsedSheet::rows)
    }
}

/// One reconciliation session.
pub struct Session {
    registry: SchemaRegistry,
    store: FileMappingStore,
    working_set: Vec<String>,
    sheets: HashMap<String, ParsedSheet>,
    step: SessionStep,
    version: u64,
    validation: Option<ValidationReport>,
    result: Option<MergeOutcome>,
    policy: ConflictPolicy,
    log: Vec<String>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("step", &self.step)
            .field("version", &self.version)
            .field("files", &self.working_set)
            .field("policy", &self.policy)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn new(schema: MasterSchema) -> Self {
        Self {
            registry: SchemaRegistry::new(schema),
            store: FileMappingStore::new(),
            working_set: Vec::new(),
            sheets: HashMap::new(),
            step: SessionStep::Idle,
            version: 0,
            validation: None,
            result: None,
            policy: ConflictPolicy::default(),
            log: Vec::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Restores a saved session.
    ///
    /// Validation and reconciliation results are not persisted, so a saved
    /// step past `MappingInProgress` is restored as `MappingInProgress`.
    pub fn from_state(state: SessionState) -> Self {
        let step = match state.step() {
            SessionStep::Validated | SessionStep::Reconciled => SessionStep::MappingInProgress,
            step => step,
        };
        let working_set = state.mappings.file_names().map(str::to_string).collect();
        let mut session = Self::new(state.master_columns);
        session.store = FileMappingStore::from_set(state.mappings);
        session.working_set = working_set;
        session.step = step;
        session
    }

    /// Serializable view: `{ masterColumns, mappings, activeStep }`.
    pub fn state(&self) -> SessionState {
        SessionState {
            master_columns: self.registry.schema().clone(),
            mappings: self.store.snapshot(),
            active_step: self.step.index(),
        }
    }

    pub fn step(&self) -> SessionStep {
        self.step
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn schema(&self) -> &MasterSchema {
        self.registry.schema()
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn store(&self) -> &FileMappingStore {
        &self.store
    }

    pub fn mapping(&self, file_name: &str) -> Option<&FileMapping> {
        self.store.get(file_name)
    }

    /// Selected file names in selection order.
    pub fn files(&self) -> &[String] {
        &self.working_set
    }

    pub fn sheet(&self, file_name: &str) -> Option<&ParsedSheet> {
        self.sheets.get(file_name)
    }

    /// Report from the last validation of the current inputs.
    pub fn validation(&self) -> Option<&ValidationReport> {
        self.validation.as_ref()
    }

    /// Outcome of the last reconciliation of the current inputs.
    pub fn result(&self) -> Option<&MergeOutcome> {
        self.result.as_ref()
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Changes the conflict policy.
    ///
    /// An existing merge result is discarded; the validation report still
    /// holds, so a reconciled session returns to `Validated`.
    pub fn set_policy(&mut self, policy: ConflictPolicy) {
        if self.policy != policy {
            self.policy = policy;
            if self.result.take().is_some() {
                self.advance(SessionEvent::PolicyChanged);
            }
        }
    }

    pub fn logs(&self) -> &[String] {
        &self.log
    }

    pub fn add_log(&mut self, line: impl Into<String>) {
        self.log.push(line.into());
    }

    pub fn clear_logs(&mut self) {
        self.log.clear();
    }

    /// Replaces the master schema. On error the old schema stays in place.
    pub fn set_master_columns<I, S>(&mut self, names: I) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry.set_columns(names)?;
        self.invalidate();
        self.advance(SessionEvent::SchemaChanged);
        Ok(())
    }

    /// Adds files to the working set, each with a default mapping.
    ///
    /// Files already selected keep their mapping.
    pub fn select_files<I, S>(&mut self, file_names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0usize;
        for name in file_names {
            let name = name.into();
            if self.working_set.contains(&name) {
                continue;
            }
            if self.store.get(&name).is_none() {
                self.store.upsert(&name, FileMappingPatch::default());
            }
            self.working_set.push(name);
            added += 1;
        }
        if added > 0 {
            info!(added, total = self.working_set.len(), "files selected");
            self.invalidate();
            self.advance(SessionEvent::FilesChanged {
                remaining: self.working_set.len(),
            });
        }
    }

    /// Stores a parse result if its file is still selected.
    pub fn attach_sheet(&mut self, sheet: ParsedSheet) -> AttachOutcome {
        let file_name = sheet.file_name().to_string();
        if !self.working_set.contains(&file_name) {
            debug!(%file_name, "discarding parse result for removed file");
            return AttachOutcome::Discarded;
        }
        debug!(%file_name, rows = sheet.row_count(), "parse result attached");
        self.sheets.insert(file_name, sheet);
        self.invalidate();
        self.advance(SessionEvent::FilesChanged {
            remaining: self.working_set.len(),
        });
        AttachOutcome::Stored
    }

    /// Records a structural failure for one file as a log line.
    ///
    /// The file stays selected; validation reports it as missing until it
    /// is removed or re-parsed.
    pub fn record_parse_failure(&mut self, file_name: &str, error: &IngestError) {
        warn!(file_name, %error, "parse failed");
        self.add_log(format!("Error: {}", error.user_message()));
    }

    /// Removes a file with its mapping and parse result.
    pub fn remove_file(&mut self, file_name: &str) -> bool {
        let Some(position) = self.working_set.iter().position(|f| f == file_name) else {
            return false;
        };
        self.working_set.remove(position);
        self.sheets.remove(file_name);
        self.store.remove_file(file_name);
        info!(file_name, remaining = self.working_set.len(), "file removed");
        self.invalidate();
        self.advance(SessionEvent::FilesChanged {
            remaining: self.working_set.len(),
        });
        true
    }

    /// Applies one mapping edit. No-ops leave the step untouched.
    pub fn edit_mapping(&mut self, file_name: &str, update: MappingUpdate) -> UpdateOutcome {
        let outcome = self.store.apply(file_name, update);
        if outcome.is_applied() {
            self.invalidate();
            self.advance(SessionEvent::MappingEdited);
        }
        outcome
    }

    /// Creates or merges a file mapping (see [`FileMappingStore::upsert`]).
    pub fn upsert_mapping(&mut self, file_name: &str, patch: FileMappingPatch) -> Arc<FileMapping> {
        let mapping = self.store.upsert(file_name, patch);
        self.invalidate();
        self.advance(SessionEvent::MappingEdited);
        mapping
    }

    /// Validates every mapping against its parsed sheet.
    pub fn validate(&mut self) -> ValidationReport {
        let store = &self.store;
        let sheets = &self.sheets;
        let report = validate_all(store.get_all(), self.registry.schema(), |file_name| {
            let mapping = store.get(file_name)?;
            sheets
                .get(file_name)
                .map(|sheet| sheet.descriptor(mapping.header_row))
        });

        let event = if report.is_valid() {
            SessionEvent::ValidationPassed
        } else {
            SessionEvent::ValidationFailed
        };
        info!(
            files = report.files.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            "validation finished"
        );
        self.result = None;
        self.validation = Some(report.clone());
        self.advance(event);
        report
    }

    /// Reconciles and merges every file under the current policy.
    ///
    /// Only allowed once validation has passed for the current inputs.
    pub fn reconcile(&mut self) -> Result<&MergeOutcome, SessionError> {
        if !matches!(self.step, SessionStep::Validated | SessionStep::Reconciled) {
            return Err(SessionError::NotValidated { step: self.step });
        }
        let outcome = merge_all(
            self.store.get_all(),
            &self.sheets,
            self.registry.schema(),
            self.policy,
        );
        for failure in &outcome.failures {
            self.log.push(format!("Error: {}", failure.error));
        }
        self.result = Some(outcome);
        self.advance(SessionEvent::Reconciled);
        Ok(&*self.result.get_or_insert_with(MergeOutcome::default))
    }

    /// Starts over: forgets files, mappings and results. The schema and
    /// the processing log are kept.
    pub fn reset(&mut self) {
        self.working_set.clear();
        self.sheets.clear();
        self.store.clear();
        self.invalidate();
        self.advance(SessionEvent::Reset);
    }

    /// Registers `observer`, called after every state change.
    pub fn subscribe(&mut self, observer: impl FnMut(&SessionSnapshot) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.version,
            step: self.step,
            files: self.working_set.clone(),
            mapping_version: self.store.version(),
            valid: self.validation.as_ref().map(ValidationReport::is_valid),
            record_count: self.result.as_ref().map(|r| r.records.len()),
        }
    }

    fn invalidate(&mut self) {
        self.validation = None;
        self.result = None;
    }

    fn advance(&mut self, event: SessionEvent) {
        let next = transition(self.step, event);
        if next != self.step {
            debug!(from = %self.step, to = %next, ?event, "session step changed");
        }
        self.step = next;
        self.version += 1;
        self.notify();
    }

    fn notify(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, observer) in &mut self.observers {
            observer(&snapshot);
        }
    }
}
