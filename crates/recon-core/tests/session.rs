//! Session workflow: selection, editing, validation, reconciliation.

use std::cell::RefCell;
use std::rc::Rc;

use recon_core::{AttachOutcome, ConflictPolicy, Session, SessionError};
use recon_ingest::ParsedSheet;
use recon_map::{FileMappingPatch, MappingUpdate, UpdateOutcome};
use recon_model::{CellValue, ColumnMapping, MappingField, MasterSchema, SessionStep};

fn sheet(file_name: &str, data: &[&[&str]]) -> ParsedSheet {
    let rows = data
        .iter()
        .map(|row| row.iter().map(|cell| CellValue::from_raw(cell)).collect())
        .collect();
    ParsedSheet::new(file_name, rows).unwrap()
}

fn contacts_session() -> Session {
    let mut session = Session::new(MasterSchema::new(["Name", "Email"]).unwrap());
    session.select_files(["a.csv"]);
    session.attach_sheet(sheet(
        "a.csv",
        &[
            &["Full Name", "E-mail", "Phone"],
            &["Alice", "a@x.com", "555"],
            &["Bob", "b@x.com", "556"],
        ],
    ));
    session.upsert_mapping(
        "a.csv",
        FileMappingPatch::default()
            .name_column("Full Name")
            .column_mappings(vec![
                ColumnMapping::new("Full Name", "Name"),
                ColumnMapping::new("E-mail", "Email"),
            ]),
    );
    session
}

#[test]
fn full_workflow_reaches_reconciled() {
    let mut session = contacts_session();
    assert_eq!(session.step(), SessionStep::MappingInProgress);

    let report = session.validate();
    assert!(report.is_valid(), "{report:?}");
    assert_eq!(session.step(), SessionStep::Validated);

    let outcome = session.reconcile().unwrap();
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(session.step(), SessionStep::Reconciled);
    assert_eq!(session.state().active_step, 4);
}

#[test]
fn selecting_files_creates_default_mappings() {
    let mut session = Session::new(MasterSchema::new(["Name"]).unwrap());
    assert_eq!(session.step(), SessionStep::Idle);

    session.select_files(["a.csv", "b.csv", "a.csv"]);

    assert_eq!(session.step(), SessionStep::FilesSelected);
    assert_eq!(session.files(), ["a.csv".to_string(), "b.csv".to_string()]);
    let mapping = session.mapping("b.csv").unwrap();
    assert_eq!(mapping.header_row, 1);
    assert!(mapping.name_column.is_empty());
    assert!(mapping.column_mappings.is_empty());
}

#[test]
fn reconcile_before_validation_is_refused() {
    let mut session = contacts_session();
    let err = session.reconcile().unwrap_err();
    assert_eq!(
        err,
        SessionError::NotValidated {
            step: SessionStep::MappingInProgress
        }
    );
}

#[test]
fn edit_after_reconcile_clears_results() {
    let mut session = contacts_session();
    session.validate();
    session.reconcile().unwrap();

    let outcome = session.edit_mapping(
        "a.csv",
        MappingUpdate::UpdateColumnMapping {
            index: 1,
            field: MappingField::SourceColumn,
            value: "Phone".into(),
        },
    );

    assert!(outcome.is_applied());
    assert_eq!(session.step(), SessionStep::MappingInProgress);
    assert!(session.result().is_none());
    assert!(session.validation().is_none());
}

#[test]
fn stale_index_edit_keeps_step() {
    let mut session = contacts_session();
    session.validate();

    let outcome = session.edit_mapping("a.csv", MappingUpdate::RemoveColumnMapping { index: 9 });

    assert!(matches!(outcome, UpdateOutcome::NoOp(_)));
    assert_eq!(session.step(), SessionStep::Validated);
    assert!(session.validation().is_some());
}

#[test]
fn invalid_mapping_blocks_validation() {
    let mut session = contacts_session();
    session.edit_mapping(
        "a.csv",
        MappingUpdate::UpdateColumnMapping {
            index: 1,
            field: MappingField::TargetColumn,
            value: "Name".into(),
        },
    );

    let report = session.validate();

    assert!(!report.is_valid());
    assert_eq!(session.step(), SessionStep::MappingInProgress);
    assert!(session.reconcile().is_err());
}

#[test]
fn late_parse_after_removal_is_discarded() {
    let mut session = Session::new(MasterSchema::new(["Name"]).unwrap());
    session.select_files(["a.csv", "b.csv"]);
    assert!(session.remove_file("b.csv"));
    assert!(session.mapping("b.csv").is_none());

    let outcome = session.attach_sheet(sheet("b.csv", &[&["Name"], &["Late"]]));

    assert_eq!(outcome, AttachOutcome::Discarded);
    assert!(session.sheet("b.csv").is_none());
    assert_eq!(session.files(), ["a.csv".to_string()]);
}

#[test]
fn removing_every_file_returns_to_idle() {
    let mut session = contacts_session();
    session.remove_file("a.csv");
    assert_eq!(session.step(), SessionStep::Idle);
    assert!(session.store().get_all().is_empty());
}

#[test]
fn schema_change_invalidates() {
    let mut session = contacts_session();
    session.validate();

    session
        .set_master_columns(["Name", "Email", "Phone"])
        .unwrap();
    assert_eq!(session.step(), SessionStep::MappingInProgress);

    let err = session.set_master_columns(["Name", "Name"]).unwrap_err();
    assert!(matches!(err, SessionError::InvalidSchema(_)));
    assert_eq!(session.schema().len(), 3);
}

#[test]
fn observers_see_each_change_until_unsubscribed() {
    let mut session = Session::new(MasterSchema::new(["Name"]).unwrap());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = session.subscribe(move |snapshot| sink.borrow_mut().push(snapshot.step));

    session.select_files(["a.csv"]);
    session.edit_mapping("a.csv", MappingUpdate::AddColumnMapping);
    assert!(session.unsubscribe(id));
    session.reset();

    assert_eq!(
        *seen.borrow(),
        [SessionStep::FilesSelected, SessionStep::MappingInProgress]
    );
    assert!(!session.unsubscribe(id));
}

#[test]
fn policy_applies_to_session_merge() {
    let mut session = Session::new(MasterSchema::new(["Email"]).unwrap());
    session.set_policy(ConflictPolicy::FirstWriteWins);
    session.select_files(["a.csv", "b.csv"]);
    for (name, email) in [("a.csv", "first"), ("b.csv", "second")] {
        session.attach_sheet(sheet(name, &[&["Id", "Mail"], &["7", email]]));
        session.upsert_mapping(
            name,
            FileMappingPatch::default()
                .name_column("Id")
                .column_mappings(vec![ColumnMapping::new("Mail", "Email")]),
        );
    }
    session.validate();

    let outcome = session.reconcile().unwrap();

    assert_eq!(outcome.records[0].get("Email"), Some(&CellValue::from("first")));
    assert_eq!(outcome.collisions.len(), 1);
}

#[test]
fn policy_switch_after_reconcile_keeps_validation() {
    let mut session = Session::new(MasterSchema::new(["Email"]).unwrap());
    session.select_files(["a.csv", "b.csv"]);
    for (name, email) in [("a.csv", "first"), ("b.csv", "second")] {
        session.attach_sheet(sheet(name, &[&["Id", "Mail"], &["7", email]]));
        session.upsert_mapping(
            name,
            FileMappingPatch::default()
                .name_column("Id")
                .column_mappings(vec![ColumnMapping::new("Mail", "Email")]),
        );
    }
    session.validate();
    session.reconcile().unwrap();
    assert_eq!(session.step(), SessionStep::Reconciled);

    session.set_policy(ConflictPolicy::FirstWriteWins);

    assert_eq!(session.step(), SessionStep::Validated);
    assert!(session.result().is_none());
    let snapshot = session.snapshot();
    assert_eq!(snapshot.valid, Some(true));
    assert_eq!(snapshot.record_count, None);

    let outcome = session.reconcile().unwrap();
    assert_eq!(outcome.records[0].get("Email"), Some(&CellValue::from("first")));
    assert_eq!(session.step(), SessionStep::Reconciled);
}

#[test]
fn saved_state_restores_without_stale_results() {
    let mut session = contacts_session();
    session.validate();
    session.reconcile().unwrap();

    let json = serde_json::to_string(&session.state()).unwrap();
    let restored = Session::from_state(serde_json::from_str(&json).unwrap());

    assert_eq!(restored.step(), SessionStep::MappingInProgress);
    assert_eq!(restored.files(), ["a.csv".to_string()]);
    assert_eq!(restored.mapping("a.csv").unwrap().name_column, "Full Name");
}

#[test]
fn parse_failures_become_log_lines() {
    let mut session = Session::new(MasterSchema::new(["Name"]).unwrap());
    session.select_files(["bad.xlsx"]);
    let error = recon_ingest::IngestError::UnsupportedFormat {
        path: "bad.xlsx".into(),
        extension: "xlsx".into(),
    };

    session.record_parse_failure("bad.xlsx", &error);

    assert_eq!(session.logs().len(), 1);
    assert!(session.logs()[0].contains("bad.xlsx"));
    session.clear_logs();
    assert!(session.logs().is_empty());
}
