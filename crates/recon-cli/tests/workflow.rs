//! File-level workflow from sheets on disk to merged records.

use std::fs;
use std::path::{Path, PathBuf};

use recon_cli::config::ReconConfig;
use recon_cli::workflow::{file_key, init_state, load_sheets, open_session, schema_from_master};
use recon_core::ConflictPolicy;
use recon_ingest::{AutoSheetParser, CsvSheetParser};
use recon_model::{CellValue, ColumnMapping, SessionStep};
use recon_output::{load_session, save_session};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn init_then_run_merges_two_files() {
    let dir = tempdir().unwrap();
    let master = write(dir.path(), "master.csv", "Name,Email,Phone\n");
    let crm = write(
        dir.path(),
        "crm.csv",
        ",,\nFull Name,E-mail,Phone\nAlice,a@x.com,555\nBob,b@x.com,556\n",
    );
    let billing = write(dir.path(), "billing.tsv", "Client\tMail\nAlice\talice@corp.com\n");
    let parser = CsvSheetParser::default();

    let schema = schema_from_master(&parser, &master, None).unwrap();
    let loaded = load_sheets(&parser, &[crm.clone(), billing.clone()]);
    let mut state = init_state(schema, &loaded.sheets);
    assert_eq!(state.step(), SessionStep::FilesSelected);
    assert_eq!(state.mappings.get("crm.csv").unwrap().header_row, 2);

    // what a user would fill in after `recon init`
    let crm_mapping = state.mappings.get("crm.csv").unwrap().clone();
    state.mappings.insert(recon_model::FileMapping {
        name_column: "Full Name".into(),
        column_mappings: vec![
            ColumnMapping::new("Full Name", "Name"),
            ColumnMapping::new("E-mail", "Email"),
            ColumnMapping::new("Phone", "Phone"),
        ],
        ..crm_mapping
    });
    let billing_mapping = state.mappings.get("billing.tsv").unwrap().clone();
    state.mappings.insert(recon_model::FileMapping {
        name_column: "Client".into(),
        column_mappings: vec![ColumnMapping::new("Mail", "Email")],
        ..billing_mapping
    });
    let session_path = dir.path().join("session.json");
    save_session(&state, &session_path).unwrap();

    let state = load_session(&session_path).unwrap();
    let loaded = load_sheets(&parser, &[crm, billing]);
    let mut session = open_session(state, loaded, ConflictPolicy::LastWriteWins);
    let report = session.validate();
    assert!(report.is_valid(), "{report:?}");
    // billing.tsv maps neither Name nor Phone
    assert_eq!(report.get("billing.tsv").unwrap().warnings.len(), 2);

    let outcome = session.reconcile().unwrap();
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(
        outcome.records[0].get("Email"),
        Some(&CellValue::from("alice@corp.com"))
    );
    assert_eq!(outcome.records[0].get("Phone"), Some(&CellValue::Number(555.0)));
    assert_eq!(outcome.collisions.len(), 1);
}

#[test]
fn unreadable_file_is_logged_and_blocks_validation() {
    let dir = tempdir().unwrap();
    let good = write(dir.path(), "good.csv", "Id,Mail\n1,m\n");
    let bad = write(dir.path(), "bad.xlsx", "not really a workbook");
    let parser = AutoSheetParser::default();

    let loaded = load_sheets(&parser, &[good.clone(), bad.clone()]);
    assert_eq!(loaded.sheets.len(), 1);
    assert_eq!(loaded.failures.len(), 1);
    assert_eq!(loaded.failures[0].0, file_key(&bad));

    let schema = recon_model::MasterSchema::new(["Email"]).unwrap();
    let state = init_state(schema, &loaded.sheets);
    let loaded = load_sheets(&parser, &[good, bad]);
    let mut session = open_session(state, loaded, ConflictPolicy::default());

    assert_eq!(session.logs().len(), 1);
    assert!(session.logs()[0].contains("bad.xlsx"));
    let report = session.validate();
    assert!(!report.is_valid());
    assert_eq!(
        report.get("bad.xlsx").unwrap().errors[0].code(),
        "missing_source_file"
    );
}

#[test]
fn file_names_keep_argument_order() {
    let dir = tempdir().unwrap();
    let broken = write(dir.path(), "broken.xlsx", "not really a workbook");
    let first = write(dir.path(), "first.csv", "Id\n1\n");
    let second = write(dir.path(), "second.tsv", "Id\n2\n");

    let loaded = load_sheets(&AutoSheetParser::default(), &[broken, first, second]);

    assert_eq!(loaded.failures.len(), 1);
    assert_eq!(loaded.file_names(), ["broken.xlsx", "first.csv", "second.tsv"]);
    let schema = recon_model::MasterSchema::new(["Id"]).unwrap();
    let state = init_state(schema, &[]);
    let session = open_session(state, loaded, ConflictPolicy::default());
    let order: Vec<&str> = session
        .store()
        .get_all()
        .iter()
        .map(|m| m.file_name.as_str())
        .collect();
    assert_eq!(order, ["broken.xlsx", "first.csv", "second.tsv"]);
}

#[test]
fn master_schema_from_workbook() {
    let master = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../recon-ingest/tests/fixtures/contacts.xlsx");

    let schema = schema_from_master(&AutoSheetParser::default(), &master, None).unwrap();

    assert_eq!(schema.columns(), ["Full Name", "E-mail", "Customer Id"]);
}

#[test]
fn master_with_duplicate_columns_is_rejected() {
    let dir = tempdir().unwrap();
    let master = write(dir.path(), "master.csv", "Name,Email,Name\n");
    let err = schema_from_master(&CsvSheetParser::default(), &master, None).unwrap_err();
    assert!(format!("{err:#}").contains("Name"));
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "recon.toml",
        "[reconcile]\nconflict_policy = \"first_write_wins\"\n",
    );
    let config = ReconConfig::load(Some(&path)).unwrap();
    assert_eq!(
        config.reconcile.conflict_policy,
        ConflictPolicy::FirstWriteWins
    );
    assert!(ReconConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
}
