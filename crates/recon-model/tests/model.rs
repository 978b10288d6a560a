//! Tests for recon-model types.

use proptest::prelude::*;
use recon_model::{
    CellValue, ColumnMapping, FileMapping, MappingSet, MasterSchema, SchemaRegistry,
    SessionState, SessionStep,
};

#[test]
fn session_fixture_round_trips() {
    let json = r#"{
        "masterColumns": ["Name", "Email"],
        "mappings": {
            "a.xlsx": {
                "fileName": "a.xlsx",
                "nameColumn": "Full Name",
                "headerRow": 1,
                "columnMappings": [
                    {"sourceColumn": "Full Name", "targetColumn": "Name"},
                    {"sourceColumn": "E-mail", "targetColumn": "Email"}
                ]
            }
        },
        "activeStep": 2
    }"#;
    let state: SessionState = serde_json::from_str(json).expect("parse session");
    assert_eq!(state.master_columns.columns(), ["Name", "Email"]);
    assert_eq!(state.step(), SessionStep::MappingInProgress);

    let mapping = state.mappings.get("a.xlsx").expect("mapping for a.xlsx");
    assert_eq!(mapping.name_column, "Full Name");
    assert_eq!(
        mapping.column_mappings[1],
        ColumnMapping::new("E-mail", "Email")
    );

    let text = serde_json::to_string(&state).expect("serialize session");
    let again: SessionState = serde_json::from_str(&text).expect("reparse session");
    assert_eq!(again, state);
}

#[test]
fn session_rejects_invalid_master_columns() {
    let json = r#"{"masterColumns": ["Name", ""], "mappings": {}, "activeStep": 0}"#;
    assert!(serde_json::from_str::<SessionState>(json).is_err());
}

#[test]
fn out_of_range_step_falls_back_to_idle() {
    let state = SessionState {
        active_step: 42,
        ..SessionState::default()
    };
    assert_eq!(state.step(), SessionStep::Idle);
}

#[test]
fn mapping_set_remove_keeps_order() {
    let mut set: MappingSet = ["a", "b", "c"].into_iter().map(FileMapping::new).collect();
    assert!(set.remove("b").is_some());
    assert!(set.remove("b").is_none());
    assert_eq!(set.file_names().collect::<Vec<_>>(), ["a", "c"]);
}

#[test]
fn step_indices_are_stable() {
    for (index, step) in SessionStep::ALL.iter().enumerate() {
        assert_eq!(step.index(), index);
        assert_eq!(SessionStep::from_index(index), Some(*step));
    }
}

#[test]
fn cell_from_str_collapses_blank() {
    assert_eq!(CellValue::from("   "), CellValue::Empty);
}

fn unique_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[A-Za-z][A-Za-z0-9 _]{0,12}", 0..12)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

proptest! {
    #[test]
    fn set_then_get_columns_round_trips(names in unique_names()) {
        let mut registry = SchemaRegistry::default();
        registry.set_columns(names.clone()).expect("unique names are valid");
        prop_assert_eq!(registry.get_columns(), names.as_slice());
    }

    #[test]
    fn duplicate_names_are_rejected(names in unique_names(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!names.is_empty());
        let mut with_dup = names.clone();
        with_dup.push(names[pick.index(names.len())].clone());
        prop_assert!(MasterSchema::new(with_dup).is_err());
    }
}
