use proptest::prelude::*;
use recon_model::{ColumnMapping, FileMapping, MappingSet, MasterSchema, SourceFileDescriptor};
use recon_validate::{Issue, validate, validate_all};

fn schema() -> MasterSchema {
    MasterSchema::new(["Name", "Email", "Phone"]).expect("valid schema")
}

fn descriptor(file_name: &str) -> SourceFileDescriptor {
    SourceFileDescriptor::new(
        file_name,
        vec!["Full Name".into(), "E-mail".into(), "Work E-mail".into()],
        10,
    )
}

fn mapping(file_name: &str, pairs: &[(&str, &str)]) -> FileMapping {
    FileMapping {
        file_name: file_name.into(),
        name_column: "Full Name".into(),
        header_row: 1,
        column_mappings: pairs
            .iter()
            .map(|(s, t)| ColumnMapping::new(*s, *t))
            .collect(),
    }
}

#[test]
fn duplicate_email_target_lists_both_indices() {
    let m = mapping(
        "a.xlsx",
        &[
            ("E-mail", "Email"),
            ("Full Name", "Name"),
            ("Work E-mail", "Email"),
        ],
    );
    let result = validate(&m, &descriptor("a.xlsx"), &schema());

    assert!(!result.valid);
    assert_eq!(
        result.errors,
        vec![Issue::DuplicateTargetColumn {
            column: "Email".into(),
            indices: vec![0, 2],
        }]
    );
    assert_eq!(
        result.warnings,
        vec![Issue::UnmappedColumn {
            column: "Phone".into()
        }]
    );
}

#[test]
fn unknown_columns_are_reported_per_index() {
    let m = mapping("a.xlsx", &[("Mobile", "Phone"), ("E-mail", "Mail")]);
    let result = validate(&m, &descriptor("a.xlsx"), &schema());
    assert_eq!(
        result.errors,
        vec![
            Issue::UnknownSourceColumn {
                index: 0,
                column: "Mobile".into()
            },
            Issue::UnknownTargetColumn {
                index: 1,
                column: "Mail".into()
            },
        ]
    );
    let for_field: Vec<_> = result
        .issues_for_field("columnMappings[1].targetColumn")
        .collect();
    assert_eq!(for_field.len(), 1);
}

#[test]
fn report_flags_missing_descriptor() {
    let set: MappingSet = [
        mapping("a.xlsx", &[("Full Name", "Name")]),
        mapping("b.xlsx", &[("Full Name", "Name")]),
    ]
    .into_iter()
    .collect();

    let report = validate_all(&set, &schema(), |name| {
        (name == "a.xlsx").then(|| descriptor(name))
    });

    assert!(!report.is_valid());
    assert!(report.get("a.xlsx").unwrap().valid);
    assert_eq!(
        report.get("b.xlsx").unwrap().errors,
        vec![Issue::MissingSourceFile {
            file_name: "b.xlsx".into()
        }]
    );
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.warning_count(), 2);
}

fn column() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("Full Name".to_string()),
        Just("E-mail".to_string()),
        Just("Name".to_string()),
        Just("Email".to_string()),
        "[a-z]{1,5}",
    ]
}

fn arbitrary_mapping() -> impl Strategy<Value = FileMapping> {
    (
        0usize..14,
        column(),
        prop::collection::vec((column(), column()), 0..6),
    )
        .prop_map(|(header_row, name_column, pairs)| FileMapping {
            file_name: "a.xlsx".into(),
            name_column,
            header_row,
            column_mappings: pairs
                .into_iter()
                .map(|(s, t)| ColumnMapping::new(s, t))
                .collect(),
        })
}

proptest! {
    #[test]
    fn validation_is_idempotent(m in arbitrary_mapping()) {
        let first = validate(&m, &descriptor("a.xlsx"), &schema());
        let second = validate(&m, &descriptor("a.xlsx"), &schema());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.valid, first.errors.is_empty());
        prop_assert!(first.warnings.iter().all(|w| !w.is_error()));
    }
}
