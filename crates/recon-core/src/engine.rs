//! Single-file projection onto the master schema.

use recon_model::{CanonicalRecord, CellValue, FileMapping, MasterSchema};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{ReconcileError, Result};
use crate::header::HeaderIndex;

/// Records produced from one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReconciliation {
    pub file_name: String,
    pub records: Vec<CanonicalRecord>,
    /// Data rows dropped because their name column cell was empty.
    pub skipped_rows: usize,
}

/// Applies `mapping` to the raw rows of its file.
///
/// `rows` is the whole sheet: row `header_row` supplies the column names,
/// every later row is data. Pairs are applied in order, so if two pairs
/// share a target the later one wins. Master columns without a pair stay
/// [`CellValue::Empty`]. Rows with an empty identity are skipped and
/// counted.
pub fn reconcile(
    mapping: &FileMapping,
    rows: &[Vec<CellValue>],
    schema: &MasterSchema,
) -> Result<FileReconciliation> {
    let file_name = mapping.file_name.as_str();
    let header_index = mapping
        .header_index()
        .filter(|index| *index < rows.len())
        .ok_or_else(|| ReconcileError::HeaderRowOutOfRange {
            file_name: file_name.to_string(),
            header_row: mapping.header_row,
            row_count: rows.len(),
        })?;
    let headers = HeaderIndex::from_row(&rows[header_index]);

    let name_position =
        headers
            .get(&mapping.name_column)
            .ok_or_else(|| ReconcileError::UnknownNameColumn {
                file_name: file_name.to_string(),
                column: mapping.name_column.clone(),
            })?;

    // (schema position, source position) in mapping order
    let mut plan = Vec::with_capacity(mapping.column_mappings.len());
    for pair in &mapping.column_mappings {
        let source = headers.get(&pair.source_column).ok_or_else(|| {
            ReconcileError::UnknownSourceColumn {
                file_name: file_name.to_string(),
                column: pair.source_column.clone(),
            }
        })?;
        let target = schema.position(&pair.target_column).ok_or_else(|| {
            ReconcileError::UnknownTargetColumn {
                file_name: file_name.to_string(),
                column: pair.target_column.clone(),
            }
        })?;
        plan.push((target, source));
    }

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for row in &rows[header_index + 1..] {
        let Some(identity) = row.get(name_position).and_then(CellValue::identity_key) else {
            skipped_rows += 1;
            continue;
        };
        let mut values = vec![CellValue::Empty; schema.len()];
        for &(target, source) in &plan {
            values[target] = row.get(source).cloned().unwrap_or_default();
        }
        records.push(CanonicalRecord::from_values(
            identity,
            schema,
            values,
            vec![file_name.to_string()],
        ));
    }

    if skipped_rows > 0 {
        info!(file_name, skipped_rows, "skipped rows without identity");
    }
    debug!(file_name, records = records.len(), "reconciled file");

    Ok(FileReconciliation {
        file_name: file_name.to_string(),
        records,
        skipped_rows,
    })
}

#[cfg(test)]
mod tests {
    use recon_model::ColumnMapping;

    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<CellValue>> {
        data.iter()
            .map(|row| row.iter().map(|c| CellValue::from_raw(c)).collect())
            .collect()
    }

    fn mapping(header_row: usize, pairs: &[(&str, &str)]) -> FileMapping {
        FileMapping {
            file_name: "a.csv".into(),
            name_column: "Id".into(),
            header_row,
            column_mappings: pairs
                .iter()
                .map(|(s, t)| ColumnMapping::new(*s, *t))
                .collect(),
        }
    }

    #[test]
    fn honours_header_row_offset() {
        let schema = MasterSchema::new(["Email"]).unwrap();
        let data = rows(&[
            &["report", ""],
            &["Id", "Mail"],
            &["7", "x@y.z"],
        ]);
        let result = reconcile(&mapping(2, &[("Mail", "Email")]), &data, &schema).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].identity(), "7");
        assert_eq!(
            result.records[0].get("Email"),
            Some(&CellValue::from("x@y.z"))
        );
    }

    #[test]
    fn short_rows_read_as_empty() {
        let schema = MasterSchema::new(["Email"]).unwrap();
        let data = rows(&[&["Id", "Mail"], &["1"]]);
        let result = reconcile(&mapping(1, &[("Mail", "Email")]), &data, &schema).unwrap();
        assert_eq!(result.records[0].get("Email"), Some(&CellValue::Empty));
    }

    #[test]
    fn later_pair_wins_on_shared_target() {
        let schema = MasterSchema::new(["Email"]).unwrap();
        let data = rows(&[&["Id", "A", "B"], &["1", "first", "second"]]);
        let result = reconcile(
            &mapping(1, &[("A", "Email"), ("B", "Email")]),
            &data,
            &schema,
        )
        .unwrap();
        assert_eq!(
            result.records[0].get("Email"),
            Some(&CellValue::from("second"))
        );
    }

    #[test]
    fn header_row_outside_sheet_fails() {
        let schema = MasterSchema::new(["Email"]).unwrap();
        let data = rows(&[&["Id"]]);
        for header_row in [0, 2] {
            let err = reconcile(&mapping(header_row, &[]), &data, &schema).unwrap_err();
            assert!(matches!(err, ReconcileError::HeaderRowOutOfRange { .. }));
        }
    }

    #[test]
    fn unknown_columns_fail() {
        let schema = MasterSchema::new(["Email"]).unwrap();
        let data = rows(&[&["Id", "Mail"], &["1", "m"]]);
        let err = reconcile(&mapping(1, &[("Nope", "Email")]), &data, &schema).unwrap_err();
        assert_eq!(
            err,
            ReconcileError::UnknownSourceColumn {
                file_name: "a.csv".into(),
                column: "Nope".into()
            }
        );
        let err = reconcile(&mapping(1, &[("Mail", "Phone")]), &data, &schema).unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownTargetColumn { .. }));

        let mut no_name = mapping(1, &[]);
        no_name.name_column = "Who".into();
        let err = reconcile(&no_name, &data, &schema).unwrap_err();
        assert!(matches!(err, ReconcileError::UnknownNameColumn { .. }));
    }
}
