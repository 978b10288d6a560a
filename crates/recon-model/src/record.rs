use serde::Serialize;

use crate::cell::CellValue;
use crate::schema::MasterSchema;

/// One master column and its value inside a [`CanonicalRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordField {
    pub column: String,
    pub value: CellValue,
}

/// A row projected onto the master schema.
///
/// Built once by the reconciliation engine and never edited afterwards;
/// any mapping change recomputes the whole record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    identity: String,
    fields: Vec<RecordField>,
    sources: Vec<String>,
}

impl CanonicalRecord {
    /// Pairs `values` with the schema's columns in canonical order.
    ///
    /// Missing trailing values are filled with [`CellValue::Empty`].
    pub fn from_values(
        identity: impl Into<String>,
        schema: &MasterSchema,
        values: Vec<CellValue>,
        sources: Vec<String>,
    ) -> Self {
        let mut values = values.into_iter();
        let fields = schema
            .iter()
            .map(|column| RecordField {
                column: column.to_string(),
                value: values.next().unwrap_or_default(),
            })
            .collect();
        Self {
            identity: identity.into(),
            fields,
            sources,
        }
    }

    /// Value of the source row's name column.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|f| f.column == column)
            .map(|f| &f.value)
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.fields.iter().map(|f| &f.value)
    }

    /// Files that contributed at least one row, in processing order.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }
}
