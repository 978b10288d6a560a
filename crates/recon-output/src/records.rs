//! Record export.

use std::io::Write;

use recon_core::Collision;
use recon_model::{CanonicalRecord, MasterSchema};
use serde::{Deserialize, Serialize};

/// Header of the leading identity column in record exports.
pub const IDENTITY_COLUMN: &str = "identity";

/// Encoding used for record files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected csv or json)")),
        }
    }
}

/// Writes records as CSV: the identity column, then master columns in
/// schema order.
pub fn write_records<W: Write>(
    writer: W,
    schema: &MasterSchema,
    records: &[CanonicalRecord],
) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(std::iter::once(IDENTITY_COLUMN).chain(schema.iter()))?;
    for record in records {
        let mut row = Vec::with_capacity(schema.len() + 1);
        row.push(record.identity().to_string());
        row.extend(schema.iter().map(|column| {
            record
                .get(column)
                .map(ToString::to_string)
                .unwrap_or_default()
        }));
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

/// Records as a pretty JSON array.
pub fn write_records_json(records: &[CanonicalRecord]) -> serde_json::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(records)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes one CSV line per collision.
pub fn write_collisions<W: Write>(writer: W, collisions: &[Collision]) -> csv::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        IDENTITY_COLUMN,
        "column",
        "kept",
        "kept_from",
        "discarded",
        "discarded_from",
    ])?;
    for c in collisions {
        let kept = c.kept.to_string();
        let discarded = c.discarded.to_string();
        out.write_record([
            c.identity.as_str(),
            c.column.as_str(),
            kept.as_str(),
            c.kept_from.as_str(),
            discarded.as_str(),
            c.discarded_from.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use recon_model::CellValue;

    use super::*;

    #[test]
    fn csv_has_identity_then_schema_columns() {
        let schema = MasterSchema::new(["Name", "Score"]).unwrap();
        let records = vec![CanonicalRecord::from_values(
            "Alice",
            &schema,
            vec![CellValue::from("Alice, A."), CellValue::Number(12.0)],
            vec!["a.csv".into()],
        )];
        let mut buf = Vec::new();
        write_records(&mut buf, &schema, &records).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "identity,Name,Score\nAlice,\"Alice, A.\",12\n"
        );
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
