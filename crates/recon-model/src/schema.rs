//! Master schema and its registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{InvalidSchemaError, Result};

/// Ordered, duplicate-free list of master column names.
///
/// Column order is the field order of every canonical record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct MasterSchema {
    columns: Vec<String>,
}

impl MasterSchema {
    /// Builds a schema, rejecting empty and duplicate names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(columns.len());
        for (index, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(InvalidSchemaError::EmptyName { index });
            }
            if let Some(first) = seen.insert(name.as_str(), index) {
                return Err(InvalidSchemaError::Duplicate {
                    name: name.clone(),
                    first,
                    second: index,
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Position of a column in canonical order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for MasterSchema {
    type Error = InvalidSchemaError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<MasterSchema> for Vec<String> {
    fn from(schema: MasterSchema) -> Self {
        schema.columns
    }
}

/// Holder of the current master schema.
///
/// Replacing the schema does not re-validate existing file mappings; callers
/// re-run validation afterwards.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schema: MasterSchema,
}

impl SchemaRegistry {
    pub fn new(schema: MasterSchema) -> Self {
        Self { schema }
    }

    pub fn get_columns(&self) -> &[String] {
        self.schema.columns()
    }

    /// Replaces the schema wholesale.
    ///
    /// On error the previous schema is left in place.
    pub fn set_columns<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schema = MasterSchema::new(names)?;
        Ok(())
    }

    pub fn schema(&self) -> &MasterSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicates() {
        let err = MasterSchema::new(["Name", "Email", "Name"]).unwrap_err();
        assert_eq!(
            err,
            InvalidSchemaError::Duplicate {
                name: "Name".to_string(),
                first: 0,
                second: 2,
            }
        );
    }

    #[test]
    fn rejects_blank_names() {
        let err = MasterSchema::new(["Name", "  "]).unwrap_err();
        assert_eq!(err, InvalidSchemaError::EmptyName { index: 1 });
    }

    #[test]
    fn failed_set_keeps_previous_schema() {
        let mut registry = SchemaRegistry::default();
        registry.set_columns(["Name", "Email"]).unwrap();
        assert!(registry.set_columns(["A", "A"]).is_err());
        assert_eq!(registry.get_columns(), ["Name", "Email"]);
    }

    #[test]
    fn deserialize_validates() {
        let ok: MasterSchema = serde_json::from_str(r#"["Name","Email"]"#).unwrap();
        assert_eq!(ok.position("Email"), Some(1));
        assert!(serde_json::from_str::<MasterSchema>(r#"["Name","Name"]"#).is_err());
    }
}
