//! Per-file mapping configuration.

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Header row assigned to a freshly created mapping (1-based).
pub const DEFAULT_HEADER_ROW: usize = 1;

fn default_header_row() -> usize {
    DEFAULT_HEADER_ROW
}

/// One source column feeding one master column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default)]
    pub source_column: String,
    #[serde(default)]
    pub target_column: String,
}

impl ColumnMapping {
    pub fn new(source_column: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target_column: target_column.into(),
        }
    }

    pub fn get(&self, field: MappingField) -> &str {
        match field {
            MappingField::SourceColumn => &self.source_column,
            MappingField::TargetColumn => &self.target_column,
        }
    }

    pub fn set(&mut self, field: MappingField, value: impl Into<String>) {
        match field {
            MappingField::SourceColumn => self.source_column = value.into(),
            MappingField::TargetColumn => self.target_column = value.into(),
        }
    }
}

/// Editable side of a [`ColumnMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingField {
    SourceColumn,
    TargetColumn,
}

impl fmt::Display for MappingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceColumn => f.write_str("sourceColumn"),
            Self::TargetColumn => f.write_str("targetColumn"),
        }
    }
}

/// Mapping configuration for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMapping {
    #[serde(default)]
    pub file_name: String,
    /// Source column whose cells identify a record.
    #[serde(default)]
    pub name_column: String,
    /// 1-based row holding the column names; later rows are data.
    #[serde(default = "default_header_row")]
    pub header_row: usize,
    #[serde(default)]
    pub column_mappings: Vec<ColumnMapping>,
}

impl FileMapping {
    /// Mapping with defaults: no name column, header on row 1, no pairs.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            name_column: String::new(),
            header_row: DEFAULT_HEADER_ROW,
            column_mappings: Vec::new(),
        }
    }

    /// 0-based index of the header row, `None` when `header_row` is 0.
    pub fn header_index(&self) -> Option<usize> {
        self.header_row.checked_sub(1)
    }

    /// First mapping entry writing into `target`.
    pub fn mapping_for_target(&self, target: &str) -> Option<&ColumnMapping> {
        self.column_mappings
            .iter()
            .find(|m| m.target_column == target)
    }
}

/// File name -> [`FileMapping`], iterated in insertion order.
///
/// Entries are shared behind [`Arc`] so that a cloned set is a cheap,
/// stable snapshot: replacing an entry never touches the value a reader
/// already holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSet {
    entries: Vec<Arc<FileMapping>>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, file_name: &str) -> Option<&FileMapping> {
        self.get_shared(file_name).map(Arc::as_ref)
    }

    pub fn get_shared(&self, file_name: &str) -> Option<&Arc<FileMapping>> {
        self.entries.iter().find(|m| m.file_name == file_name)
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.get_shared(file_name).is_some()
    }

    /// Inserts or replaces the entry for `mapping.file_name`.
    ///
    /// A replaced entry keeps its original position. Returns the previous
    /// entry, if any.
    pub fn insert(&mut self, mapping: impl Into<Arc<FileMapping>>) -> Option<Arc<FileMapping>> {
        let mapping = mapping.into();
        match self
            .entries
            .iter_mut()
            .find(|m| m.file_name == mapping.file_name)
        {
            Some(slot) => Some(std::mem::replace(slot, mapping)),
            None => {
                self.entries.push(mapping);
                None
            }
        }
    }

    pub fn remove(&mut self, file_name: &str) -> Option<Arc<FileMapping>> {
        let index = self.entries.iter().position(|m| m.file_name == file_name)?;
        Some(self.entries.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileMapping> {
        self.entries.iter().map(Arc::as_ref)
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|m| m.file_name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<FileMapping> for MappingSet {
    fn from_iter<T: IntoIterator<Item = FileMapping>>(iter: T) -> Self {
        let mut set = Self::new();
        for mapping in iter {
            set.insert(mapping);
        }
        set
    }
}

impl Serialize for MappingSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for mapping in &self.entries {
            map.serialize_entry(&mapping.file_name, mapping.as_ref())?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MappingSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingSetVisitor)
    }
}

struct MappingSetVisitor;

impl<'de> Visitor<'de> for MappingSetVisitor {
    type Value = MappingSet;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of file name to file mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut set = MappingSet::new();
        while let Some((key, mut mapping)) = access.next_entry::<String, FileMapping>()? {
            if mapping.file_name.is_empty() {
                mapping.file_name.clone_from(&key);
            } else if mapping.file_name != key {
                return Err(serde::de::Error::custom(format!(
                    "mapping key '{key}' does not match fileName '{}'",
                    mapping.file_name
                )));
            }
            if set.insert(mapping).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "duplicate mapping for '{key}'"
                )));
            }
        }
        Ok(set)
    }
}
