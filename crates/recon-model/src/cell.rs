//! Primitive cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell.
///
/// Only primitive pass-through typing is done: no dates, no currencies.
/// Serialized untagged, so JSON reads `"text"`, `42` or `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Builds a cell from raw text.
    ///
    /// Blank input becomes [`CellValue::Empty`]. Text becomes
    /// [`CellValue::Number`] only when the number renders back to exactly
    /// the same text, so `"42"` and `"-1.5"` are numbers while `"007"`,
    /// `"1E5"`, `"0.10"` and 17-digit identifiers stay text untouched.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if let Ok(number) = trimmed.parse::<f64>()
            && number.is_finite()
        {
            let cell = Self::Number(number);
            if cell.to_string() == trimmed {
                return cell;
            }
        }
        Self::Text(trimmed.to_string())
    }

    /// Text cell, collapsing blank strings to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    /// True for [`CellValue::Empty`] and for whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Canonical text used to match records across files.
    ///
    /// Returns `None` for empty cells. Comparison on the returned key is
    /// case-sensitive.
    pub fn identity_key(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string().trim().to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => {
                if number.fract() == 0.0 && number.abs() < 1e15 {
                    write!(f, "{}", *number as i64)
                } else {
                    write!(f, "{number}")
                }
            }
            Self::Text(text) => f.write_str(text),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
