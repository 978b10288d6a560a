//! Parsed sheet contents.

use recon_model::{CellValue, SourceFileDescriptor};

/// Raw rows of one sheet plus the detected header row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet {
    file_name: String,
    rows: Vec<Vec<CellValue>>,
    detected_header_row: usize,
}

impl ParsedSheet {
    /// Wraps raw rows. Returns `None` when no row has a non-empty cell.
    pub fn new(file_name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Option<Self> {
        let detected = rows
            .iter()
            .position(|row| row.iter().any(|cell| !cell.is_empty()))?;
        Some(Self {
            file_name: file_name.into(),
            rows,
            detected_header_row: detected + 1,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Every raw row, header rows included.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First row with at least one non-empty cell (1-based).
    pub fn detected_header_row(&self) -> usize {
        self.detected_header_row
    }

    /// Non-blank column names on the given 1-based row.
    pub fn headers_at(&self, header_row: usize) -> Option<Vec<String>> {
        let row = self.rows.get(header_row.checked_sub(1)?)?;
        Some(
            row.iter()
                .map(|cell| cell.to_string().trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        )
    }

    /// Headers on the detected header row.
    pub fn headers(&self) -> Vec<String> {
        self.headers_at(self.detected_header_row)
            .unwrap_or_default()
    }

    /// Rows strictly after the given 1-based header row.
    pub fn data_rows(&self, header_row: usize) -> &[Vec<CellValue>] {
        self.rows.get(header_row.max(1)..).unwrap_or(&[])
    }

    /// Descriptor for validation, using `header_row` for the header set.
    ///
    /// An out-of-range header row yields an empty header set; the row count
    /// always reflects the whole sheet.
    pub fn descriptor(&self, header_row: usize) -> SourceFileDescriptor {
        SourceFileDescriptor::new(
            self.file_name.clone(),
            self.headers_at(header_row).unwrap_or_default(),
            self.rows.len(),
        )
    }
}
