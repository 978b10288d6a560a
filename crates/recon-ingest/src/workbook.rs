//! Excel and OpenDocument workbook reading.
//!
//! Only the first worksheet is read. Cell positions are kept absolute, so
//! blank leading rows and columns survive and header rows keep the number
//! the user sees in the spreadsheet application.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use recon_model::CellValue;
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::sheet::ParsedSheet;

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INT: i64 = 1 << 53;

/// Reads the first worksheet of a workbook.
pub fn read_workbook(path: &Path) -> Result<ParsedSheet> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_name = workbook.sheet_names().first().cloned();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyFile {
            path: path.to_path_buf(),
        })?
        .map_err(|e| workbook_error(e.to_string()))?;

    let (first_row, first_column) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); first_row as usize];
    for source in range.rows() {
        let mut row = vec![CellValue::Empty; first_column as usize];
        row.extend(source.iter().map(cell_value));
        rows.push(row);
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string);
    let row_count = rows.len();
    let sheet = ParsedSheet::new(file_name, rows).ok_or_else(|| IngestError::EmptyFile {
        path: path.to_path_buf(),
    })?;
    debug!(
        file_name = sheet.file_name(),
        sheet = sheet_name.as_deref().unwrap_or_default(),
        rows = row_count,
        header_row = sheet.detected_header_row(),
        "parsed workbook"
    );
    Ok(sheet)
}

/// Maps a workbook cell onto the primitive cell model.
///
/// Dates stay as their serial number; integers too wide for `f64` and
/// error cells are kept as text.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::text(text.trim())
        }
        Data::Float(number) if number.is_finite() => CellValue::Number(*number),
        Data::Float(number) => CellValue::Text(number.to_string()),
        Data::Int(number) if number.abs() <= MAX_EXACT_INT => CellValue::Number(*number as f64),
        Data::Int(number) => CellValue::Text(number.to_string()),
        Data::Bool(flag) => CellValue::Text(flag.to_string()),
        Data::DateTime(date) => CellValue::Number(date.as_f64()),
        Data::Error(error) => CellValue::Text(error.to_string()),
    }
}
