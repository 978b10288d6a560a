//! Quick look at the top of a sheet.

use recon_model::CellValue;
use serde::Serialize;

use crate::sheet::ParsedSheet;

/// Data rows shown by default.
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Header names and the first few data rows keyed by header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetPreview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<(String, CellValue)>>,
}

/// Builds a preview using `header_row` (1-based) and up to `limit` data rows.
///
/// Blank header cells are skipped together with their column.
pub fn preview(sheet: &ParsedSheet, header_row: usize, limit: usize) -> SheetPreview {
    let header_cells = header_row
        .checked_sub(1)
        .and_then(|index| sheet.rows().get(index))
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let named: Vec<(usize, String)> = header_cells
        .iter()
        .enumerate()
        .map(|(index, cell)| (index, cell.to_string().trim().to_string()))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let rows = sheet
        .data_rows(header_row)
        .iter()
        .take(limit)
        .map(|row| {
            named
                .iter()
                .map(|(index, name)| (name.clone(), row.get(*index).cloned().unwrap_or_default()))
                .collect()
        })
        .collect();

    SheetPreview {
        columns: named.into_iter().map(|(_, name)| name).collect(),
        rows,
    }
}
