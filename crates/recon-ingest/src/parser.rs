//! Parser collaborator.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::reader::{MAX_FILE_SIZE, read_delimited, read_sheet, read_workbook_file};
use crate::sheet::ParsedSheet;

/// Turns a file on disk into raw rows plus a detected header row.
///
/// The rest of the workspace depends only on this shape, so other
/// spreadsheet readers can be plugged in behind it.
pub trait SheetParser {
    fn parse(&self, path: &Path) -> Result<ParsedSheet>;
}

/// Options shared by the built-in parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// CSV/TSV parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvSheetParser {
    options: IngestOptions,
}

impl CsvSheetParser {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }
}

impl SheetParser for CsvSheetParser {
    fn parse(&self, path: &Path) -> Result<ParsedSheet> {
        read_delimited(path, self.options.max_file_size)
    }
}

/// Excel/OpenDocument parser reading the first worksheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookSheetParser {
    options: IngestOptions,
}

impl WorkbookSheetParser {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }
}

impl SheetParser for WorkbookSheetParser {
    fn parse(&self, path: &Path) -> Result<ParsedSheet> {
        read_workbook_file(path, self.options.max_file_size)
    }
}

/// Picks [`CsvSheetParser`] or [`WorkbookSheetParser`] by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoSheetParser {
    options: IngestOptions,
}

impl AutoSheetParser {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }
}

impl SheetParser for AutoSheetParser {
    fn parse(&self, path: &Path) -> Result<ParsedSheet> {
        read_sheet(path, self.options.max_file_size)
    }
}
