//! Sheet ingestion.
//!
//! Turns CSV/TSV files and Excel workbooks into a [`ParsedSheet`]: a 2-D grid of
//! primitive [`CellValue`](recon_model::CellValue)s plus the detected
//! header row. Everything downstream (mapping, validation,
//! reconciliation) only sees this shape.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use recon_ingest::{AutoSheetParser, SheetParser};
//!
//! let sheet = AutoSheetParser::default().parse(Path::new("contacts.xlsx"))?;
//! let descriptor = sheet.descriptor(sheet.detected_header_row());
//! ```

#![deny(unsafe_code)]

mod error;
mod format;
mod parser;
mod preview;
mod reader;
mod sheet;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Reading ===
pub use format::SheetFormat;
pub use parser::{AutoSheetParser, CsvSheetParser, IngestOptions, SheetParser, WorkbookSheetParser};
pub use reader::{
    MAX_FILE_SIZE, check_file_size, parse_reader, read_delimited, read_sheet, read_workbook_file,
    validate_encoding,
};
pub use workbook::read_workbook;

// === Parsed Data ===
pub use preview::{DEFAULT_PREVIEW_ROWS, SheetPreview, preview};
pub use sheet::ParsedSheet;
