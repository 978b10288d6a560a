//! Sheet reading: delimited text directly, workbooks through calamine.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use recon_model::CellValue;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::format::SheetFormat;
use crate::sheet::ParsedSheet;
use crate::workbook::read_workbook;

/// Maximum file size for sheet loading (500 MB default).
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

const WIDE_SHEET_COLUMNS: usize = 500;

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Check file size against a limit.
pub fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }

    Ok(())
}

/// Rejects UTF-16 files by their byte order mark.
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = open(path)?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }

    Ok(())
}

/// Reads any supported sheet, picking the reader by file extension.
pub fn read_sheet(path: &Path, max_size: u64) -> Result<ParsedSheet> {
    let format = SheetFormat::from_path(path)?;
    check_file_size(path, max_size)?;
    match format {
        SheetFormat::Workbook => read_workbook(path),
        SheetFormat::Csv | SheetFormat::Tsv => {
            validate_encoding(path)?;
            let file = open(path)?;
            parse_reader(path, file, format)
        }
    }
}

/// Reads a CSV/TSV file; workbooks are rejected.
pub fn read_delimited(path: &Path, max_size: u64) -> Result<ParsedSheet> {
    match SheetFormat::from_path(path)? {
        SheetFormat::Workbook => Err(unsupported(path)),
        SheetFormat::Csv | SheetFormat::Tsv => read_sheet(path, max_size),
    }
}

/// Reads the first worksheet of a workbook; delimited text is rejected.
pub fn read_workbook_file(path: &Path, max_size: u64) -> Result<ParsedSheet> {
    match SheetFormat::from_path(path)? {
        SheetFormat::Workbook => read_sheet(path, max_size),
        SheetFormat::Csv | SheetFormat::Tsv => Err(unsupported(path)),
    }
}

fn unsupported(path: &Path) -> IngestError {
    IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase(),
    }
}

/// Parses delimited text from any reader.
///
/// `path` names the source in errors and supplies the sheet's file name.
/// Rows may be ragged; a UTF-8 BOM on the first cell is dropped.
pub fn parse_reader<R: Read>(path: &Path, reader: R, format: SheetFormat) -> Result<ParsedSheet> {
    let delimiter = format.delimiter().ok_or_else(|| unsupported(path))?;
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let row = record
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                if rows.is_empty() && index == 0 {
                    CellValue::from_raw(raw.trim_start_matches('\u{feff}'))
                } else {
                    CellValue::from_raw(raw)
                }
            })
            .collect();
        rows.push(row);
    }

    let widest = rows.iter().map(Vec::len).max().unwrap_or(0);
    if widest > WIDE_SHEET_COLUMNS {
        warn!(
            path = %path.display(),
            columns = widest,
            "sheet has more than {WIDE_SHEET_COLUMNS} columns"
        );
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
        rows = row_count,
        header_row = sheet.detected_header_row(),
        "parsed sheet"
    );
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn temp_sheet(suffix: &str, content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_with_bom_and_ragged_rows() {
        let file = temp_sheet(".csv", "\u{feff}Name,Email,Phone\nAlice,a@x.com\n".as_bytes());
        let sheet = read_sheet(file.path(), MAX_FILE_SIZE).unwrap();

        assert_eq!(sheet.headers(), ["Name", "Email", "Phone"]);
        assert_eq!(sheet.rows()[1].len(), 2);
    }

    #[test]
    fn test_read_tsv() {
        let file = temp_sheet(".tsv", b"Name\tAge\nBob\t42\n");
        let sheet = read_sheet(file.path(), MAX_FILE_SIZE).unwrap();

        assert_eq!(sheet.rows()[1][1], CellValue::Number(42.0));
    }

    #[test]
    fn test_empty_file() {
        let file = temp_sheet(".csv", b"");
        let result = read_sheet(file.path(), MAX_FILE_SIZE);

        assert!(matches!(result, Err(IngestError::EmptyFile { .. })));
    }

    #[test]
    fn test_utf16_rejected() {
        let file = temp_sheet(".csv", &[0xFF, 0xFE, b'A', 0x00]);
        let result = read_sheet(file.path(), MAX_FILE_SIZE);

        assert!(matches!(
            result,
            Err(IngestError::UnsupportedEncoding { encoding: "UTF-16 LE", .. })
        ));
    }

    #[test]
    fn test_size_limit() {
        let file = temp_sheet(".csv", b"Name\nAlice\n");
        let result = read_sheet(file.path(), 4);

        assert!(matches!(result, Err(IngestError::FileTooLarge { max_size: 4, .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = read_sheet(Path::new("/definitely/not/here.csv"), MAX_FILE_SIZE);

        assert!(matches!(result, Err(IngestError::FileNotFound { .. })));
    }
}
