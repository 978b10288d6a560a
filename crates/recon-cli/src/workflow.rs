//! File-level steps shared by the subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use recon_core::{ConflictPolicy, Session};
use recon_ingest::{IngestError, ParsedSheet, SheetParser};
use recon_model::{FileMapping, MappingSet, MasterSchema, SessionState, SessionStep};
use tracing::{debug, info};

/// Parse results for a batch of files.
#[derive(Debug, Default)]
pub struct LoadedFiles {
    pub sheets: Vec<ParsedSheet>,
    /// Files that could not be read, keyed by file name.
    pub failures: Vec<(String, IngestError)>,
    names: Vec<String>,
}

impl LoadedFiles {
    /// File names in argument order, failed ones included.
    pub fn file_names(&self) -> Vec<String> {
        self.names.clone()
    }
}

/// Key under which a file's mapping is stored: its bare file name.
pub fn file_key(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string)
}

/// Parses every path. A failing file never stops the others.
pub fn load_sheets<P: SheetParser + ?Sized>(parser: &P, paths: &[PathBuf]) -> LoadedFiles {
    let mut loaded = LoadedFiles::default();
    for path in paths {
        loaded.names.push(file_key(path));
        match parser.parse(path) {
            Ok(sheet) => {
                debug!(
                    file_name = sheet.file_name(),
                    rows = sheet.row_count(),
                    header_row = sheet.detected_header_row(),
                    "parsed sheet"
                );
                loaded.sheets.push(sheet);
            }
            Err(error) => loaded.failures.push((file_key(path), error)),
        }
    }
    info!(
        parsed = loaded.sheets.len(),
        failed = loaded.failures.len(),
        "files loaded"
    );
    loaded
}

/// Master schema from the header row of a master sheet.
///
/// Blank header cells are dropped; duplicate names are an error.
pub fn schema_from_master<P: SheetParser + ?Sized>(
    parser: &P,
    path: &Path,
    header_row: Option<usize>,
) -> Result<MasterSchema> {
    let sheet = parser
        .parse(path)
        .map_err(|e| anyhow!(e.user_message()))
        .with_context(|| format!("read master file {}", path.display()))?;
    let row = header_row.unwrap_or_else(|| sheet.detected_header_row());
    let names = sheet
        .headers_at(row)
        .ok_or_else(|| anyhow!("master file {} has no row {row}", path.display()))?;
    let schema = MasterSchema::new(names)
        .with_context(|| format!("master columns of {}", path.display()))?;
    info!(columns = schema.len(), "master schema loaded");
    Ok(schema)
}

/// Fresh session state: one default mapping per sheet, with the header
/// row set to the detected one.
pub fn init_state(schema: MasterSchema, sheets: &[ParsedSheet]) -> SessionState {
    let mappings: MappingSet = sheets
        .iter()
        .map(|sheet| FileMapping {
            header_row: sheet.detected_header_row(),
            ..FileMapping::new(sheet.file_name())
        })
        .collect();
    let active_step = if mappings.is_empty() {
        SessionStep::Idle
    } else {
        SessionStep::FilesSelected
    };
    SessionState {
        master_columns: schema,
        mappings,
        active_step: active_step.index(),
    }
}

/// Rebuilds a session from saved state plus freshly parsed files.
///
/// Files not yet in the session get default mappings; parse failures
/// become processing log lines.
pub fn open_session(state: SessionState, loaded: LoadedFiles, policy: ConflictPolicy) -> Session {
    let mut session = Session::from_state(state);
    session.set_policy(policy);
    session.select_files(loaded.file_names());
    for sheet in loaded.sheets {
        session.attach_sheet(sheet);
    }
    for (file_name, error) in &loaded.failures {
        session.record_parse_failure(file_name, error);
    }
    session
}
