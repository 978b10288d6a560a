use std::fs;
use std::path::Path;

use recon_model::SessionState;

use super::atomic::write_atomic;
use crate::error::{OutputError, Result};

/// Saves a session as pretty JSON: `{ masterColumns, mappings, activeStep }`.
pub fn save_session(state: &SessionState, path: &Path) -> Result<()> {
    let mut bytes =
        serde_json::to_vec_pretty(state).map_err(|source| OutputError::Serialization {
            what: "session",
            source,
        })?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), files = state.mappings.len(), "saved session");
    Ok(())
}

/// Loads a session file. Mapping order in the file is the merge order.
pub fn load_session(path: &Path) -> Result<SessionState> {
    let text = fs::read_to_string(path).map_err(|e| OutputError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let state: SessionState =
        serde_json::from_str(&text).map_err(|source| OutputError::InvalidSession {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(
        path = %path.display(),
        columns = state.master_columns.len(),
        files = state.mappings.len(),
        "loaded session"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let state: SessionState = serde_json::from_str(
            r#"{
                "masterColumns": ["Name", "Email"],
                "mappings": {
                    "b.csv": {"nameColumn": "Id", "headerRow": 2, "columnMappings": []},
                    "a.csv": {"nameColumn": "Id", "headerRow": 1, "columnMappings": []}
                },
                "activeStep": 2
            }"#,
        )
        .unwrap();

        save_session(&state, &path).unwrap();
        let loaded = load_session(&path).unwrap();

        assert_eq!(loaded, state);
        let order: Vec<&str> = loaded.mappings.file_names().collect();
        assert_eq!(order, ["b.csv", "a.csv"]);
    }

    #[test]
    fn rejects_duplicate_master_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"masterColumns": ["A", "A"]}"#).unwrap();
        let err = load_session(&path).unwrap_err();
        assert!(matches!(err, OutputError::InvalidSession { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_session(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, OutputError::Io { operation: "read", .. }));
    }
}
