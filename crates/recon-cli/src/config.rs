//! `recon.toml` settings.
//!
//! ```toml
//! [reconcile]
//! conflict_policy = "last_write_wins"   # or "first_write_wins"
//!
//! [ingest]
//! max_file_size_mb = 500
//! preview_rows = 5
//!
//! [output]
//! dir = "recon-output"
//! format = "csv"                        # or "json"
//! ```
//!
//! Every key is optional. Command-line flags win over the file, the file
//! wins over built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use recon_core::ConflictPolicy;
use recon_ingest::{DEFAULT_PREVIEW_ROWS, IngestOptions, MAX_FILE_SIZE};
use recon_output::OutputFormat;
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "recon.toml";

const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconConfig {
    pub reconcile: ReconcileSettings,
    pub ingest: IngestSettings,
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileSettings {
    pub conflict_policy: ConflictPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestSettings {
    pub max_file_size_mb: u64,
    pub preview_rows: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: MAX_FILE_SIZE / BYTES_PER_MB,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl IngestSettings {
    pub fn options(&self) -> IngestOptions {
        IngestOptions {
            max_file_size: self.max_file_size_mb.saturating_mul(BYTES_PER_MB),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub format: OutputFormat,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("recon-output"),
            format: OutputFormat::default(),
        }
    }
}

impl ReconConfig {
    /// Loads `explicit`, or `recon.toml` from the working directory if it
    /// exists, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}
