use std::path::PathBuf;

use recon_core::{ConflictPolicy, MergeOutcome};
use recon_output::SinkOutcome;
use recon_validate::ValidationReport;

#[derive(Debug)]
pub struct InitResult {
    pub session_path: PathBuf,
    pub master_columns: Vec<String>,
    /// (file name, detected header row, header count)
    pub files: Vec<(String, usize, usize)>,
    pub errors: Vec<String>,
}

#[derive(Debug)]
pub struct ValidateResult {
    pub report: ValidationReport,
    pub logs: Vec<String>,
}

#[derive(Debug)]
pub struct RunResult {
    pub policy: ConflictPolicy,
    pub report: ValidationReport,
    /// `None` when validation failed.
    pub outcome: Option<MergeOutcome>,
    /// `None` on a dry run or when nothing was merged.
    pub sink: Option<SinkOutcome>,
    pub output_dir: Option<PathBuf>,
    pub logs: Vec<String>,
    pub has_errors: bool,
}
