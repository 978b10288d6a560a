//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "recon",
    version,
    about = "Reconcile spreadsheet columns from many files into one master schema",
    long_about = "Map the columns of several source spreadsheets onto a master schema,\n\
                  validate the mappings and merge the rows by a name column.\n\n\
                  Reads .csv, .tsv, .xlsx and .xls files. Settings come from recon.toml when present."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values (names, e-mail addresses...) in log output.
    #[arg(long = "log-values", global = true)]
    pub log_values: bool,

    /// Configuration file (default: ./recon.toml if present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a session file with default mappings for the given files.
    Init(InitArgs),

    /// Validate the session's mappings against the given files.
    Validate(ValidateArgs),

    /// Validate, reconcile and merge, then write the results.
    Run(RunArgs),

    /// Show the header row and first data rows of a file.
    Preview(PreviewArgs),
}

#[derive(Parser)]
pub struct InitArgs {
    /// Spreadsheet whose header row defines the master columns.
    #[arg(long = "master", value_name = "FILE")]
    pub master: PathBuf,

    /// 1-based header row of the master file (default: first non-blank row).
    #[arg(long = "master-header-row", value_name = "ROW")]
    pub master_header_row: Option<usize>,

    /// Where to write the session file.
    #[arg(long = "out", value_name = "FILE", default_value = "session.json")]
    pub out: PathBuf,

    /// Source spreadsheets.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Session file holding the master columns and mappings.
    #[arg(long = "session", value_name = "FILE")]
    pub session: PathBuf,

    /// Source spreadsheets referenced by the session.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Session file holding the master columns and mappings.
    #[arg(long = "session", value_name = "FILE")]
    pub session: PathBuf,

    /// Replace the session's master columns with this file's header row.
    #[arg(long = "master", value_name = "FILE")]
    pub master: Option<PathBuf>,

    /// Output directory (default: [output] dir from the config, or ./recon-output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Which value survives when files disagree.
    #[arg(long = "policy", value_enum)]
    pub policy: Option<PolicyArg>,

    /// Record file format.
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Validate and merge without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Source spreadsheets referenced by the session.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct PreviewArgs {
    /// Spreadsheet to preview.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of data rows to show (default: [ingest] preview_rows, or 5).
    #[arg(long = "rows", value_name = "N")]
    pub rows: Option<usize>,

    /// 1-based header row (default: first non-blank row).
    #[arg(long = "header-row", value_name = "ROW")]
    pub header_row: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    LastWriteWins,
    FirstWriteWins,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
