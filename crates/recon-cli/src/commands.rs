use anyhow::{Context, Result, anyhow};
use comfy_table::Table;
use recon_cli::config::ReconConfig;
use recon_cli::logging::redact_value;
use recon_cli::workflow::{init_state, load_sheets, open_session, schema_from_master};
use recon_core::ConflictPolicy;
use recon_ingest::{AutoSheetParser, SheetParser, preview};
use recon_output::{
    DirectorySink, OutputFormat, ReconciliationSink, Submission, load_session, save_session,
};
use tracing::{debug, info, info_span};

use crate::cli::{InitArgs, OutputFormatArg, PolicyArg, PreviewArgs, RunArgs, ValidateArgs};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{InitResult, RunResult, ValidateResult};

pub fn run_init(args: &InitArgs, config: &ReconConfig) -> Result<InitResult> {
    let parser = AutoSheetParser::new(config.ingest.options());
    let schema = schema_from_master(&parser, &args.master, args.master_header_row)?;
    let loaded = load_sheets(&parser, &args.files);
    let errors = loaded
        .failures
        .iter()
        .map(|(_, error)| error.user_message())
        .collect();
    let files = loaded
        .sheets
        .iter()
        .map(|sheet| {
            (
                sheet.file_name().to_string(),
                sheet.detected_header_row(),
                sheet.headers().len(),
            )
        })
        .collect();

    let state = init_state(schema, &loaded.sheets);
    save_session(&state, &args.out).context("write session file")?;
    Ok(InitResult {
        session_path: args.out.clone(),
        master_columns: state.master_columns.columns().to_vec(),
        files,
        errors,
    })
}

pub fn run_validate(args: &ValidateArgs, config: &ReconConfig) -> Result<ValidateResult> {
    let _span = info_span!("validate", session = %args.session.display()).entered();
    let parser = AutoSheetParser::new(config.ingest.options());
    let state = load_session(&args.session).context("load session")?;
    let loaded = load_sheets(&parser, &args.files);
    let mut session = open_session(state, loaded, config.reconcile.conflict_policy);
    let report = session.validate();
    Ok(ValidateResult {
        report,
        logs: session.logs().to_vec(),
    })
}

pub fn run_run(args: &RunArgs, config: &ReconConfig) -> Result<RunResult> {
    let _span = info_span!("run", session = %args.session.display()).entered();
    let parser = AutoSheetParser::new(config.ingest.options());
    let policy = args
        .policy
        .map_or(config.reconcile.conflict_policy, policy_from_arg);
    let format = args
        .format
        .map_or(config.output.format, format_from_arg);
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output.dir.clone());

    let mut state = load_session(&args.session).context("load session")?;
    if let Some(master) = &args.master {
        state.master_columns = schema_from_master(&parser, master, None)?;
    }
    let loaded = load_sheets(&parser, &args.files);
    let mut session = open_session(state, loaded, policy);

    let report = session.validate();
    if !report.is_valid() {
        info!(errors = report.error_count(), "validation failed, nothing merged");
        return Ok(RunResult {
            policy,
            report,
            outcome: None,
            sink: None,
            output_dir: None,
            logs: session.logs().to_vec(),
            has_errors: true,
        });
    }

    let outcome = session.reconcile().context("reconcile")?.clone();
    for collision in &outcome.collisions {
        debug!(
            identity = redact_value(&collision.identity),
            column = %collision.column,
            kept = redact_value(&collision.kept.to_string()),
            discarded = redact_value(&collision.discarded.to_string()),
            "collision detail"
        );
    }

    let sink_outcome = if args.dry_run {
        info!("dry run, no files written");
        None
    } else {
        let sink = DirectorySink::new(&output_dir, format);
        let state = session.state();
        let result = sink.submit(&Submission {
            state: &state,
            sources: session.files(),
            outcome: &outcome,
            policy,
        });
        for line in &result.log {
            session.add_log(line.clone());
        }
        Some(result)
    };

    let has_errors = !outcome.failures.is_empty()
        || sink_outcome.as_ref().is_some_and(|s| !s.success);
    Ok(RunResult {
        policy,
        report,
        outcome: Some(outcome),
        output_dir: sink_outcome.as_ref().map(|_| output_dir),
        sink: sink_outcome,
        logs: session.logs().to_vec(),
        has_errors,
    })
}

pub fn run_preview(args: &PreviewArgs, config: &ReconConfig) -> Result<()> {
    let parser = AutoSheetParser::new(config.ingest.options());
    let sheet = parser
        .parse(&args.file)
        .map_err(|e| anyhow!(e.user_message()))?;
    let header_row = args.header_row.unwrap_or_else(|| sheet.detected_header_row());
    let limit = args.rows.unwrap_or(config.ingest.preview_rows);
    let view = preview(&sheet, header_row, limit);

    println!(
        "{} ({} rows, header row {header_row})",
        sheet.file_name(),
        sheet.row_count()
    );
    let mut table = Table::new();
    table.set_header(view.columns.iter().map(|c| header_cell(c)).collect::<Vec<_>>());
    apply_table_style(&mut table);
    for row in &view.rows {
        table.add_row(row.iter().map(|(_, value)| value.to_string()).collect::<Vec<_>>());
    }
    println!("{table}");
    Ok(())
}

fn policy_from_arg(arg: PolicyArg) -> ConflictPolicy {
    match arg {
        PolicyArg::LastWriteWins => ConflictPolicy::LastWriteWins,
        PolicyArg::FirstWriteWins => ConflictPolicy::FirstWriteWins,
    }
}

fn format_from_arg(arg: OutputFormatArg) -> OutputFormat {
    match arg {
        OutputFormatArg::Csv => OutputFormat::Csv,
        OutputFormatArg::Json => OutputFormat::Json,
    }
}
