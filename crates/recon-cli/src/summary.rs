use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use recon_validate::{Severity, ValidationReport};

use crate::types::{InitResult, RunResult, ValidateResult};

pub fn print_init(result: &InitResult) {
    println!("Session: {}", result.session_path.display());
    println!("Master columns: {}", result.master_columns.join(", "));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Header row"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for (file_name, header_row, columns) in &result.files {
        table.add_row(vec![
            file_cell(file_name),
            Cell::new(header_row),
            Cell::new(columns),
        ]);
    }
    println!("{table}");
    print_errors(&result.errors);
}

pub fn print_validation(result: &ValidateResult) {
    print_report(&result.report);
    print_errors(&result.logs);
}

pub fn print_run(result: &RunResult) {
    println!("Policy: {}", result.policy);
    if let Some(dir) = &result.output_dir {
        println!("Output: {}", dir.display());
    }
    let Some(outcome) = &result.outcome else {
        print_report(&result.report);
        print_errors(&result.logs);
        return;
    };

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Records"),
        header_cell("Skipped"),
        header_cell("Warnings"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for file in &result.report.files {
        let warnings = file.result.warnings.len();
        let row = match outcome.file(&file.file_name) {
            Some(done) => vec![
                file_cell(&file.file_name),
                Cell::new(done.records.len()),
                count_cell(done.skipped_rows, Color::Yellow),
                count_cell(warnings, Color::Yellow),
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
            ],
            None => vec![
                file_cell(&file.file_name),
                dim_cell("-"),
                dim_cell("-"),
                count_cell(warnings, Color::Yellow),
                Cell::new("failed").fg(Color::Red),
            ],
        };
        table.add_row(row);
    }
    table.add_row(vec![
        Cell::new("MERGED")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(outcome.records.len()).add_attribute(Attribute::Bold),
        count_cell(outcome.skipped_rows(), Color::Yellow).add_attribute(Attribute::Bold),
        count_cell(result.report.warning_count(), Color::Yellow),
        dim_cell("-"),
    ]);
    println!("{table}");

    if !outcome.collisions.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            header_cell("Identity"),
            header_cell("Column"),
            header_cell("Kept"),
            header_cell("From"),
            header_cell("Discarded"),
            header_cell("From"),
        ]);
        apply_table_style(&mut table);
        for c in &outcome.collisions {
            table.add_row(vec![
                Cell::new(&c.identity),
                Cell::new(&c.column),
                Cell::new(c.kept.to_string()).fg(Color::Green),
                dim_cell(&c.kept_from),
                Cell::new(c.discarded.to_string()).fg(Color::Yellow),
                dim_cell(&c.discarded_from),
            ]);
        }
        println!();
        println!("Collisions:");
        println!("{table}");
    }

    if !result.logs.is_empty() {
        println!();
        for line in &result.logs {
            println!("{line}");
        }
    }
}

fn print_report(report: &ValidationReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Severity"),
        header_cell("Field"),
        header_cell("Code"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    let mut any = false;
    for file in &report.files {
        for issue in file.result.errors.iter().chain(&file.result.warnings) {
            any = true;
            table.add_row(vec![
                file_cell(&file.file_name),
                severity_cell(issue.severity()),
                Cell::new(issue.field().unwrap_or_else(|| "-".to_string())),
                Cell::new(issue.code()),
                Cell::new(issue.message()),
            ]);
        }
    }
    if any {
        println!("{table}");
    }
    let status = if report.is_valid() { "valid" } else { "invalid" };
    println!(
        "{} file(s): {} error(s), {} warning(s), {status}",
        report.files.len(),
        report.error_count(),
        report.warning_count(),
    );
}

fn print_errors(lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    eprintln!("Errors:");
    for line in lines {
        eprintln!("- {line}");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn file_cell(file_name: &str) -> Cell {
    Cell::new(file_name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
