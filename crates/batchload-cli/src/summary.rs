//! Console output: run header, per-file summary table, clean-up report.

use std::path::{Path, PathBuf};

use batchload_common::absolute_path;
use batchload_runner::{FileOutcome, FileReport, RunMode, RunPlan, RunReport};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

pub fn print_run_header(plan: &RunPlan) {
    println!("Runtime  : {}", display_path(&plan.runtime_dir));
    println!("Config   : {}", display_path(&plan.config));
    println!("Data     : {}", display_path(&plan.data_dir));
    match &plan.templates_dir {
        Some(dir) => println!("Templates: {}", display_path(dir)),
        None => println!("Templates: (next to data)"),
    }
    println!("Logs     : {}", display_path(&plan.logs_dir));
    match plan.mode {
        RunMode::Retry => println!("Retry dir: {}", display_path(plan.source_dir())),
        RunMode::Delete => println!(
            "Deletes  : {}",
            display_path(&plan.delete_templates_dir)
        ),
        RunMode::Load => {}
    }
    println!("Mode     : {}", plan.mode);
    println!();
}

pub fn print_run_summary(report: &RunReport) {
    println!("{}", summary_table(report));
    println!("Done.");
}

/// Builds the per-file outcome table with a totals row.
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("File"),
        header_cell("Template"),
        header_cell("Outcome"),
        header_cell("Log"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);

    for (index, file) in report.files.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(&file.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            optional_path_cell(file.template.as_deref()),
            outcome_cell(&file.outcome),
            log_cell(file),
        ]);
    }

    table.add_row(vec![
        Cell::new(""),
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} file(s), {} mode", report.files.len(), report.mode))
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} ok, {} failed, {} skipped",
            report.succeeded(),
            report.failed(),
            report.skipped()
        ))
        .fg(totals_color(report))
        .add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

pub fn print_clean_report(dir: &Path, removed: &[PathBuf]) {
    if removed.is_empty() {
        println!("No .failed files found in {}", dir.display());
        return;
    }
    println!("Removed {} .failed file(s):", removed.len());
    for marker in removed {
        let name = marker
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!("  - {name}");
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(5)),
        ColumnConstraint::UpperBoundary(Width::Percentage(25)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
        ColumnConstraint::LowerBoundary(Width::Fixed(12)),
        ColumnConstraint::UpperBoundary(Width::Percentage(30)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn outcome_cell(outcome: &FileOutcome) -> Cell {
    let cell = Cell::new(outcome.to_string());
    match outcome {
        FileOutcome::Succeeded => cell.fg(Color::Green).add_attribute(Attribute::Bold),
        FileOutcome::Failed { .. } | FileOutcome::LaunchFailed { .. } => {
            cell.fg(Color::Red).add_attribute(Attribute::Bold)
        }
        FileOutcome::Skipped { .. } => cell.fg(Color::Yellow),
    }
}

fn log_cell(file: &FileReport) -> Cell {
    match &file.log {
        Some(log) if file.outcome.is_failure() => Cell::new(log.display()).fg(Color::Red),
        Some(log) => Cell::new(log.display()),
        None => dim_cell("-"),
    }
}

fn optional_path_cell(path: Option<&Path>) -> Cell {
    match path.and_then(Path::file_name) {
        Some(name) => Cell::new(name.to_string_lossy()),
        None => dim_cell("-"),
    }
}

fn totals_color(report: &RunReport) -> Color {
    if report.has_failures() {
        Color::Red
    } else if report.skipped() > 0 {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn display_path(path: &Path) -> String {
    absolute_path(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
