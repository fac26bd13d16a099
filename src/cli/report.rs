//! Report formatting and printing utilities.
//!
//! Separate from the pipeline so that the library can be used without any
//! terminal output. Every `print_*` function has a `*_to` twin taking a writer.

use std::{
    io::{self, Write},
    path::PathBuf,
};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::core::{BuildOutput, NameIndex, NormalizedRow, parsers::json::RecordWarning};
use crate::query::{CellText, format_cell_value};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Spaces between table columns.
const COLUMN_GAP: &str = "  ";

/// Print the outcome of a build.
pub fn print_build_summary(output: &BuildOutput, written: &[PathBuf], verbose: bool) {
    print_build_summary_to(output, written, verbose, &mut io::stdout().lock());
}

pub fn print_build_summary_to<W: Write>(
    output: &BuildOutput,
    written: &[PathBuf],
    verbose: bool,
    writer: &mut W,
) {
    let meta = &output.metadata;
    let _ = writeln!(
        writer,
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "Built {} {} with {} {} (language: {})",
            meta.row_count,
            plural(meta.row_count, "row", "rows"),
            meta.column_count,
            plural(meta.column_count, "column", "columns"),
            meta.language
        )
        .green()
    );

    let mut indexed = format!("{} item names", output.indices.items.len());
    if let Some(count) = meta.bench_count {
        indexed.push_str(&format!(", {} craft benches", count));
    }
    let _ = writeln!(writer, "  indexed: {}", indexed);

    if meta.skipped_by_type > 0 || meta.skipped_missing_required > 0 {
        let _ = writeln!(
            writer,
            "  skipped: {} by type, {} missing required fields",
            meta.skipped_by_type, meta.skipped_missing_required
        );
    }

    if verbose {
        for path in written {
            let _ = writeln!(writer, "  {} {}", "wrote".dimmed(), path.display());
        }
    } else if let Some(dir) = written.first().and_then(|p| p.parent()) {
        let _ = writeln!(writer, "  output: {}", dir.display());
    }
}

/// Print documents skipped because they could not be parsed.
pub fn print_record_warnings(warnings: &[RecordWarning]) {
    print_record_warnings_to(warnings, &mut io::stderr().lock());
}

pub fn print_record_warnings_to<W: Write>(warnings: &[RecordWarning], writer: &mut W) {
    if warnings.is_empty() {
        return;
    }
    let _ = writeln!(
        writer,
        "{} {} {} could not be parsed",
        "warning:".bold().yellow(),
        warnings.len(),
        plural(warnings.len(), "document", "documents")
    );
    for warning in warnings {
        let _ = writeln!(
            writer,
            "  {} {}: {}",
            "-->".blue(),
            warning.record_id,
            warning.error
        );
    }
}

/// Print a one-line warning to stderr.
pub fn print_warning(message: &str) {
    let _ = writeln!(
        io::stderr().lock(),
        "{} {}",
        "warning:".bold().yellow(),
        message
    );
}

/// Print the single row shown in place of a table when no data is available.
pub fn print_error_row(message: &str) {
    print_error_row_to(message, &mut io::stderr().lock());
}

pub fn print_error_row_to<W: Write>(message: &str, writer: &mut W) {
    let _ = writeln!(writer, "{} {}", FAILURE_MARK.red(), message.red());
}

/// Name indices used to display reference cells.
pub struct DisplayIndices<'a> {
    pub items: &'a NameIndex,
    pub benches: &'a NameIndex,
}

/// Print `rows` as an aligned table followed by a match count.
pub fn print_table(
    columns: &[String],
    rows: &[&NormalizedRow],
    total: usize,
    indices: &DisplayIndices<'_>,
    expanded: bool,
) {
    print_table_to(
        columns,
        rows,
        total,
        indices,
        expanded,
        &mut io::stdout().lock(),
    );
}

pub fn print_table_to<W: Write>(
    columns: &[String],
    rows: &[&NormalizedRow],
    total: usize,
    indices: &DisplayIndices<'_>,
    expanded: bool,
    writer: &mut W,
) {
    if rows.is_empty() {
        let _ = writeln!(writer, "{}", "No matching items.".dimmed());
        return;
    }

    let cells: Vec<Vec<CellText>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    format_cell_value(row, column, indices.items, indices.benches, expanded)
                })
                .collect()
        })
        .collect();
    let widths = column_widths(columns, &cells);

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .enumerate()
        .map(|(i, (column, width))| {
            pad(column, *width, i + 1 == columns.len())
                .bold()
                .to_string()
        })
        .collect();
    let _ = writeln!(writer, "{}", header.join(COLUMN_GAP));

    for row in &cells {
        let height = row
            .iter()
            .map(|cell| cell.text.lines().count().max(1))
            .max()
            .unwrap_or(1);
        for line in 0..height {
            let parts: Vec<String> = row
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, width))| {
                    let text = cell.text.lines().nth(line).unwrap_or("");
                    let padded = pad(text, *width, i + 1 == widths.len());
                    if cell.is_empty {
                        padded.dimmed().to_string()
                    } else {
                        padded
                    }
                })
                .collect();
            let _ = writeln!(writer, "{}", parts.join(COLUMN_GAP));
        }
    }

    let _ = writeln!(
        writer,
        "\n{} of {} {}",
        rows.len(),
        total,
        plural(total, "item", "items")
    );
}

// ============================================================
// Internal Functions
// ============================================================

/// Display width of each column: the widest line among header and cells.
fn column_widths(columns: &[String], cells: &[Vec<CellText>]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .flat_map(|row| row[i].text.lines())
                .map(UnicodeWidthStr::width)
                .chain(std::iter::once(UnicodeWidthStr::width(column.as_str())))
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Pads `text` to `width` display columns. The last column is not padded.
fn pad(text: &str, width: usize, last: bool) -> String {
    if last {
        return text.to_string();
    }
    let fill = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{}{}", text, " ".repeat(fill))
}

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

// ============================================================
// Tests
// ============================================================
