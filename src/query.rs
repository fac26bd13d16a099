//! Querying built rows: keyword search, column sort, and cell formatting.
//!
//! This is the contract the output format has to stay compatible with. It
//! works on the artifacts alone, never on the source corpus.
//!
//! - Search: the keyword is split on whitespace and every term must occur,
//!   case-insensitively, somewhere in the row's column values.
//! - Sort: numeric when every non-empty value in the column is a finite
//!   number, otherwise text with case and accents
//!   ignored. Empty values always go last.

use std::{cmp::Ordering, collections::HashSet};

use clap::ValueEnum;
use serde_json::Value;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::core::{NameIndex, NormalizedRow, locale::display_text};

/// Cell text shown for empty values.
pub const EMPTY_CELL: &str = "-";

/// Column holding craft-bench IDs.
pub const CRAFT_BENCH_COLUMN: &str = "craftBench";

/// Display text used instead of [`EMPTY_CELL`] for some empty columns.
const EMPTY_SUBSTITUTIONS: &[(&str, &str)] = &[("stackSize", "1"), ("foundIn", "Unknown")];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Text of one cell as searched: arrays joined with `", "`, objects as JSON.
fn cell_search_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_text(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => display_text(other),
    }
}

/// Lowercased, space-joined text of all `columns` of `row`.
pub fn row_search_text(row: &NormalizedRow, columns: &[String]) -> String {
    columns
        .iter()
        .map(|column| cell_search_text(row.get(column)))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Rows containing every whitespace-separated term of `keyword`.
///
/// An empty or blank keyword matches every row.
pub fn filter_rows<'a>(
    rows: &'a [NormalizedRow],
    columns: &[String],
    keyword: &str,
) -> Vec<&'a NormalizedRow> {
    let keyword = keyword.to_lowercase();
    let terms: Vec<&str> = keyword.split_whitespace().collect();

    if terms.is_empty() {
        return rows.iter().collect();
    }

    rows.iter()
        .filter(|row| {
            let text = row_search_text(row, columns);
            terms.iter().all(|term| text.contains(term))
        })
        .collect()
}

/// Absent, null and `""` all count as empty.
pub fn is_empty_value(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
        || matches!(value, Some(Value::String(s)) if s.is_empty())
}

/// Numeric reading of a value, if it has one.
///
/// Numbers and numeric strings (surrounding whitespace allowed) qualify;
/// booleans count as 1 and 0. Infinite and NaN results do not qualify.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().ok()?
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Columns whose every non-empty value is numeric.
pub fn detect_numeric_columns<'a>(
    rows: impl IntoIterator<Item = &'a NormalizedRow> + Clone,
    columns: &[String],
) -> HashSet<String> {
    columns
        .iter()
        .filter(|column| {
            rows.clone().into_iter().all(|row| {
                let value = row.get(column.as_str());
                is_empty_value(value) || value.and_then(numeric_value).is_some()
            })
        })
        .cloned()
        .collect()
}

/// Ascending comparison of two cells; empty cells sort after everything.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>, numeric: bool) -> Ordering {
    match (is_empty_value(a), is_empty_value(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }
    let (Some(a), Some(b)) = (a, b) else {
        return Ordering::Equal;
    };

    if numeric && let (Some(na), Some(nb)) = (numeric_value(a), numeric_value(b)) {
        return na.total_cmp(&nb);
    }

    collation_key(&cell_search_text(Some(a))).cmp(&collation_key(&cell_search_text(Some(b))))
}

/// Text with case and diacritics folded away, so `Établi` sorts with `etabli`.
fn collation_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Sorts `rows` by `column` in place.
///
/// Does nothing when `column` is not one of `columns`. Rows with an empty
/// value stay at the end in both directions. The sort is stable.
pub fn sort_rows(
    rows: &mut [&NormalizedRow],
    column: &str,
    direction: SortDirection,
    columns: &[String],
    numeric_columns: &HashSet<String>,
) {
    if !columns.iter().any(|c| c == column) {
        return;
    }
    let numeric = numeric_columns.contains(column);

    rows.sort_by(|a, b| {
        let (va, vb) = (a.get(column), b.get(column));
        match (is_empty_value(va), is_empty_value(vb)) {
            (false, false) => {
                let cmp = compare_values(va, vb, numeric);
                match direction {
                    SortDirection::Asc => cmp,
                    SortDirection::Desc => cmp.reverse(),
                }
            }
            _ => compare_values(va, vb, numeric),
        }
    });
}

/// Display form of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellText {
    pub text: String,
    pub is_empty: bool,
}

impl CellText {
    fn empty() -> Self {
        Self {
            text: EMPTY_CELL.to_string(),
            is_empty: true,
        }
    }

    fn filled(text: String) -> Self {
        Self {
            text,
            is_empty: false,
        }
    }
}

/// Formats one cell for display.
///
/// Craft-bench IDs are shown through `benches`, the keys of reference objects
/// through `items`. `expanded` puts list entries on separate lines instead of
/// joining them with `", "`.
pub fn format_cell_value(
    row: &NormalizedRow,
    column: &str,
    items: &NameIndex,
    benches: &NameIndex,
    expanded: bool,
) -> CellText {
    let separator = if expanded { "\n" } else { ", " };
    let value = match row.get(column) {
        Some(value) if !is_empty_value(Some(value)) => value,
        _ => return empty_cell(column),
    };

    if column == CRAFT_BENCH_COLUMN {
        return format_bench_ids(value, benches, separator);
    }

    match value {
        Value::Array(entries) => {
            let mut parts: Vec<String> = entries.iter().map(display_text).collect();
            parts.sort();
            CellText::filled(parts.join(separator))
        }
        Value::Object(entries) if entries.is_empty() => CellText::empty(),
        Value::Object(entries) => {
            let pairs: Vec<String> = entries
                .iter()
                .map(|(key, val)| {
                    let name = items.get(key).unwrap_or(key);
                    format!("{}: {}", name, display_text(val))
                })
                .collect();
            CellText::filled(pairs.join(separator))
        }
        other => CellText::filled(display_text(other)),
    }
}

fn empty_cell(column: &str) -> CellText {
    EMPTY_SUBSTITUTIONS
        .iter()
        .find(|(c, _)| *c == column)
        .map(|(_, text)| CellText::filled(text.to_string()))
        .unwrap_or_else(CellText::empty)
}

/// Bench IDs may come as an array, a comma-separated string, or a single ID.
fn format_bench_ids(value: &Value, benches: &NameIndex, separator: &str) -> CellText {
    let raw: Vec<String> = match value {
        Value::Array(ids) => ids.iter().map(display_text).collect(),
        Value::String(s) => s.split(',').map(str::to_string).collect(),
        other => vec![display_text(other)],
    };

    let parts: Vec<String> = raw
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && *id != "null" && *id != "undefined")
        .map(|id| benches.get(id).cloned().unwrap_or_else(|| id.to_string()))
        .collect();

    if parts.is_empty() {
        CellText::empty()
    } else {
        CellText::filled(parts.join(separator))
    }
}
