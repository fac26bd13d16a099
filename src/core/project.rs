//! Row filtering and column projection.
//!
//! A normalized row is dropped when its `type` is excluded or when the
//! [`RequiredFields`] predicate fails. Surviving rows are reduced to the
//! configured columns, or, in discovery mode, the column list is derived from
//! the rows themselves.

use std::collections::{BTreeSet, HashSet};

use serde_json::Value;

use super::{NormalizedRow, locale::display_text};

/// Columns that lead the discovered column list, in this order.
pub const PRIORITY_COLUMNS: &[&str] = &[
    "id",
    "name",
    "type",
    "rarity",
    "value",
    "weightKg",
    "stackSize",
];

/// Field holding the item type used for exclusion.
pub const TYPE_FIELD: &str = "type";

/// How the output column list is determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Allow-list loaded from configuration, in output order.
    Fixed(Vec<String>),
    /// Union of all fields seen, priority columns first.
    Discover,
}

/// Fields that must be present and non-null for a row to be emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredFields(Vec<String>);

impl RequiredFields {
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    /// Returns the first required field that is absent or null.
    pub fn first_missing(&self, row: &NormalizedRow) -> Option<&str> {
        self.0
            .iter()
            .find(|field| row.get(field.as_str()).is_none_or(Value::is_null))
            .map(String::as_str)
    }

    pub fn is_satisfied_by(&self, row: &NormalizedRow) -> bool {
        self.first_missing(row).is_none()
    }
}

/// Outcome of projecting one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Keep(NormalizedRow),
    /// The row's `type` is in the exclude list.
    SkippedByType(String),
    /// A required field is absent or null.
    MissingRequired(String),
}

pub struct RowProjector {
    exclude_types: HashSet<String>,
    required: RequiredFields,
    columns: ColumnSelection,
}

impl RowProjector {
    pub fn new(
        exclude_types: impl IntoIterator<Item = String>,
        required: RequiredFields,
        columns: ColumnSelection,
    ) -> Self {
        Self {
            exclude_types: exclude_types.into_iter().collect(),
            required,
            columns,
        }
    }

    pub fn columns(&self) -> &ColumnSelection {
        &self.columns
    }

    /// Filters one row and reduces it to the allow-listed columns.
    ///
    /// Absent columns are omitted rather than written as null.
    pub fn project(&self, row: NormalizedRow) -> Projection {
        if let Some(item_type) = self.excluded_type(&row) {
            return Projection::SkippedByType(item_type);
        }
        if let Some(field) = self.required.first_missing(&row) {
            return Projection::MissingRequired(field.to_string());
        }

        match &self.columns {
            ColumnSelection::Fixed(columns) => Projection::Keep(select_columns(row, columns)),
            ColumnSelection::Discover => Projection::Keep(row),
        }
    }

    /// Produces the final column list and, in discovery mode, re-keys every
    /// row into that order.
    pub fn finish(&self, rows: Vec<NormalizedRow>) -> (Vec<NormalizedRow>, Vec<String>) {
        match &self.columns {
            ColumnSelection::Fixed(columns) => (rows, columns.clone()),
            ColumnSelection::Discover => {
                let columns = discover_columns(&rows);
                let rows = rows
                    .into_iter()
                    .map(|row| select_columns(row, &columns))
                    .collect();
                (rows, columns)
            }
        }
    }

    fn excluded_type(&self, row: &NormalizedRow) -> Option<String> {
        let item_type = match row.get(TYPE_FIELD)? {
            Value::Null => return None,
            Value::String(s) if s.is_empty() => return None,
            other => display_text(other),
        };
        self.exclude_types
            .contains(&item_type)
            .then_some(item_type)
    }
}

/// Copies the fields of `row` listed in `columns`, in column order.
pub fn select_columns(mut row: NormalizedRow, columns: &[String]) -> NormalizedRow {
    let mut selected = NormalizedRow::new();
    for column in columns {
        if let Some(value) = row.remove(column) {
            selected.insert(column.clone(), value);
        }
    }
    selected
}

/// Union of all row fields: [`PRIORITY_COLUMNS`] that occur, then the rest
/// in lexicographic order.
pub fn discover_columns(rows: &[NormalizedRow]) -> Vec<String> {
    let seen: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.keys().map(String::as_str))
        .collect();

    let mut columns: Vec<String> = PRIORITY_COLUMNS
        .iter()
        .filter(|c| seen.contains(*c))
        .map(|c| c.to_string())
        .collect();
    columns.extend(
        seen.into_iter()
            .filter(|c| !PRIORITY_COLUMNS.contains(c))
            .map(str::to_string),
    );
    columns
}
