//! Phase 1: corpus-wide ID → display-name indices.
//!
//! Reference fields point at other items by opaque ID, and a single record
//! cannot know the names of the items it references. The whole corpus is
//! indexed first and the result is frozen before any row is built.

use serde_json::Value;
use tracing::trace;

use super::{NameIndex, NormalizeOptions, RawRecord, locale::localized_text};

/// Frozen output of the index phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Indices {
    /// Item ID → item name.
    pub items: NameIndex,
    /// Craft-bench ID → bench name. `None` when no bench corpus exists.
    pub benches: Option<NameIndex>,
}

/// Builds an ID → name index over `records`.
///
/// Records lacking a non-null `id` or `name` are left out. When two records
/// share an ID the later one wins.
pub fn build_name_index<'r>(
    records: impl IntoIterator<Item = &'r RawRecord>,
    options: &NormalizeOptions,
) -> NameIndex {
    let mut index = NameIndex::new();
    for record in records {
        if let Some((id, name)) = index_entry(record, options) {
            trace!(%id, %name, "indexed");
            index.insert(id, name);
        }
    }
    index
}

/// Reads the `(id, name)` pair of one record.
pub fn index_entry(record: &RawRecord, options: &NormalizeOptions) -> Option<(String, String)> {
    let id = id_key(record.get("id")?)?;
    let name = record.get("name").filter(|v| !v.is_null())?;
    Some((
        id,
        localized_text(name, options.detection, &options.language),
    ))
}

/// Stringifies an ID the same way for every record: strings verbatim,
/// numbers as written (`42`, not `42.0`).
pub fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
