//! Normalization engine (two-phase pipeline).
//!
//! ## Phases
//!
//! 1. **Index**: every item and craft-bench document is read once to build the
//!    ID → display-name maps ([`index`]). The maps are frozen into [`Indices`].
//! 2. **Rows**: every item document is flattened ([`flatten`]), its reference
//!    fields are rewritten through the frozen item index ([`resolve`]), and the
//!    result is filtered and projected onto the output columns ([`project`]).
//!
//! [`pipeline`] drives both phases; [`locale`] is shared by all of them.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

pub mod flatten;
pub mod index;
pub mod locale;
pub mod parsers;
pub mod pipeline;
pub mod project;
pub mod resolve;

pub use flatten::{FlattenStrategy, ValueFlattener};
pub use index::{Indices, build_name_index};
pub use locale::{LocaleDetection, is_locale_map, pick_locale};
pub use pipeline::{BuildOutput, Pipeline, RunMetadata};
pub use project::{ColumnSelection, Projection, RequiredFields, RowProjector, discover_columns};
pub use resolve::resolve_references;

/// One source document as read from disk, keys in file order.
pub type RawRecord = Map<String, Value>;

/// One flattened record, keyed by output field name.
pub type NormalizedRow = Map<String, Value>;

/// ID → display name, ordered by ID for stable output.
pub type NameIndex = BTreeMap<String, String>;

/// Field names whose objects map item IDs to quantities.
pub const DEFAULT_REFERENCE_FIELDS: &[&str] = &[
    "recipe",
    "recyclesInto",
    "salvagesInto",
    "upgradeCost",
    "repairCost",
];

/// Field rendered as a `label: value` list.
pub const DEFAULT_EFFECTS_FIELD: &str = "effects";

/// Settings shared by every normalization stage of one run.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Target language for locale maps.
    pub language: String,
    pub detection: LocaleDetection,
    pub strategy: FlattenStrategy,
    pub reference_fields: Vec<String>,
    pub effects_field: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            language: locale::BASE_LOCALE.to_string(),
            detection: LocaleDetection::default(),
            strategy: FlattenStrategy::default(),
            reference_fields: DEFAULT_REFERENCE_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            effects_field: DEFAULT_EFFECTS_FIELD.to_string(),
        }
    }
}

impl NormalizeOptions {
    pub fn is_reference_field(&self, field: &str) -> bool {
        self.reference_fields.iter().any(|f| f == field)
    }
}
