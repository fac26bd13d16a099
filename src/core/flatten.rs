//! Record flattening.
//!
//! Turns one [`RawRecord`] into one [`NormalizedRow`]. Two disciplines exist
//! and exactly one is used for a whole run, since column names depend on it:
//!
//! - [`FlattenStrategy::Shallow`]: columns are the record's top-level fields.
//!   Nested objects are rendered to a single string cell.
//! - [`FlattenStrategy::DotPath`]: nested objects are expanded into
//!   `a.b.c` columns. Locale maps are leaves.
//!
//! Reference fields are kept as structured objects under both strategies so
//! that [`super::resolve`] sees the same field names either way.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    NormalizeOptions, NormalizedRow, RawRecord,
    locale::{VALUE_KEY, display_text, pick_locale},
};

/// Separator between entries of the effects field.
const EFFECTS_SEPARATOR: &str = "\n";

/// Separator between entries of other rendered objects.
const KEY_VALUE_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum FlattenStrategy {
    /// One column per top-level field.
    #[default]
    Shallow,
    /// One column per leaf path (`stats.damage`, `name`, `name.value`).
    DotPath,
}

/// Flattens raw records according to one set of [`NormalizeOptions`].
pub struct ValueFlattener<'a> {
    options: &'a NormalizeOptions,
}

impl<'a> ValueFlattener<'a> {
    pub fn new(options: &'a NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn flatten(&self, record: RawRecord) -> NormalizedRow {
        match self.options.strategy {
            FlattenStrategy::Shallow => self.flatten_shallow(record),
            FlattenStrategy::DotPath => self.flatten_dot_path(record),
        }
    }

    fn flatten_shallow(&self, record: RawRecord) -> NormalizedRow {
        let mut row = NormalizedRow::new();
        for (key, value) in record {
            let normalized = self.normalize_field(&key, value);
            row.insert(key, normalized);
        }
        row
    }

    /// Applies the per-field rules in order: scalars, nulls and arrays pass
    /// through, then locale maps, reference fields, effects, other objects.
    fn normalize_field(&self, key: &str, value: Value) -> Value {
        let map = match value {
            Value::Object(map) => map,
            other => return other,
        };

        if self.options.detection.matches(&map) {
            return pick_locale(&map, &self.options.language);
        }
        if self.options.is_reference_field(key) {
            return Value::Object(map);
        }
        if key == self.options.effects_field {
            return Value::String(self.format_effects(&map));
        }
        Value::String(format_key_value_list(&map))
    }

    /// Renders `{"heal": {"en": "Healing", "value": 25}}` as `Healing: 25`.
    fn format_effects(&self, effects: &Map<String, Value>) -> String {
        effects
            .iter()
            .map(|(key, entry)| {
                let label = match self.options.detection.as_locale_map(entry) {
                    Some(labels) => display_text(&pick_locale(labels, &self.options.language)),
                    None => key.clone(),
                };
                let value = entry
                    .get(VALUE_KEY)
                    .filter(|v| !v.is_null())
                    .map(display_text)
                    .unwrap_or_default();
                format!("{}: {}", label, value)
            })
            .collect::<Vec<_>>()
            .join(EFFECTS_SEPARATOR)
    }

    fn flatten_dot_path(&self, record: RawRecord) -> NormalizedRow {
        let mut row = NormalizedRow::new();
        for (key, value) in record {
            if let Value::Object(map) = &value
                && self.options.is_reference_field(&key)
                && !self.options.detection.matches(map)
            {
                row.insert(key, value);
                continue;
            }
            self.flatten_into(key, value, &mut row);
        }
        row
    }

    fn flatten_into(&self, path: String, value: Value, row: &mut NormalizedRow) {
        match value {
            Value::Object(map) if self.options.detection.matches(&map) => {
                let raw_value = map.get(VALUE_KEY).cloned();
                row.insert(path.clone(), pick_locale(&map, &self.options.language));
                if let Some(raw_value) = raw_value {
                    row.insert(format!("{}.{}", path, VALUE_KEY), raw_value);
                }
            }
            Value::Object(map) => {
                for (key, val) in map {
                    self.flatten_into(format!("{}.{}", path, key), val, row);
                }
            }
            leaf => {
                row.insert(path, leaf);
            }
        }
    }
}

/// Renders a plain object as `key: value` pairs, one level deep.
///
/// Nested objects and arrays are written as compact JSON.
pub fn format_key_value_list(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(key, value)| format!("{}: {}", key, display_text(value)))
        .collect::<Vec<_>>()
        .join(KEY_VALUE_SEPARATOR)
}
