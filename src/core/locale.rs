//! Locale map detection and resolution.
//!
//! A locale map is an object carrying the same text in several languages,
//! e.g. `{"en": "Shield", "fr": "Bouclier"}`, optionally with a raw `value`
//! next to the localized label. Resolution collapses it to one value using a
//! fixed fallback chain: target language, `en`, `value`, first declared key.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Locale used when the target language has no entry.
pub const BASE_LOCALE: &str = "en";

/// Key carrying a raw (non-text) value alongside localized labels.
pub const VALUE_KEY: &str = "value";

/// Closed set of locale codes recognized by [`LocaleDetection::ClosedSet`].
pub const KNOWN_LOCALES: &[&str] = &[
    "ar", "br", "cs", "da", "de", "el", "en", "es", "es-419", "es-MX", "fi", "fr", "he", "hr",
    "hu", "id", "it", "ja", "ko", "kr", "nl", "no", "pl", "pt", "pt-BR", "ro", "ru", "sr", "sv",
    "th", "tr", "uk", "vi", "zh", "zh-CN", "zh-HANS", "zh-HANT", "zh-TW",
];

/// Rule used to decide whether an object is a locale map.
///
/// The two rules disagree on partially localized objects: `{"en": 1, "max": 5}`
/// is a locale map under `ContainsEn` but not under `ClosedSet`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum LocaleDetection {
    /// Every key is `value` or a known locale code.
    #[default]
    ClosedSet,
    /// The object has an `en` key.
    ContainsEn,
}

impl LocaleDetection {
    /// Returns the object if `value` is a locale map under this rule.
    pub fn as_locale_map(self, value: &Value) -> Option<&Map<String, Value>> {
        value.as_object().filter(|map| self.matches(map))
    }

    /// Checks an already-unwrapped object against this rule.
    pub fn matches(self, map: &Map<String, Value>) -> bool {
        if map.is_empty() {
            return false;
        }
        match self {
            LocaleDetection::ClosedSet => map
                .keys()
                .all(|k| k == VALUE_KEY || KNOWN_LOCALES.contains(&k.as_str())),
            LocaleDetection::ContainsEn => map.contains_key(BASE_LOCALE),
        }
    }
}

/// Checks if `value` is a locale map under `detection`.
///
/// Null, scalars, arrays, and empty objects are never locale maps.
pub fn is_locale_map(value: &Value, detection: LocaleDetection) -> bool {
    detection.as_locale_map(value).is_some()
}

/// Collapses a locale map to a single value.
///
/// Tries `target`, then `en`, then `value`, then the first declared entry.
/// Null entries fall through. Returns an empty string when nothing is left.
pub fn pick_locale(map: &Map<String, Value>, target: &str) -> Value {
    [target, BASE_LOCALE, VALUE_KEY]
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
        .or_else(|| map.values().next().filter(|v| !v.is_null()))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

/// Renders a value as display text.
///
/// Strings are used verbatim; everything else uses its compact JSON form
/// (`null`, `true`, `12.5`, `[1,2]`, `{"a":1}`).
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolves `value` to display text, collapsing it first if it is a locale map.
pub fn localized_text(value: &Value, detection: LocaleDetection, target: &str) -> String {
    match detection.as_locale_map(value) {
        Some(map) => display_text(&pick_locale(map, target)),
        None => display_text(value),
    }
}
