//! Phase 2: rewriting reference fields through the frozen item index.
//!
//! A reference field such as `recipe` maps item IDs to quantities:
//! `{"metal_parts": 3}`. Resolution swaps each ID for its display name and
//! leaves the quantity untouched: `{"Metal Parts": 3}`.

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::{NameIndex, NormalizedRow};

/// Resolves every configured reference field present on `row`.
///
/// Only object values are rewritten; arrays, strings and nulls are left as
/// they are.
pub fn resolve_references(row: &mut NormalizedRow, fields: &[String], index: &NameIndex) {
    for field in fields {
        if let Some(Value::Object(refs)) = row.get_mut(field) {
            let resolved = resolve_reference_map(std::mem::take(refs), index);
            *refs = resolved;
        }
    }
}

/// Maps the keys of `refs` through `index`, keeping entry order.
///
/// Unknown IDs keep their raw ID. When two IDs resolve to the same name, the
/// first takes the name and later ones keep their raw ID. A name that equals
/// another raw ID in `refs` is not used either, so the number of entries never
/// changes.
pub fn resolve_reference_map(refs: Map<String, Value>, index: &NameIndex) -> Map<String, Value> {
    let ids: HashSet<String> = refs.keys().cloned().collect();
    let mut resolved = Map::with_capacity(refs.len());
    for (id, value) in refs {
        let key = match index.get(&id) {
            Some(name) if !resolved.contains_key(name) && !ids.contains(name) => name.clone(),
            _ => id,
        };
        resolved.insert(key, value);
    }
    resolved
}
