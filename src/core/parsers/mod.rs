//! Source document parsers.
//!
//! - `json`: per-entity JSON documents (items and craft benches)

pub mod json;
