//! raidtable - item dataset builder for ARC Raiders community data
//!
//! raidtable reads the per-item JSON documents of the community data
//! repository, resolves localized text to one language, rewrites item
//! references to display names, and writes flat rows plus the column list
//! and name indices a table UI needs.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and parsing
//! - `core`: Normalization engine (two-phase pipeline)
//! - `corpus`: Fetching and listing source documents
//! - `error`: Error types
//! - `logging`: Tracing subscriber setup
//! - `output`: Writing and loading artifacts
//! - `query`: Search, sort and cell formatting over built rows

pub mod cli;
pub mod config;
pub mod core;
pub mod corpus;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
