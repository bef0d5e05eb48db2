//! Triple store engine over Tantivy
//!
//! This module is organized into the following submodules:
//! - `constants`: Field names and sentinels used across the codebase
//! - `config`: Engine configuration (EngineConfig, SortOrder, FailurePolicy)
//! - `schema`: The fixed triple schema and resolved field handles
//! - `core`: Core TripleStore struct and constructors
//! - `document`: Write-side graph operations (add, delete, clear, commit)
//! - `execution`: Read-side graph operations (find, size, graphs, BGP queries)
//! - `search`: Searcher snapshot implementing the index primitives
//! - `stats`: Operation counters

pub mod config;
pub mod constants;
pub mod core;
pub mod document;
pub mod execution;
pub mod schema;
pub mod search;
pub mod stats;

// Re-export main types for convenience
pub use config::{load_config, EngineConfig, FailurePolicy, SortOrder, WriterConfig};
pub use constants::*;
pub use core::TripleStore;
pub use schema::{build_triple_schema, IndexFields};
pub use search::IndexSnapshot;
pub use stats::{IndexStats, IndexStatsSnapshot};
