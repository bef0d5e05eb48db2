pub mod algebra;
pub mod codec;
pub mod compiler;
pub mod data;
pub mod engine;
pub mod error;
pub mod injector;
pub mod model;
pub mod paging;
pub mod tantivy_integration;

pub use algebra::{BgpExecutor, Binding, EvaluationStats, Solutions};
pub use compiler::{parse_bgp, parse_statement, parse_term, BgpParseError};
pub use data::{load_into, LoadSummary, QuadParser};
pub use engine::{load_config, EngineConfig, FailurePolicy, SortOrder, TripleStore};
pub use error::{
    IndexQueryError, MalformedTermError, PatternResolutionFailure, QueryError, StoreError,
};
pub use injector::FieldInjectorRegistry;
pub use model::{Comparison, PatternTerm, Position, RecordId, TriplePattern, ValueConstraint};
pub use paging::{DeepPagingIterator, PagedRecord};
