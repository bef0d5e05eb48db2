pub mod collector;
pub mod filters;

pub use collector::{CursorPageCollector, PageFruit};
pub use filters::{compile_filters, predicate_query};
