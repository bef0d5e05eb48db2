//! BGP evaluation: candidate sets, bindings and the join executor

pub mod binding;
pub mod docset;
pub mod executor;

pub use binding::{Binding, BindingArena, BindingId};
pub use docset::{CompositePatternDocSet, LeafPatternDocSet, PatternDocSet, PatternMatch};
pub use executor::{BgpExecutor, EvaluationStats, Solutions};
