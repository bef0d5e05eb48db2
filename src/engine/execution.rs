//! Read-side graph operations for TripleStore

use oxrdf::{GraphName, Triple};

use crate::algebra::{BgpExecutor, Solutions};
use crate::codec::decode_graph;
use crate::engine::constants::UNNAMED_GRAPH;
use crate::engine::core::TripleStore;
use crate::engine::search::IndexSnapshot;
use crate::error::{PatternResolutionFailure, StoreError};
use crate::model::{TriplePattern, ValueConstraint};
use crate::paging::{DeepPagingIterator, RecordSource};

impl TripleStore {
    /// Stream the triples of `graph` matching `pattern`; variables are wildcards.
    pub fn find(
        &self,
        graph: &GraphName,
        pattern: &TriplePattern,
    ) -> Result<DeepPagingIterator<IndexSnapshot>, StoreError> {
        let filters = self.registry.pattern_predicates(graph, pattern, |_| None)?;
        Ok(DeepPagingIterator::new(self.snapshot(), filters, self.config.fetch_size)
            .with_sort(self.config.sort))
    }

    /// Number of triples in `graph`
    pub fn size(&self, graph: &GraphName) -> Result<u64, StoreError> {
        let filters = vec![self.registry.graph_predicate(graph)];
        Ok(self.snapshot().count(&filters)?)
    }

    /// Number of triples of `graph` matching `pattern`
    pub fn count(&self, graph: &GraphName, pattern: &TriplePattern) -> Result<u64, StoreError> {
        let filters = self.registry.pattern_predicates(graph, pattern, |_| None)?;
        Ok(self.snapshot().count(&filters)?)
    }

    pub fn contains(&self, graph: &GraphName, triple: &Triple) -> Result<bool, StoreError> {
        Ok(self.count(graph, &TriplePattern::from(triple.clone()))? > 0)
    }

    /// Named graphs holding at least one triple
    pub fn graph_names(&self) -> Result<Vec<GraphName>, StoreError> {
        let snapshot = self.snapshot();
        let mut graphs = Vec::new();
        for term in snapshot.graph_terms()? {
            if term == UNNAMED_GRAPH {
                continue;
            }
            let graph = decode_graph(&term)?;
            // terms of deleted records linger until segments merge
            if snapshot.count(&[self.registry.graph_predicate(&graph)])? > 0 {
                graphs.push(graph);
            }
        }
        log::debug!("Found {} named graphs", graphs.len());
        Ok(graphs)
    }

    /// Join executor over the current snapshot of `graph`
    pub fn executor(&self, graph: &GraphName) -> BgpExecutor<IndexSnapshot> {
        BgpExecutor::new(self.snapshot(), self.registry.clone(), graph.clone())
            .with_config(&self.config)
    }

    /// Evaluate a basic graph pattern against `graph`
    pub fn query(
        &self,
        graph: &GraphName,
        patterns: &[TriplePattern],
    ) -> Result<Solutions<IndexSnapshot>, PatternResolutionFailure> {
        self.executor(graph).evaluate(patterns)
    }

    /// Evaluate a basic graph pattern with value constraints against `graph`
    pub fn query_constrained(
        &self,
        graph: &GraphName,
        patterns: &[TriplePattern],
        constraints: &[ValueConstraint],
    ) -> Result<Solutions<IndexSnapshot>, PatternResolutionFailure> {
        self.executor(graph).evaluate_constrained(patterns, constraints)
    }
}
