//! Basic graph pattern evaluation by index-pushdown nested-loop join.
//!
//! Every pattern is first resolved on its own. Any empty candidate set ends the
//! evaluation right there. The sets are then ordered smallest first and joined
//! level by level: for each record of the current pivot set the pattern's new
//! variables are bound, and the next pattern is resolved again with those
//! bindings pushed into the index query as exact term predicates. A pattern
//! sharing no variable with the bindings reuses its candidate list for every
//! parent. The resulting per-parent sets are unioned into the next pivot. The
//! last pivot is turned into output rows lazily by [`Solutions`].

use std::sync::Arc;

use oxrdf::{GraphName, Term, Triple, Variable};

use crate::algebra::binding::{Binding, BindingArena, BindingId};
use crate::algebra::docset::{CompositePatternDocSet, LeafPatternDocSet, PatternDocSet, PatternMatch};
use crate::codec::decode_triple;
use crate::engine::config::{EngineConfig, FailurePolicy, SortOrder};
use crate::engine::constants::DEFAULT_FETCH_SIZE;
use crate::error::{PatternResolutionFailure, QueryError};
use crate::injector::{FieldInjectorRegistry, Predicate};
use crate::model::{term_at, RecordId, TriplePattern, ValueConstraint};
use crate::paging::{DeepPagingIterator, RecordSource};

/// Work done by one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvaluationStats {
    /// Independent resolutions of the input patterns
    pub patterns_resolved: usize,
    /// Constrained resolutions issued while joining
    pub join_probes: usize,
    pub bindings_emitted: usize,
}

/// Evaluates BGPs against one graph of one index snapshot.
pub struct BgpExecutor<S> {
    source: S,
    registry: Arc<FieldInjectorRegistry>,
    graph: GraphName,
    page_length: usize,
    sort: SortOrder,
    policy: FailurePolicy,
}

impl<S: RecordSource + Clone> BgpExecutor<S> {
    pub fn new(source: S, registry: Arc<FieldInjectorRegistry>, graph: GraphName) -> Self {
        Self {
            source,
            registry,
            graph,
            page_length: DEFAULT_FETCH_SIZE,
            sort: SortOrder::default(),
            policy: FailurePolicy::default(),
        }
    }

    /// Page length, sort and failure policy from `config`.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.page_length = config.fetch_size.max(1);
        self.sort = config.sort;
        self.policy = config.failure_policy;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_page_length(mut self, page_length: usize) -> Self {
        self.page_length = page_length.max(1);
        self
    }

    pub fn evaluate(&self, patterns: &[TriplePattern]) -> Result<Solutions<S>, PatternResolutionFailure> {
        self.evaluate_constrained(patterns, &[])
    }

    /// Evaluates `patterns` keeping only rows where each constrained variable
    /// satisfies its comparison.
    pub fn evaluate_constrained(
        &self,
        patterns: &[TriplePattern],
        constraints: &[ValueConstraint],
    ) -> Result<Solutions<S>, PatternResolutionFailure> {
        let mut stats = EvaluationStats::default();
        match self.join(patterns, constraints, &mut stats) {
            Ok(solutions) => Ok(solutions),
            Err(failure) => match self.policy {
                FailurePolicy::FailOpen => {
                    log::error!("{}; the basic graph pattern yields no rows", failure);
                    Ok(Solutions::empty(self.source.clone(), self.policy, stats))
                }
                FailurePolicy::FailClosed => Err(failure),
            },
        }
    }

    fn join(
        &self,
        patterns: &[TriplePattern],
        constraints: &[ValueConstraint],
        stats: &mut EvaluationStats,
    ) -> Result<Solutions<S>, PatternResolutionFailure> {
        if patterns.is_empty() {
            return Ok(Solutions::unit(self.source.clone(), self.policy));
        }

        let mut arena = BindingArena::new();
        let mut candidate_sets = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = Arc::new(pattern.clone());
            let records = self.resolve(&pattern, None, &arena, constraints)?;
            stats.patterns_resolved += 1;
            if records.is_empty() {
                log::debug!("No candidates for '{}', skipping the remaining patterns", pattern);
                return Ok(Solutions::empty(self.source.clone(), self.policy, *stats));
            }
            candidate_sets.push(LeafPatternDocSet::new(pattern, records, None));
        }

        // stable: ties keep input order
        candidate_sets.sort_by_key(|set| set.size());
        log::debug!(
            "Join order: {}",
            candidate_sets
                .iter()
                .map(|set| format!("[{}] ({})", set.triple_pattern(), set.size()))
                .collect::<Vec<_>>()
                .join(" JOIN ")
        );

        let mut remaining = candidate_sets.into_iter();
        let mut pivot: Box<dyn PatternDocSet> = match remaining.next() {
            Some(head) => Box::new(head),
            None => return Ok(Solutions::empty(self.source.clone(), self.policy, *stats)),
        };

        for next in remaining {
            let next_pattern = Arc::clone(next.triple_pattern());
            let mut composite = CompositePatternDocSet::new(Arc::clone(&next_pattern));

            for PatternMatch { record, parent } in pivot.matches() {
                let triple = self.read_triple(record, pivot.triple_pattern())?;
                let Some(binding) = bind(&mut arena, parent, pivot.triple_pattern(), &triple) else {
                    continue;
                };
                let joined = next_pattern
                    .variables()
                    .into_iter()
                    .any(|variable| arena.lookup(Some(binding), variable).is_some());
                let leaf = if joined {
                    stats.join_probes += 1;
                    let records = self.resolve(&next_pattern, Some(binding), &arena, constraints)?;
                    LeafPatternDocSet::new(Arc::clone(&next_pattern), records, Some(binding))
                } else {
                    next.with_parent(Some(binding))
                };
                composite.union(leaf);
            }

            if composite.is_empty() {
                log::debug!("Join on '{}' left no rows", next_pattern);
                return Ok(Solutions::empty(self.source.clone(), self.policy, *stats));
            }
            pivot = Box::new(composite);
        }

        Ok(Solutions {
            source: self.source.clone(),
            pattern: Some(Arc::clone(pivot.triple_pattern())),
            matches: pivot.into_matches(),
            arena,
            policy: self.policy,
            stats: *stats,
            unit: false,
            done: false,
        })
    }

    /// Record ids matching `pattern`, with bound and constrained variables pushed down.
    fn resolve(
        &self,
        pattern: &TriplePattern,
        binding: Option<BindingId>,
        arena: &BindingArena,
        constraints: &[ValueConstraint],
    ) -> Result<Vec<RecordId>, PatternResolutionFailure> {
        let filters = self
            .filters(pattern, binding, arena, constraints)
            .map_err(|e| PatternResolutionFailure::new(pattern, e))?;
        DeepPagingIterator::new(&self.source, filters, self.page_length)
            .with_sort(self.sort)
            .record_ids()
            .collect::<Result<Vec<_>, QueryError>>()
            .map_err(|e| PatternResolutionFailure::new(pattern, e))
    }

    fn filters(
        &self,
        pattern: &TriplePattern,
        binding: Option<BindingId>,
        arena: &BindingArena,
        constraints: &[ValueConstraint],
    ) -> Result<Vec<Predicate>, QueryError> {
        let mut filters = self.registry.pattern_predicates(&self.graph, pattern, |variable| {
            arena.lookup(binding, variable).cloned()
        })?;
        for (position, slot) in pattern.positions() {
            let Some(variable) = slot.as_variable() else {
                continue;
            };
            if arena.lookup(binding, variable).is_some() {
                continue;
            }
            for constraint in constraints.iter().filter(|c| &c.variable == variable) {
                filters.extend(self.registry.constraint_predicates(position, constraint)?);
            }
        }
        Ok(filters)
    }

    fn read_triple(&self, record: RecordId, pattern: &TriplePattern) -> Result<Triple, PatternResolutionFailure> {
        read_triple(&self.source, record).map_err(|e| PatternResolutionFailure::new(pattern, e))
    }
}

fn read_triple<S: RecordSource>(source: &S, record: RecordId) -> Result<Triple, QueryError> {
    let stored = source.read_fields(record)?;
    Ok(decode_triple(&stored)?)
}

/// Extends `parent` with the variables `pattern` binds in `triple`.
///
/// Variables already bound by `parent` keep their value. `None` when a variable
/// repeated inside `pattern` meets two different terms.
fn bind(
    arena: &mut BindingArena,
    parent: Option<BindingId>,
    pattern: &TriplePattern,
    triple: &Triple,
) -> Option<BindingId> {
    let mut values: Vec<(Variable, Term)> = Vec::new();
    for (position, slot) in pattern.positions() {
        let Some(variable) = slot.as_variable() else {
            continue;
        };
        let term = term_at(triple, position);
        if let Some((_, earlier)) = values.iter().find(|(bound, _)| bound == variable) {
            if *earlier != term {
                return None;
            }
            continue;
        }
        if arena.lookup(parent, variable).is_none() {
            values.push((variable.clone(), term));
        }
    }
    Some(arena.extend(parent, values))
}

/// Lazily materialized output rows of one BGP evaluation.
pub struct Solutions<S> {
    source: S,
    /// Pattern of the last join level; `None` when there is nothing to bind
    pattern: Option<Arc<TriplePattern>>,
    matches: Box<dyn Iterator<Item = PatternMatch>>,
    arena: BindingArena,
    policy: FailurePolicy,
    stats: EvaluationStats,
    unit: bool,
    done: bool,
}

impl<S: RecordSource> Solutions<S> {
    fn empty(source: S, policy: FailurePolicy, stats: EvaluationStats) -> Self {
        Self {
            source,
            pattern: None,
            matches: Box::new(std::iter::empty()),
            arena: BindingArena::new(),
            policy,
            stats,
            unit: false,
            done: true,
        }
    }

    /// The single empty row of an empty BGP.
    fn unit(source: S, policy: FailurePolicy) -> Self {
        let mut solutions = Self::empty(source, policy, EvaluationStats::default());
        solutions.unit = true;
        solutions.done = false;
        solutions
    }

    pub fn stats(&self) -> EvaluationStats {
        self.stats
    }

    /// Bindings built so far, including intermediate join levels.
    pub fn bindings_allocated(&self) -> usize {
        self.arena.len()
    }
}

impl<S: RecordSource> Iterator for Solutions<S> {
    type Item = Result<Binding, PatternResolutionFailure>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.unit {
            self.done = true;
            self.stats.bindings_emitted += 1;
            return Some(Ok(Binding::default()));
        }
        let Some(pattern) = self.pattern.clone() else {
            self.done = true;
            return None;
        };
        loop {
            let Some(PatternMatch { record, parent }) = self.matches.next() else {
                self.done = true;
                return None;
            };
            let triple = match read_triple(&self.source, record) {
                Ok(triple) => triple,
                Err(e) => {
                    self.done = true;
                    let failure = PatternResolutionFailure::new(&pattern, e);
                    return match self.policy {
                        FailurePolicy::FailOpen => {
                            log::error!("{}; dropping the remaining rows", failure);
                            None
                        }
                        FailurePolicy::FailClosed => Some(Err(failure)),
                    };
                }
            };
            if let Some(binding) = bind(&mut self.arena, parent, &pattern, &triple) {
                self.stats.bindings_emitted += 1;
                return Some(Ok(self.arena.materialize(Some(binding))));
            }
        }
    }
}
