//! Candidate sets decorated with the pattern and parent binding that produced them.

use std::sync::Arc;

use crate::algebra::binding::BindingId;
use crate::model::{RecordId, TriplePattern};

/// One candidate record and the binding it extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub record: RecordId,
    pub parent: Option<BindingId>,
}

/// Countable, iterable set of records matching one triple pattern.
pub trait PatternDocSet {
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Pattern whose records this set holds.
    fn triple_pattern(&self) -> &Arc<TriplePattern>;

    /// Binding this set was resolved under. Composites answer `None`; each of
    /// their matches carries its own parent.
    fn parent_binding(&self) -> Option<BindingId>;

    fn matches(&self) -> Box<dyn Iterator<Item = PatternMatch> + '_>;

    fn into_matches(self: Box<Self>) -> Box<dyn Iterator<Item = PatternMatch>>;
}

/// Records resolved for one pattern under at most one parent binding.
///
/// The record list is reference counted, so leaves rebound to other parents
/// share one list.
#[derive(Debug, Clone)]
pub struct LeafPatternDocSet {
    pattern: Arc<TriplePattern>,
    records: Arc<Vec<RecordId>>,
    parent: Option<BindingId>,
}

impl LeafPatternDocSet {
    pub fn new(
        pattern: Arc<TriplePattern>,
        records: Vec<RecordId>,
        parent: Option<BindingId>,
    ) -> Self {
        Self {
            pattern,
            records: Arc::new(records),
            parent,
        }
    }

    /// Same pattern and records under another parent binding.
    pub fn with_parent(&self, parent: Option<BindingId>) -> Self {
        Self {
            pattern: Arc::clone(&self.pattern),
            records: Arc::clone(&self.records),
            parent,
        }
    }

    /// Copies the record list first if another leaf shares it.
    pub fn insert(&mut self, record: RecordId) {
        Arc::make_mut(&mut self.records).push(record);
    }

    pub fn shares_records(&self, other: &LeafPatternDocSet) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }

    pub fn records(&self) -> &[RecordId] {
        &self.records
    }

    /// Merge with a sibling resolved for the same pattern.
    pub fn union(self, other: LeafPatternDocSet) -> CompositePatternDocSet {
        let mut composite = CompositePatternDocSet::new(Arc::clone(&self.pattern));
        composite.union(self);
        composite.union(other);
        composite
    }
}

impl PatternDocSet for LeafPatternDocSet {
    fn size(&self) -> usize {
        self.records.len()
    }

    fn triple_pattern(&self) -> &Arc<TriplePattern> {
        &self.pattern
    }

    fn parent_binding(&self) -> Option<BindingId> {
        self.parent
    }

    fn matches(&self) -> Box<dyn Iterator<Item = PatternMatch> + '_> {
        let parent = self.parent;
        Box::new(
            self.records
                .iter()
                .map(move |record| PatternMatch { record: *record, parent }),
        )
    }

    fn into_matches(self: Box<Self>) -> Box<dyn Iterator<Item = PatternMatch>> {
        let parent = self.parent;
        let records = self.records;
        Box::new((0..records.len()).map(move |index| PatternMatch {
            record: records[index],
            parent,
        }))
    }
}

/// Read-only union of leaf sets for one pattern, each with its own parent.
///
/// The size is the running sum of the constituents, never recomputed.
#[derive(Debug, Clone)]
pub struct CompositePatternDocSet {
    pattern: Arc<TriplePattern>,
    members: Vec<LeafPatternDocSet>,
    size: usize,
}

impl CompositePatternDocSet {
    pub fn new(pattern: Arc<TriplePattern>) -> Self {
        Self {
            pattern,
            members: Vec::new(),
            size: 0,
        }
    }

    /// Adds a constituent; empty ones are dropped.
    pub fn union(&mut self, member: LeafPatternDocSet) {
        debug_assert!(
            Arc::ptr_eq(&self.pattern, &member.pattern) || self.pattern == member.pattern,
            "constituents of a composite must share its pattern"
        );
        if member.records.is_empty() {
            return;
        }
        self.size += member.records.len();
        self.members.push(member);
    }

    pub fn members(&self) -> &[LeafPatternDocSet] {
        &self.members
    }
}

impl PatternDocSet for CompositePatternDocSet {
    fn size(&self) -> usize {
        self.size
    }

    fn triple_pattern(&self) -> &Arc<TriplePattern> {
        &self.pattern
    }

    fn parent_binding(&self) -> Option<BindingId> {
        None
    }

    fn matches(&self) -> Box<dyn Iterator<Item = PatternMatch> + '_> {
        Box::new(self.members.iter().flat_map(|member| member.matches()))
    }

    fn into_matches(self: Box<Self>) -> Box<dyn Iterator<Item = PatternMatch>> {
        Box::new(
            self.members
                .into_iter()
                .flat_map(|member| Box::new(member).into_matches()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::binding::BindingArena;
    use oxrdf::{NamedNode, Variable};

    fn pattern() -> Arc<TriplePattern> {
        Arc::new(TriplePattern::new(
            Variable::new_unchecked("s"),
            NamedNode::new_unchecked("http://x/p"),
            Variable::new_unchecked("o"),
        ))
    }

    fn ids(docs: &[u32]) -> Vec<RecordId> {
        docs.iter().map(|doc| RecordId::new(0, *doc)).collect()
    }

    #[test]
    fn test_leaf_reports_pattern_parent_and_records() {
        let mut arena = BindingArena::new();
        let parent = arena.extend(None, Vec::new());
        let mut leaf = LeafPatternDocSet::new(pattern(), ids(&[1, 2]), Some(parent));
        leaf.insert(RecordId::new(0, 7));

        assert_eq!(leaf.size(), 3);
        assert_eq!(leaf.parent_binding(), Some(parent));
        assert_eq!(**leaf.triple_pattern(), *pattern());
        let matches: Vec<PatternMatch> = leaf.matches().collect();
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.parent == Some(parent)));
    }

    #[test]
    fn test_composite_walks_members_with_their_own_parents() {
        let mut arena = BindingArena::new();
        let first = arena.extend(None, Vec::new());
        let second = arena.extend(None, Vec::new());
        let shared = pattern();

        let mut composite = CompositePatternDocSet::new(Arc::clone(&shared));
        composite.union(LeafPatternDocSet::new(Arc::clone(&shared), ids(&[1, 2]), Some(first)));
        composite.union(LeafPatternDocSet::new(Arc::clone(&shared), Vec::new(), Some(first)));
        composite.union(LeafPatternDocSet::new(Arc::clone(&shared), ids(&[3]), Some(second)));

        assert_eq!(composite.size(), 3);
        assert_eq!(composite.members().len(), 2, "empty members are skipped");
        assert_eq!(composite.parent_binding(), None);

        let parents: Vec<Option<BindingId>> = composite.matches().map(|m| m.parent).collect();
        assert_eq!(parents, vec![Some(first), Some(first), Some(second)]);

        let owned: Vec<RecordId> = Box::new(composite).into_matches().map(|m| m.record).collect();
        assert_eq!(owned, ids(&[1, 2, 3]));
    }

    #[test]
    fn test_rebound_leaves_share_records() {
        let mut arena = BindingArena::new();
        let first = arena.extend(None, Vec::new());
        let second = arena.extend(None, Vec::new());
        let candidates = LeafPatternDocSet::new(pattern(), ids(&[1, 2, 3]), None);

        let mut composite = CompositePatternDocSet::new(Arc::clone(candidates.triple_pattern()));
        composite.union(candidates.with_parent(Some(first)));
        composite.union(candidates.with_parent(Some(second)));

        assert_eq!(composite.size(), 6);
        assert!(composite.members().iter().all(|member| member.shares_records(&candidates)));
        let parents: Vec<Option<BindingId>> = composite.matches().map(|m| m.parent).collect();
        assert_eq!(parents, [vec![Some(first); 3], vec![Some(second); 3]].concat());

        // inserting into one rebound leaf leaves the shared list untouched
        let mut detached = candidates.with_parent(Some(first));
        detached.insert(RecordId::new(0, 9));
        assert!(!detached.shares_records(&candidates));
        assert_eq!(candidates.size(), 3);
        assert_eq!(detached.records(), ids(&[1, 2, 3, 9]).as_slice());
    }

    #[test]
    fn test_leaf_union_builds_composite() {
        let shared = pattern();
        let composite = LeafPatternDocSet::new(Arc::clone(&shared), ids(&[1]), None)
            .union(LeafPatternDocSet::new(Arc::clone(&shared), ids(&[4, 5]), None));
        assert_eq!(composite.size(), 3);
        assert!(!composite.is_empty());
    }
}
