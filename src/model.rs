//! Triple patterns, positions and record references shared across the crate

use std::fmt;

use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple, Variable};
use tantivy::DocAddress;

use crate::codec::encode_term;

/// Reference to one indexed record inside a searcher snapshot.
///
/// Ordered by segment ordinal then segment-local doc id, which is the index order
/// used for cursor paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId {
    pub segment: u32,
    pub doc: u32,
}

impl RecordId {
    pub fn new(segment: u32, doc: u32) -> Self {
        Self { segment, doc }
    }
}

impl From<DocAddress> for RecordId {
    fn from(address: DocAddress) -> Self {
        Self::new(address.segment_ord, address.doc_id)
    }
}

impl From<RecordId> for DocAddress {
    fn from(id: RecordId) -> Self {
        DocAddress::new(id.segment, id.doc)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.segment, self.doc)
    }
}

/// Slot of a triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Subject,
    Predicate,
    Object,
}

/// One slot of a triple pattern: a concrete term or a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternTerm {
    Term(Term),
    Variable(Variable),
}

impl PatternTerm {
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            PatternTerm::Variable(variable) => Some(variable),
            PatternTerm::Term(_) => None,
        }
    }
}

impl fmt::Display for PatternTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternTerm::Term(term) => f.write_str(&encode_term(term)),
            PatternTerm::Variable(variable) => write!(f, "{variable}"),
        }
    }
}

impl From<Variable> for PatternTerm {
    fn from(variable: Variable) -> Self {
        PatternTerm::Variable(variable)
    }
}

impl From<Term> for PatternTerm {
    fn from(term: Term) -> Self {
        PatternTerm::Term(term)
    }
}

impl From<NamedNode> for PatternTerm {
    fn from(node: NamedNode) -> Self {
        PatternTerm::Term(node.into())
    }
}

impl From<BlankNode> for PatternTerm {
    fn from(node: BlankNode) -> Self {
        PatternTerm::Term(node.into())
    }
}

impl From<Literal> for PatternTerm {
    fn from(literal: Literal) -> Self {
        PatternTerm::Term(literal.into())
    }
}

impl From<Subject> for PatternTerm {
    fn from(subject: Subject) -> Self {
        PatternTerm::Term(subject.into())
    }
}

/// A triple whose slots may be variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: PatternTerm,
    pub predicate: PatternTerm,
    pub object: PatternTerm,
}

impl TriplePattern {
    pub fn new(
        subject: impl Into<PatternTerm>,
        predicate: impl Into<PatternTerm>,
        object: impl Into<PatternTerm>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// Slots in subject, predicate, object order.
    pub fn positions(&self) -> [(Position, &PatternTerm); 3] {
        [
            (Position::Subject, &self.subject),
            (Position::Predicate, &self.predicate),
            (Position::Object, &self.object),
        ]
    }

    /// Distinct variables in first-occurrence order.
    pub fn variables(&self) -> Vec<&Variable> {
        let mut variables: Vec<&Variable> = Vec::new();
        for (_, slot) in self.positions() {
            if let Some(variable) = slot.as_variable() {
                if !variables.contains(&variable) {
                    variables.push(variable);
                }
            }
        }
        variables
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

impl From<Triple> for TriplePattern {
    fn from(triple: Triple) -> Self {
        Self::new(triple.subject, triple.predicate, triple.object)
    }
}

/// Term found at `position` of a decoded triple.
pub fn term_at(triple: &Triple, position: Position) -> Term {
    match position {
        Position::Subject => triple.subject.clone().into(),
        Position::Predicate => triple.predicate.clone().into(),
        Position::Object => triple.object.clone(),
    }
}

/// Relation a constrained variable must have to its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Comparison {
    #[default]
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Comparison {
    /// Operators longest first, so `<=` is tried before `<`.
    const SYMBOLS: [(&'static str, Comparison); 5] = [
        ("<=", Comparison::LessOrEqual),
        (">=", Comparison::GreaterOrEqual),
        ("<", Comparison::Less),
        (">", Comparison::Greater),
        ("=", Comparison::Equal),
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Equal => "=",
            Comparison::Less => "<",
            Comparison::LessOrEqual => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterOrEqual => ">=",
        }
    }

    /// Splits `name<op>value` at the first operator, e.g. `x>=26`.
    pub fn split(text: &str) -> Option<(&str, Comparison, &str)> {
        let start = text.find(['<', '>', '='])?;
        let rest = &text[start..];
        Self::SYMBOLS
            .iter()
            .find(|(symbol, _)| rest.starts_with(symbol))
            .map(|(symbol, comparison)| (&text[..start], *comparison, &rest[symbol.len()..]))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Requires the value of `variable` to compare with `value`, without binding it.
///
/// Pushed into every index query for a pattern slot holding the variable.
/// Ordering comparisons only hold for numeric and date literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueConstraint {
    pub variable: Variable,
    pub comparison: Comparison,
    pub value: Term,
}

impl ValueConstraint {
    pub fn new(variable: Variable, value: impl Into<Term>) -> Self {
        Self::compare(variable, Comparison::Equal, value)
    }

    pub fn compare(variable: Variable, comparison: Comparison, value: impl Into<Term>) -> Self {
        Self {
            variable,
            comparison,
            value: value.into(),
        }
    }
}

impl fmt::Display for ValueConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.comparison, encode_term(&self.value))
    }
}
