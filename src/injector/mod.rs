//! Datatype-driven field injection.
//!
//! A literal object is written to, and queried through, the typed field that
//! matches its datatype: booleans to `o_b`, the numeric XSD types to `o_n`,
//! dates to `o_d`, anything else to the catch-all `o_s`. The same dispatch builds
//! the equality and range predicates used for concrete pattern slots and value
//! constraints, so a value is always looked up where it was written.
//!
//! Join conditions do not go through the injectors: a variable bound by an
//! earlier pattern is matched on the exact stored N-Triples term.

mod date;

use std::collections::HashMap;
use std::ops::Bound;
use std::sync::RwLock;

use oxrdf::vocab::xsd;
use oxrdf::{GraphName, NamedNodeRef, Term, Variable};

use crate::codec::{encode_graph, encode_term, IndexedRecord, TypedObject};
use crate::engine::constants::{IndexField, NULL_LANGUAGE};
use crate::error::IndexQueryError;
use crate::model::{Comparison, PatternTerm, Position, TriplePattern, ValueConstraint};

pub use date::parse_date_millis;

/// Condition on one index field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Text { field: IndexField, value: String },
    Boolean(bool),
    Numeric(f64),
    /// Epoch milliseconds
    Date(i64),
    NumericRange { lower: Bound<f64>, upper: Bound<f64> },
    DateRange { lower: Bound<i64>, upper: Bound<i64> },
}

impl Predicate {
    pub fn text(field: IndexField, value: impl Into<String>) -> Self {
        Predicate::Text {
            field,
            value: value.into(),
        }
    }

    pub fn field(&self) -> IndexField {
        match self {
            Predicate::Text { field, .. } => *field,
            Predicate::Boolean(_) => IndexField::ObjectBoolean,
            Predicate::Numeric(_) | Predicate::NumericRange { .. } => IndexField::ObjectNumeric,
            Predicate::Date(_) | Predicate::DateRange { .. } => IndexField::ObjectDate,
        }
    }
}

/// Bounds selecting the values that stand in `comparison` to `value`.
fn comparison_bounds<T: Copy>(comparison: Comparison, value: T) -> (Bound<T>, Bound<T>) {
    match comparison {
        Comparison::Equal => (Bound::Included(value), Bound::Included(value)),
        Comparison::Less => (Bound::Unbounded, Bound::Excluded(value)),
        Comparison::LessOrEqual => (Bound::Unbounded, Bound::Included(value)),
        Comparison::Greater => (Bound::Excluded(value), Bound::Unbounded),
        Comparison::GreaterOrEqual => (Bound::Included(value), Bound::Unbounded),
    }
}

/// Typed field family a literal datatype maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Boolean,
    Numeric,
    Date,
    Text,
}

const DATATYPE_KINDS: [(NamedNodeRef<'static>, LiteralKind); 8] = [
    (xsd::BOOLEAN, LiteralKind::Boolean),
    (xsd::INT, LiteralKind::Numeric),
    (xsd::INTEGER, LiteralKind::Numeric),
    (xsd::DECIMAL, LiteralKind::Numeric),
    (xsd::DOUBLE, LiteralKind::Numeric),
    (xsd::LONG, LiteralKind::Numeric),
    (xsd::DATE, LiteralKind::Date),
    (xsd::DATE_TIME, LiteralKind::Date),
];

impl LiteralKind {
    /// Exact datatype IRI match; everything unlisted is text.
    pub fn from_datatype(datatype: Option<NamedNodeRef<'_>>) -> Self {
        datatype
            .and_then(|datatype| {
                DATATYPE_KINDS
                    .iter()
                    .find(|(known, _)| known.as_str() == datatype.as_str())
                    .map(|(_, kind)| *kind)
            })
            .unwrap_or(LiteralKind::Text)
    }

    fn name(self) -> &'static str {
        match self {
            LiteralKind::Boolean => "boolean",
            LiteralKind::Numeric => "numeric",
            LiteralKind::Date => "date",
            LiteralKind::Text => "text",
        }
    }
}

/// Writes and queries one literal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Injector {
    kind: LiteralKind,
}

impl Injector {
    pub fn kind(&self) -> LiteralKind {
        self.kind
    }

    /// Sets the typed field for `lexical` on a record under construction.
    ///
    /// A lexical form the kind cannot parse is kept as text.
    pub fn write(&self, record: &mut IndexedRecord, lexical: &str) {
        match self.typed_value(lexical) {
            Some(typed) => record.typed_object = typed,
            None => {
                if self.kind != LiteralKind::Text {
                    log::warn!(
                        "Unparsable {} literal '{}', indexing it as text",
                        self.kind.name(),
                        lexical
                    );
                }
                record.object_text = Some(lexical.to_string());
            }
        }
    }

    /// Predicate selecting records whose typed field equals `lexical`.
    pub fn equality_predicate(&self, lexical: &str) -> Result<Predicate, IndexQueryError> {
        match (self.kind, self.typed_value(lexical)) {
            (LiteralKind::Text, _) => Ok(Predicate::text(IndexField::ObjectText, lexical)),
            (_, Some(TypedObject::Boolean(value))) => Ok(Predicate::Boolean(value)),
            (_, Some(TypedObject::Numeric(value))) => Ok(Predicate::Numeric(value)),
            (_, Some(TypedObject::Date(value))) => Ok(Predicate::Date(value)),
            _ => Err(IndexQueryError::InvalidFilterValue {
                kind: self.kind.name(),
                value: lexical.to_string(),
            }),
        }
    }

    /// Predicate selecting records whose typed field stands in `comparison` to
    /// `lexical`. Only numbers and dates are ordered.
    pub fn comparison_predicate(
        &self,
        comparison: Comparison,
        lexical: &str,
    ) -> Result<Predicate, IndexQueryError> {
        if comparison == Comparison::Equal {
            return self.equality_predicate(lexical);
        }
        match (self.kind, self.typed_value(lexical)) {
            (_, Some(TypedObject::Numeric(value))) => {
                let (lower, upper) = comparison_bounds(comparison, value);
                Ok(Predicate::NumericRange { lower, upper })
            }
            (_, Some(TypedObject::Date(millis))) => {
                let (lower, upper) = comparison_bounds(comparison, millis);
                Ok(Predicate::DateRange { lower, upper })
            }
            (LiteralKind::Numeric | LiteralKind::Date, _) => Err(IndexQueryError::InvalidFilterValue {
                kind: self.kind.name(),
                value: lexical.to_string(),
            }),
            _ => Err(IndexQueryError::UnorderedValue {
                kind: self.kind.name(),
                comparison,
            }),
        }
    }

    fn typed_value(&self, lexical: &str) -> Option<TypedObject> {
        match self.kind {
            LiteralKind::Boolean => parse_boolean(lexical).map(TypedObject::Boolean),
            LiteralKind::Numeric => parse_numeric(lexical).map(TypedObject::Numeric),
            LiteralKind::Date => parse_date_millis(lexical).map(TypedObject::Date),
            LiteralKind::Text => None,
        }
    }
}

fn parse_boolean(lexical: &str) -> Option<bool> {
    match lexical.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_numeric(lexical: &str) -> Option<f64> {
    let value: f64 = lexical.trim().parse().ok()?;
    // -0 and 0 must share one index term
    Some(if value == 0.0 { 0.0 } else { value })
}

/// Datatype dispatch plus the per-language predicate cache.
#[derive(Debug, Default)]
pub struct FieldInjectorRegistry {
    language_predicates: RwLock<HashMap<String, Predicate>>,
}

impl FieldInjectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Never fails: unknown or absent datatypes get the text injector.
    pub fn injector_for(&self, datatype: Option<NamedNodeRef<'_>>) -> Injector {
        Injector {
            kind: LiteralKind::from_datatype(datatype),
        }
    }

    /// Predicate on `o_lang`, cached per tag.
    pub fn language_predicate(&self, language: Option<&str>) -> Predicate {
        let key = language.filter(|tag| !tag.is_empty()).unwrap_or(NULL_LANGUAGE);
        if let Ok(cache) = self.language_predicates.read() {
            if let Some(predicate) = cache.get(key) {
                return predicate.clone();
            }
        }
        let predicate = Predicate::text(IndexField::ObjectLanguage, key);
        if let Ok(mut cache) = self.language_predicates.write() {
            cache
                .entry(key.to_string())
                .or_insert_with(|| predicate.clone());
        }
        predicate
    }

    pub fn cached_languages(&self) -> usize {
        self.language_predicates
            .read()
            .map(|cache| cache.len())
            .unwrap_or(0)
    }

    /// Predicates matching records whose object equals `term`.
    pub fn object_predicates(&self, term: &Term) -> Result<Vec<Predicate>, IndexQueryError> {
        match term {
            Term::Literal(literal) => Ok(vec![
                self.language_predicate(literal.language()),
                self.injector_for(Some(literal.datatype()))
                    .equality_predicate(literal.value())?,
            ]),
            _ => Ok(vec![Predicate::text(IndexField::Object, encode_term(term))]),
        }
    }

    /// Predicates matching records holding `term` at `position`.
    pub fn position_predicates(
        &self,
        position: Position,
        term: &Term,
    ) -> Result<Vec<Predicate>, IndexQueryError> {
        match position {
            Position::Object => self.object_predicates(term),
            _ => Ok(vec![Self::term_predicate(position, term)]),
        }
    }

    /// Exact match on the stored N-Triples form of `term` at `position`.
    pub fn term_predicate(position: Position, term: &Term) -> Predicate {
        let field = match position {
            Position::Subject => IndexField::Subject,
            Position::Predicate => IndexField::Predicate,
            Position::Object => IndexField::Object,
        };
        Predicate::text(field, encode_term(term))
    }

    /// Predicates enforcing `constraint` on a variable found at `position`.
    pub fn constraint_predicates(
        &self,
        position: Position,
        constraint: &ValueConstraint,
    ) -> Result<Vec<Predicate>, IndexQueryError> {
        match (constraint.comparison, position, &constraint.value) {
            (Comparison::Equal, _, value) => self.position_predicates(position, value),
            (comparison, Position::Object, Term::Literal(literal)) => Ok(vec![self
                .injector_for(Some(literal.datatype()))
                .comparison_predicate(comparison, literal.value())?]),
            (comparison, _, _) => Err(IndexQueryError::UnorderedValue {
                kind: "resource",
                comparison,
            }),
        }
    }

    pub fn graph_predicate(&self, graph: &GraphName) -> Predicate {
        Predicate::text(IndexField::Graph, encode_graph(graph))
    }

    /// Graph predicate, plus value predicates for every concrete slot of
    /// `pattern` and exact term predicates for every variable slot `lookup`
    /// resolves to a term.
    pub fn pattern_predicates(
        &self,
        graph: &GraphName,
        pattern: &TriplePattern,
        mut lookup: impl FnMut(&Variable) -> Option<Term>,
    ) -> Result<Vec<Predicate>, IndexQueryError> {
        let mut predicates = vec![self.graph_predicate(graph)];
        for (position, slot) in pattern.positions() {
            match slot {
                PatternTerm::Term(term) => {
                    predicates.extend(self.position_predicates(position, term)?)
                }
                PatternTerm::Variable(variable) => {
                    if let Some(term) = lookup(variable) {
                        predicates.push(Self::term_predicate(position, &term));
                    }
                }
            }
        }
        Ok(predicates)
    }
}
