//! Term codec: RDF terms to and from their indexed N-Triples form.
//!
//! Every term stored in the index (subject, predicate, object, graph) is kept in
//! its N-Triples form so that a stored record decodes back to exactly the term
//! that was written. Typed projections of literal objects live in separate fields
//! managed by [`crate::injector`].

pub mod escape;
pub mod record;

use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Subject, Term, Triple};

use crate::engine::constants::UNNAMED_GRAPH;
use crate::error::MalformedTermError;

pub use escape::{escape, unescape};
pub use record::{IndexedRecord, StoredTriple, TypedObject};

pub fn encode_named_node(node: &NamedNode) -> String {
    format!("<{}>", escape(node.as_str()))
}

pub fn encode_blank_node(node: &BlankNode) -> String {
    format!("_:{}", node.as_str())
}

/// `"lexical"`, `"lexical"@lang` or `"lexical"^^<datatype>`
pub fn encode_literal(literal: &Literal) -> String {
    let lexical = escape(literal.value());
    if let Some(language) = literal.language() {
        format!("\"{lexical}\"@{language}")
    } else if literal.is_plain() {
        format!("\"{lexical}\"")
    } else {
        format!("\"{}\"^^<{}>", lexical, escape(literal.datatype().as_str()))
    }
}

pub fn encode_subject(subject: &Subject) -> String {
    match subject {
        Subject::NamedNode(node) => encode_named_node(node),
        Subject::BlankNode(node) => encode_blank_node(node),
    }
}

pub fn encode_term(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => encode_named_node(node),
        Term::BlankNode(node) => encode_blank_node(node),
        Term::Literal(literal) => encode_literal(literal),
    }
}

/// Graph field value; the default graph maps to a sentinel no term can collide with.
pub fn encode_graph(graph: &GraphName) -> String {
    match graph {
        GraphName::NamedNode(node) => encode_named_node(node),
        GraphName::BlankNode(node) => encode_blank_node(node),
        GraphName::DefaultGraph => UNNAMED_GRAPH.to_string(),
    }
}

pub fn decode_term(value: &str) -> Result<Term, MalformedTermError> {
    if value.starts_with('<') {
        decode_named_node(value).map(Term::from)
    } else if value.starts_with("_:") {
        decode_blank_node(value).map(Term::from)
    } else if value.starts_with('"') {
        decode_literal(value).map(Term::from)
    } else {
        Err(MalformedTermError::UnrecognizedTerm(value.to_string()))
    }
}

pub fn decode_named_node(value: &str) -> Result<NamedNode, MalformedTermError> {
    let iri = value
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| MalformedTermError::ExpectedIri(value.to_string()))?;
    Ok(NamedNode::new_unchecked(unescape(iri)?))
}

fn decode_blank_node(value: &str) -> Result<BlankNode, MalformedTermError> {
    match value.strip_prefix("_:") {
        Some(id) if !id.is_empty() => Ok(BlankNode::new_unchecked(id)),
        _ => Err(MalformedTermError::UnrecognizedTerm(value.to_string())),
    }
}

pub fn decode_subject(value: &str) -> Result<Subject, MalformedTermError> {
    match decode_term(value)? {
        Term::NamedNode(node) => Ok(node.into()),
        Term::BlankNode(node) => Ok(node.into()),
        _ => Err(MalformedTermError::ExpectedSubject(value.to_string())),
    }
}

pub fn decode_graph(value: &str) -> Result<GraphName, MalformedTermError> {
    if value == UNNAMED_GRAPH {
        return Ok(GraphName::DefaultGraph);
    }
    match decode_term(value)? {
        Term::NamedNode(node) => Ok(node.into()),
        Term::BlankNode(node) => Ok(node.into()),
        _ => Err(MalformedTermError::ExpectedSubject(value.to_string())),
    }
}

fn decode_literal(value: &str) -> Result<Literal, MalformedTermError> {
    let end = closing_quote(value)
        .ok_or_else(|| MalformedTermError::UnterminatedLiteral(value.to_string()))?;
    let lexical = unescape(&value[1..end])?.into_owned();
    let suffix = &value[end + 1..];

    if suffix.is_empty() {
        return Ok(Literal::new_simple_literal(lexical));
    }
    if let Some(language) = suffix.strip_prefix('@') {
        if !language.is_empty() {
            return Ok(Literal::new_language_tagged_literal_unchecked(
                lexical, language,
            ));
        }
    }
    if let Some(datatype) = suffix.strip_prefix("^^") {
        let datatype = decode_named_node(datatype)?;
        return Ok(Literal::new_typed_literal(lexical, datatype));
    }
    Err(MalformedTermError::InvalidLiteralSuffix {
        suffix: suffix.to_string(),
        value: value.to_string(),
    })
}

/// Byte offset of the quote closing the literal opened at offset 0.
fn closing_quote(value: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, c) in value.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(offset),
            _ => {}
        }
    }
    None
}

/// Rebuilds a triple from its stored subject, predicate and object fields.
pub fn decode_triple(stored: &StoredTriple) -> Result<Triple, MalformedTermError> {
    Ok(Triple::new(
        decode_subject(&stored.subject)?,
        decode_named_node(&stored.predicate)?,
        decode_term(&stored.object)?,
    ))
}

#[cfg(test)]
mod tests;
