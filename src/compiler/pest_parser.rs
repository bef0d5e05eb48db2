use oxrdf::vocab::{rdf, xsd};
use oxrdf::{GraphName, Literal, Quad, Term, Variable};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use crate::codec::{decode_graph, decode_named_node, decode_subject, decode_term};
use crate::error::MalformedTermError;
use crate::model::{PatternTerm, TriplePattern};

#[derive(Parser)]
#[grammar = "compiler/bgp.pest"]
pub struct BgpParser;

#[derive(Debug, Error)]
pub enum BgpParseError {
    #[error("Syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Invalid term: {0}")]
    Term(#[from] MalformedTermError),

    #[error("Parse error: empty parse result for '{0}'")]
    Empty(String),

    #[error("Expected a concrete term but found variable '{0}'")]
    UnexpectedVariable(String),
}

/// Parses `{ ?s <p> ?o . ?o <q> "x" }` into triple patterns.
///
/// Braces and the trailing dot are optional. Bare numbers become `xsd:integer`
/// or `xsd:decimal` literals, `true`/`false` become `xsd:boolean` and `a` is
/// `rdf:type`.
pub fn parse_bgp(input: &str) -> Result<Vec<TriplePattern>, BgpParseError> {
    let bgp = BgpParser::parse(Rule::bgp, input)
        .map_err(Box::new)?
        .next()
        .ok_or_else(|| BgpParseError::Empty(input.to_string()))?;

    let mut patterns = Vec::new();
    for pair in bgp.into_inner() {
        if pair.as_rule() != Rule::triple_pattern {
            continue;
        }
        let mut slots = pair.into_inner().map(pattern_term);
        let (Some(subject), Some(predicate), Some(object)) = (slots.next(), slots.next(), slots.next())
        else {
            return Err(BgpParseError::Empty(input.to_string()));
        };
        patterns.push(TriplePattern::new(subject?, predicate?, object?));
    }
    Ok(patterns)
}

/// Parses one concrete term written as in a BGP, such as `5` or `<http://ex/a>`.
pub fn parse_term(input: &str) -> Result<Term, BgpParseError> {
    let slot = BgpParser::parse(Rule::single_term, input)
        .map_err(Box::new)?
        .next()
        .and_then(|single| single.into_inner().next())
        .ok_or_else(|| BgpParseError::Empty(input.to_string()))?;
    match pattern_term(slot)? {
        PatternTerm::Term(term) => Ok(term),
        PatternTerm::Variable(variable) => Err(BgpParseError::UnexpectedVariable(variable.to_string())),
    }
}

/// Parses one N-Triples or N-Quads line.
///
/// `Ok(None)` for blank and comment-only lines. A line without a graph label
/// lands in the default graph.
pub fn parse_statement(line: &str) -> Result<Option<Quad>, BgpParseError> {
    let statement = BgpParser::parse(Rule::statement, line)
        .map_err(Box::new)?
        .next()
        .ok_or_else(|| BgpParseError::Empty(line.to_string()))?;

    let Some(quad) = statement.into_inner().find(|pair| pair.as_rule() == Rule::quad) else {
        return Ok(None);
    };
    let mut terms = quad.into_inner();
    let mut next_term = || {
        terms
            .next()
            .map(|pair| pair.as_str())
            .ok_or_else(|| BgpParseError::Empty(line.to_string()))
    };

    let subject = decode_subject(next_term()?)?;
    let predicate = decode_named_node(next_term()?)?;
    let object = decode_term(next_term()?)?;
    let graph = match terms.next() {
        Some(label) => decode_graph(label.as_str())?,
        None => GraphName::DefaultGraph,
    };
    Ok(Some(Quad::new(subject, predicate, object, graph)))
}

fn pattern_term(pair: Pair<Rule>) -> Result<PatternTerm, BgpParseError> {
    let text = pair.as_str();
    let term = match pair.as_rule() {
        // the sigil is a single byte
        Rule::variable => PatternTerm::Variable(Variable::new_unchecked(&text[1..])),
        Rule::number if text.contains('.') => Literal::new_typed_literal(text, xsd::DECIMAL).into(),
        Rule::number => Literal::new_typed_literal(text, xsd::INTEGER).into(),
        Rule::boolean => Literal::new_typed_literal(text, xsd::BOOLEAN).into(),
        Rule::rdf_type => PatternTerm::from(rdf::TYPE.into_owned()),
        _ => PatternTerm::Term(decode_term(text)?),
    };
    Ok(term)
}
