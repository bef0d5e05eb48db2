//! Error types for the codec, the index primitives and BGP evaluation

use thiserror::Error;

use crate::model::{Comparison, RecordId};

/// A stored or supplied term does not follow the N-Triples encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTermError {
    #[error("Unterminated literal: {0}")]
    UnterminatedLiteral(String),

    #[error("Dangling escape at the end of '{0}'")]
    DanglingEscape(String),

    #[error("Unknown escape sequence '\\{escape}' in '{value}'")]
    UnknownEscape { escape: char, value: String },

    #[error("Invalid unicode escape '{sequence}' in '{value}'")]
    BadUnicodeEscape { sequence: String, value: String },

    #[error("Invalid literal suffix '{suffix}' in '{value}'")]
    InvalidLiteralSuffix { suffix: String, value: String },

    #[error("Unrecognized term: '{0}'")]
    UnrecognizedTerm(String),

    #[error("Expected an IRI but found '{0}'")]
    ExpectedIri(String),

    #[error("Expected an IRI or a blank node but found '{0}'")]
    ExpectedSubject(String),
}

/// The index rejected or failed to execute a filter.
#[derive(Debug, Error)]
pub enum IndexQueryError {
    #[error("Index search failed: {0}")]
    Search(#[from] tantivy::TantivyError),

    #[error("Invalid {kind} value '{value}' in filter")]
    InvalidFilterValue { kind: &'static str, value: String },

    #[error("A {kind} value cannot be compared with '{comparison}'")]
    UnorderedValue {
        kind: &'static str,
        comparison: Comparison,
    },

    #[error("Record {record} has no stored '{field}' field")]
    MissingStoredField { record: RecordId, field: &'static str },
}

/// Failure while streaming records out of the index.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    MalformedTerm(#[from] MalformedTermError),

    #[error(transparent)]
    IndexQuery(#[from] IndexQueryError),
}

/// Failure while evaluating one pattern of a BGP.
#[derive(Debug, Error)]
#[error("Unable to resolve triple pattern '{pattern}': {source}")]
pub struct PatternResolutionFailure {
    pub pattern: String,
    #[source]
    pub source: QueryError,
}

impl PatternResolutionFailure {
    pub fn new(pattern: impl ToString, source: impl Into<QueryError>) -> Self {
        Self {
            pattern: pattern.to_string(),
            source: source.into(),
        }
    }
}

/// Errors surfaced by the triple store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Index error: {0}")]
    Index(#[from] tantivy::TantivyError),

    #[error("Unable to open index directory: {0}")]
    OpenDirectory(#[from] tantivy::directory::error::OpenDirectoryError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index is open in read-only mode")]
    ReadOnly,

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Resolution(#[from] PatternResolutionFailure),
}

impl From<IndexQueryError> for StoreError {
    fn from(error: IndexQueryError) -> Self {
        StoreError::Query(error.into())
    }
}

impl From<MalformedTermError> for StoreError {
    fn from(error: MalformedTermError) -> Self {
        StoreError::Query(error.into())
    }
}
