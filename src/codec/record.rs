//! Physical projection of a triple onto the index fields

use oxrdf::{GraphName, Term, Triple};
use uuid::Uuid;

use super::{encode_graph, encode_named_node, encode_subject, encode_term};
use crate::engine::constants::NULL_LANGUAGE;
use crate::injector::FieldInjectorRegistry;

/// Typed projection of a literal object. At most one per record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedObject {
    None,
    Boolean(bool),
    Numeric(f64),
    /// Epoch milliseconds
    Date(i64),
}

/// Field values of one record, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub id: String,
    pub graph: String,
    pub subject: String,
    pub predicate: String,
    pub object: String,
    pub object_language: Option<String>,
    pub typed_object: TypedObject,
    pub object_text: Option<String>,
}

impl IndexedRecord {
    /// Projects `triple` as stored in `graph`.
    pub fn from_triple(
        graph: &GraphName,
        triple: &Triple,
        registry: &FieldInjectorRegistry,
    ) -> Self {
        let graph = encode_graph(graph);
        let subject = encode_subject(&triple.subject);
        let predicate = encode_named_node(&triple.predicate);
        let object = encode_term(&triple.object);

        let mut record = Self {
            id: record_id(&graph, &subject, &predicate, &object),
            graph,
            subject,
            predicate,
            object,
            object_language: None,
            typed_object: TypedObject::None,
            object_text: None,
        };

        match &triple.object {
            Term::Literal(literal) => {
                record.object_language =
                    Some(literal.language().unwrap_or(NULL_LANGUAGE).to_string());
                registry
                    .injector_for(Some(literal.datatype()))
                    .write(&mut record, literal.value());
            }
            _ => record.object_text = Some(record.object.clone()),
        }
        record
    }
}

/// Name-based UUID over the encoded quad, so the same triple in the same graph
/// always lands on the same record.
pub fn record_id(graph: &str, subject: &str, predicate: &str, object: &str) -> String {
    let name = format!("{subject} {predicate} {object} {graph}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

/// Stored fields read back for decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTriple {
    pub subject: String,
    pub predicate: String,
    pub object: String,
}
