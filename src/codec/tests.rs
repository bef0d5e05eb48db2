use oxrdf::vocab::xsd;
use oxrdf::{BlankNode, GraphName, Literal, NamedNode, Term, Triple};

use super::*;
use crate::engine::constants::NULL_LANGUAGE;
use crate::injector::FieldInjectorRegistry;

fn iri(value: &str) -> NamedNode {
    NamedNode::new_unchecked(value)
}

fn supported_terms() -> Vec<Term> {
    let mut terms: Vec<Term> = vec![
        iri("http://example.org/a").into(),
        iri("http://example.org/with space\\and\"quote").into(),
        BlankNode::new_unchecked("b0").into(),
        Literal::new_simple_literal("plain").into(),
        Literal::new_simple_literal("").into(),
        Literal::new_simple_literal("line\nbreak \"quoted\" back\\slash\ttab \u{1}").into(),
        Literal::new_simple_literal("unicode caf\u{e9} \u{1F600}").into(),
        Literal::new_language_tagged_literal_unchecked("chat", "fr").into(),
        Literal::new_language_tagged_literal_unchecked("colour", "en-gb").into(),
        Literal::new_typed_literal("custom", iri("http://example.org/type")).into(),
    ];
    let typed = [
        ("true", xsd::BOOLEAN),
        ("5", xsd::INT),
        ("-12", xsd::INTEGER),
        ("3.14", xsd::DECIMAL),
        ("1.0E3", xsd::DOUBLE),
        ("9007199254740993", xsd::LONG),
        ("2020-02-29", xsd::DATE),
        ("2020-02-29T10:11:12Z", xsd::DATE_TIME),
    ];
    for (lexical, datatype) in typed {
        terms.push(Literal::new_typed_literal(lexical, datatype).into());
    }
    terms
}

#[test]
fn test_round_trip_supported_terms() {
    for term in supported_terms() {
        let encoded = encode_term(&term);
        let decoded = decode_term(&encoded).unwrap();
        assert_eq!(decoded, term, "round trip failed for {encoded}");
    }
}

#[test]
fn test_encoded_forms() {
    assert_eq!(encode_term(&iri("http://x/a").into()), "<http://x/a>");
    assert_eq!(
        encode_term(&BlankNode::new_unchecked("n1").into()),
        "_:n1"
    );
    assert_eq!(
        encode_term(&Literal::new_simple_literal("a\"b").into()),
        "\"a\\\"b\""
    );
    assert_eq!(
        encode_term(&Literal::new_language_tagged_literal_unchecked("hi", "en").into()),
        "\"hi\"@en"
    );
    assert_eq!(
        encode_term(&Literal::new_typed_literal("5", xsd::INT).into()),
        "\"5\"^^<http://www.w3.org/2001/XMLSchema#int>"
    );
    // xsd:string collapses to the simple form
    assert_eq!(
        encode_term(&Literal::new_typed_literal("s", xsd::STRING).into()),
        "\"s\""
    );
}

#[test]
fn test_literal_containing_quote_suffix_lookalike() {
    let literal: Term = Literal::new_simple_literal("x\"@en").into();
    let encoded = encode_term(&literal);
    assert_eq!(decode_term(&encoded).unwrap(), literal);
}

#[test]
fn test_malformed_terms() {
    assert!(matches!(
        decode_term("\"unterminated"),
        Err(MalformedTermError::UnterminatedLiteral(_))
    ));
    // the escape swallows the closing quote
    assert!(matches!(
        decode_term("\"dangling\\\""),
        Err(MalformedTermError::UnterminatedLiteral(_))
    ));
    assert!(matches!(
        decode_term("\"bad \\x escape\""),
        Err(MalformedTermError::UnknownEscape { escape: 'x', .. })
    ));
    assert!(matches!(
        decode_term("\"v\"#junk"),
        Err(MalformedTermError::InvalidLiteralSuffix { .. })
    ));
    assert!(matches!(
        decode_term("\"v\"@"),
        Err(MalformedTermError::InvalidLiteralSuffix { .. })
    ));
    assert!(matches!(
        decode_term("\"v\"^^http://no-brackets"),
        Err(MalformedTermError::ExpectedIri(_))
    ));
    assert!(matches!(
        decode_term("bare"),
        Err(MalformedTermError::UnrecognizedTerm(_))
    ));
    assert!(matches!(
        decode_term("_:"),
        Err(MalformedTermError::UnrecognizedTerm(_))
    ));
    assert!(matches!(
        decode_subject("\"literal subject\""),
        Err(MalformedTermError::ExpectedSubject(_))
    ));
    assert!(matches!(
        decode_named_node("_:b"),
        Err(MalformedTermError::ExpectedIri(_))
    ));
}

#[test]
fn test_graph_round_trip() {
    for graph in [
        GraphName::DefaultGraph,
        iri("http://example.org/g").into(),
        BlankNode::new_unchecked("g1").into(),
    ] {
        assert_eq!(decode_graph(&encode_graph(&graph)).unwrap(), graph);
    }
}

#[test]
fn test_decode_triple() {
    let stored = StoredTriple {
        subject: "_:s".to_string(),
        predicate: "<http://x/p>".to_string(),
        object: "\"5\"^^<http://www.w3.org/2001/XMLSchema#int>".to_string(),
    };
    let triple = decode_triple(&stored).unwrap();
    assert_eq!(
        triple,
        Triple::new(
            BlankNode::new_unchecked("s"),
            iri("http://x/p"),
            Literal::new_typed_literal("5", xsd::INT),
        )
    );
}

#[test]
fn test_record_projection() {
    let registry = FieldInjectorRegistry::new();
    let graph: GraphName = iri("http://x/g").into();

    let numeric = Triple::new(iri("http://x/a"), iri("http://x/p"), Literal::new_typed_literal("5", xsd::INT));
    let record = IndexedRecord::from_triple(&graph, &numeric, &registry);
    assert_eq!(record.graph, "<http://x/g>");
    assert_eq!(record.subject, "<http://x/a>");
    assert_eq!(record.typed_object, TypedObject::Numeric(5.0));
    assert_eq!(record.object_language.as_deref(), Some(NULL_LANGUAGE));
    assert_eq!(record.object_text, None);

    let tagged = Triple::new(
        iri("http://x/a"),
        iri("http://x/p"),
        Literal::new_language_tagged_literal_unchecked("hello", "en"),
    );
    let record = IndexedRecord::from_triple(&graph, &tagged, &registry);
    assert_eq!(record.typed_object, TypedObject::None);
    assert_eq!(record.object_language.as_deref(), Some("en"));
    assert_eq!(record.object_text.as_deref(), Some("hello"));

    let resource = Triple::new(iri("http://x/a"), iri("http://x/p"), iri("http://x/b"));
    let record = IndexedRecord::from_triple(&graph, &resource, &registry);
    assert_eq!(record.object_language, None);
    assert_eq!(record.object_text.as_deref(), Some("<http://x/b>"));
}

#[test]
fn test_record_id_is_stable_and_graph_scoped() {
    let registry = FieldInjectorRegistry::new();
    let triple = Triple::new(iri("http://x/a"), iri("http://x/p"), iri("http://x/b"));
    let first = IndexedRecord::from_triple(&GraphName::DefaultGraph, &triple, &registry);
    let again = IndexedRecord::from_triple(&GraphName::DefaultGraph, &triple, &registry);
    let other = IndexedRecord::from_triple(&iri("http://x/g").into(), &triple, &registry);
    assert_eq!(first.id, again.id);
    assert_ne!(first.id, other.id);
}
