use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use oxrdf::{GraphName, Literal, NamedNode};
use tempfile::TempDir;

use super::*;
use crate::engine::{EngineConfig, TripleStore};

const SAMPLE: &str = "\
# people
<http://ex/alice> <http://ex/knows> <http://ex/bob> .
<http://ex/alice> <http://ex/name> \"Alice\"@en .

_:b1 <http://ex/age> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> <http://ex/g1> .
";

fn gzip(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn test_parse_str_skips_comments_and_blank_lines() {
    let quads = QuadParser::new().parse_str(SAMPLE).unwrap();
    assert_eq!(quads.len(), 3);
    assert_eq!(quads[0].graph_name, GraphName::DefaultGraph);
    assert_eq!(quads[1].object, Literal::new_language_tagged_literal_unchecked("Alice", "en").into());
    assert_eq!(quads[2].graph_name, NamedNode::new_unchecked("http://ex/g1").into());
}

#[test]
fn test_default_graph_only_fills_unlabelled_statements() {
    let graph: GraphName = NamedNode::new_unchecked("http://ex/default").into();
    let quads = QuadParser::new()
        .with_default_graph(graph.clone())
        .parse_str(SAMPLE)
        .unwrap();
    assert_eq!(quads[0].graph_name, graph);
    assert_eq!(quads[2].graph_name, NamedNode::new_unchecked("http://ex/g1").into());
}

#[test]
fn test_invalid_line_reports_line_number() {
    let err = QuadParser::new()
        .parse_str("<http://ex/s> <http://ex/p> <http://ex/o> .\n<http://ex/s> <http://ex/p> .\n")
        .unwrap_err();
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn test_parse_gzipped_bytes() {
    let quads = QuadParser::new().parse_gzipped(&gzip(SAMPLE)).unwrap();
    assert_eq!(quads.len(), 3);
}

#[test]
fn test_parse_file_detects_gzip() {
    let dir = TempDir::new().unwrap();
    let plain = dir.path().join("data.nq");
    let packed = dir.path().join("data.nq.gz");
    std::fs::write(&plain, SAMPLE).unwrap();
    std::fs::write(&packed, gzip(SAMPLE)).unwrap();

    let parser = QuadParser::new();
    assert_eq!(parser.parse_file(&plain).unwrap(), parser.parse_file(&packed).unwrap());
}

#[test]
fn test_load_into_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.nq.gz");
    std::fs::write(&path, gzip(SAMPLE)).unwrap();

    let mut store = TripleStore::in_memory(EngineConfig::default()).unwrap();
    let mut seen = Vec::new();
    let summary = load_into(&mut store, &path, &QuadParser::new(), |n| seen.push(n)).unwrap();

    assert_eq!(summary, LoadSummary { statements: 3, records: 3 });
    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(store.size(&GraphName::DefaultGraph).unwrap(), 2);
    assert_eq!(store.size(&NamedNode::new_unchecked("http://ex/g1").into()).unwrap(), 1);
}

#[test]
fn test_load_missing_file() {
    let mut store = TripleStore::in_memory(EngineConfig::default()).unwrap();
    let result = load_into(&mut store, "/nonexistent/data.nt", &QuadParser::new(), |_| {});
    assert!(result.is_err());
}
