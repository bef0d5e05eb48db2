//! Text syntax for basic graph patterns and N-Triples / N-Quads statements

pub mod pest_parser;

pub use pest_parser::{parse_bgp, parse_statement, parse_term, BgpParseError, BgpParser, Rule};
