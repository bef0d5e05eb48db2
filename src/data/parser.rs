use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use oxrdf::{GraphName, Quad};

use crate::compiler::parse_statement;
use crate::engine::TripleStore;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Parser for N-Triples and N-Quads input, plain or gzipped
pub struct QuadParser {
    default_graph: GraphName,
}

impl Default for QuadParser {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadParser {
    pub fn new() -> Self {
        Self {
            default_graph: GraphName::DefaultGraph,
        }
    }

    /// Graph assigned to statements that carry no graph label
    pub fn with_default_graph(mut self, graph: GraphName) -> Self {
        self.default_graph = graph;
        self
    }

    /// Open a file for reading, decompressing it when it starts with the gzip magic bytes
    pub fn open<P: AsRef<Path>>(&self, file_path: P) -> Result<Box<dyn BufRead>> {
        let path = file_path.as_ref();
        let file = File::open(path).with_context(|| format!("Unable to open {}", path.display()))?;
        let mut reader = BufReader::new(file);
        let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        if gzipped {
            log::debug!("Reading {} as gzip", path.display());
            Ok(Box::new(BufReader::new(GzDecoder::new(reader))))
        } else {
            Ok(Box::new(reader))
        }
    }

    /// Parse every statement of a file (regular or gzipped)
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<Vec<Quad>> {
        self.quads(self.open(file_path)?).collect()
    }

    pub fn parse_str(&self, content: &str) -> Result<Vec<Quad>> {
        self.quads(content.as_bytes()).collect()
    }

    /// Parse a gzipped document held in memory
    pub fn parse_gzipped(&self, gzipped_data: &[u8]) -> Result<Vec<Quad>> {
        let mut content = String::new();
        GzDecoder::new(gzipped_data).read_to_string(&mut content)?;
        self.parse_str(&content)
    }

    /// Lazily parse statements line by line, skipping blank and comment lines
    pub fn quads<'a, R: BufRead + 'a>(&'a self, reader: R) -> impl Iterator<Item = Result<Quad>> + 'a {
        reader.lines().enumerate().filter_map(move |(index, line)| {
            let line_number = index + 1;
            let parsed = line
                .with_context(|| format!("Unable to read line {line_number}"))
                .and_then(|line| {
                    parse_statement(&line).with_context(|| format!("Invalid statement on line {line_number}"))
                });
            match parsed {
                Ok(Some(quad)) => Some(Ok(self.assign_graph(quad))),
                Ok(None) => None,
                Err(e) => Some(Err(e)),
            }
        })
    }

    fn assign_graph(&self, mut quad: Quad) -> Quad {
        if quad.graph_name.is_default_graph() {
            quad.graph_name = self.default_graph.clone();
        }
        quad
    }
}

/// Outcome of one bulk load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct LoadSummary {
    pub statements: usize,
    pub records: u64,
}

/// Add every statement of `file_path` to `store` and commit.
///
/// `progress` receives the number of statements written so far. The first
/// invalid line aborts the load without committing.
pub fn load_into<P: AsRef<Path>>(
    store: &mut TripleStore,
    file_path: P,
    parser: &QuadParser,
    mut progress: impl FnMut(usize),
) -> Result<LoadSummary> {
    let path = file_path.as_ref();
    let mut statements = 0;
    for quad in parser.quads(parser.open(path)?) {
        store.add_quad(&quad?)?;
        statements += 1;
        progress(statements);
    }
    store.commit()?;
    log::info!("Loaded {} statements from {}", statements, path.display());
    Ok(LoadSummary {
        statements,
        records: store.num_records(),
    })
}
