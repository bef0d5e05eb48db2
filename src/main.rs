use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use oxrdf::{GraphName, NamedNode, Triple};
use serde_json::json;

use trindex::codec::{decode_graph, encode_graph, encode_named_node, encode_subject, encode_term};
use trindex::{
    load_config, load_into, parse_bgp, parse_term, Comparison, EngineConfig, QuadParser,
    TripleStore, TriplePattern, ValueConstraint,
};

#[derive(Parser, Debug)]
#[command(name = "trindex")]
#[command(about = "RDF triple store on a Tantivy index")]
#[command(version)]
struct Args {
    /// Path to the index directory
    #[arg(short, long, default_value = "./index")]
    index: PathBuf,

    /// Engine configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load N-Triples or N-Quads files, plain or gzipped
    Load {
        files: Vec<PathBuf>,

        /// Graph for statements without a graph label
        #[arg(short, long)]
        graph: Option<String>,
    },
    /// Print the triples matching one pattern, e.g. "?s <http://ex/p> ?o"
    Find {
        pattern: String,

        #[arg(short, long)]
        graph: Option<String>,
    },
    /// Evaluate a basic graph pattern and print one JSON object per row
    Query {
        bgp: String,

        #[arg(short, long)]
        graph: Option<String>,

        /// Value constraint such as "o=5" or "age>=18" (repeatable)
        #[arg(short = 'w', long = "where")]
        constraints: Vec<String>,
    },
    /// List the named graphs holding at least one triple
    Graphs,
    /// Count the triples of a graph, optionally matching one pattern
    Count {
        pattern: Option<String>,

        #[arg(short, long)]
        graph: Option<String>,
    },
    /// Remove every triple of a graph, or of the whole store
    Clear {
        #[arg(short, long)]
        graph: Option<String>,

        #[arg(long, conflicts_with = "graph")]
        all: bool,
    },
    /// Print record and graph counts as JSON
    Stats,
}

fn parse_graph(graph: Option<&str>) -> Result<GraphName> {
    match graph {
        None => Ok(GraphName::DefaultGraph),
        Some(value) if value.starts_with('<') || value.starts_with("_:") => {
            decode_graph(value).with_context(|| format!("Invalid graph '{}'", value))
        }
        Some(value) => Ok(NamedNode::new(value)
            .with_context(|| format!("Invalid graph IRI '{}'", value))?
            .into()),
    }
}

fn parse_pattern(text: &str) -> Result<TriplePattern> {
    let mut patterns = parse_bgp(text).with_context(|| format!("Invalid pattern '{}'", text))?;
    if patterns.len() != 1 {
        return Err(anyhow!("Expected exactly one triple pattern, found {}", patterns.len()));
    }
    patterns.pop().ok_or_else(|| anyhow!("Empty pattern"))
}

fn parse_constraint(text: &str) -> Result<ValueConstraint> {
    let (name, comparison, value) = Comparison::split(text).ok_or_else(|| {
        anyhow!("Constraint '{}' is not of the form name=value, name<value, name>=value ...", text)
    })?;
    let name = name.trim().trim_start_matches(['?', '$']);
    let variable = oxrdf::Variable::new(name).with_context(|| format!("Invalid variable '{}'", name))?;
    let value = parse_term(value).with_context(|| format!("Invalid constraint value '{}'", value))?;
    Ok(ValueConstraint::compare(variable, comparison, value))
}

fn ntriples(triple: &Triple) -> String {
    format!(
        "{} {} {} .",
        encode_subject(&triple.subject),
        encode_named_node(&triple.predicate),
        encode_term(&triple.object)
    )
}

fn load(store: &mut TripleStore, files: &[PathBuf], graph: GraphName) -> Result<()> {
    let parser = QuadParser::new().with_default_graph(graph);
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} statements {msg}")?,
    );

    for file in files {
        pb.set_message(file.display().to_string());
        let summary = load_into(store, file, &parser, |n| pb.set_position(n as u64))
            .with_context(|| format!("Failed to load {}", file.display()))?;
        pb.println(format!(
            "{}: {} statements, {} records in store",
            file.display(),
            summary.statements,
            summary.records
        ));
    }
    pb.finish_with_message("done");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let mut store = TripleStore::open(&args.index, config)
        .with_context(|| format!("Failed to open index at {}", args.index.display()))?;

    match args.command {
        Command::Load { files, graph } => {
            let graph = parse_graph(graph.as_deref())?;
            load(&mut store, &files, graph)?;
        }
        Command::Find { pattern, graph } => {
            let graph = parse_graph(graph.as_deref())?;
            let pattern = parse_pattern(&pattern)?;
            for triple in store.find(&graph, &pattern)?.triples() {
                println!("{}", ntriples(&triple?));
            }
        }
        Command::Query { bgp, graph, constraints } => {
            let graph = parse_graph(graph.as_deref())?;
            let patterns = parse_bgp(&bgp).with_context(|| format!("Invalid BGP '{}'", bgp))?;
            let constraints = constraints
                .iter()
                .map(|text| parse_constraint(text))
                .collect::<Result<Vec<_>>>()?;
            let mut solutions = store.query_constrained(&graph, &patterns, &constraints)?;
            for binding in solutions.by_ref() {
                println!("{}", binding?.to_json());
            }
            log::info!("{:?}", solutions.stats());
        }
        Command::Graphs => {
            for graph in store.graph_names()? {
                println!("{}", encode_graph(&graph));
            }
        }
        Command::Count { pattern, graph } => {
            let graph = parse_graph(graph.as_deref())?;
            let count = match pattern {
                Some(pattern) => store.count(&graph, &parse_pattern(&pattern)?)?,
                None => store.size(&graph)?,
            };
            println!("{}", count);
        }
        Command::Clear { graph, all } => {
            if all {
                store.clear_all()?;
            } else {
                store.clear(&parse_graph(graph.as_deref())?)?;
            }
            store.commit()?;
        }
        Command::Stats => {
            let mut graphs = serde_json::Map::new();
            for graph in store.graph_names()? {
                graphs.insert(encode_graph(&graph), json!(store.size(&graph)?));
            }
            let stats = json!({
                "records": store.num_records(),
                "default_graph": store.size(&GraphName::DefaultGraph)?,
                "graphs": graphs,
                "read_only": store.is_read_only(),
                "operations": store.stats(),
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
    }
    Ok(())
}
