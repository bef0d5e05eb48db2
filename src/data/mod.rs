pub mod parser;

pub use parser::{load_into, LoadSummary, QuadParser};

#[cfg(test)]
mod tests;
