use clap::Parser;
use std::path::PathBuf;

use catalog_rag::DEFAULT_SIMILARITY_TOP_K;

use crate::ingest::IngestOptions;
use crate::query::{QueryMode, QueryOptions};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_PERSIST_DIR: &str = "vector_store";

const QUERY_EXAMPLES: &str = "\
Examples:
  query --query \"Which phones have good battery life?\"
  query --query \"What are the cheapest smartphones under 20000?\"
  query --interactive";

#[derive(Parser, Debug)]
#[command(
    name = "ingest",
    about = "Ingest product data and build the vector index for catalog Q&A"
)]
pub struct IngestArgs {
    /// Directory containing CSV data
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Directory to save the vector index
    #[arg(long, default_value = DEFAULT_PERSIST_DIR)]
    pub persist_dir: PathBuf,

    /// Rebuild the index even if it already exists
    #[arg(long)]
    pub force: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl IngestArgs {
    pub fn options(&self) -> IngestOptions {
        IngestOptions {
            data_dir: self.data_dir.clone(),
            persist_dir: self.persist_dir.clone(),
            force: self.force,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "query",
    about = "Ask natural language questions about the product catalog",
    after_help = QUERY_EXAMPLES
)]
pub struct QueryArgs {
    /// Natural language question to ask
    #[arg(long, short = 'q')]
    pub query: Option<String>,

    /// Directory containing the vector index
    #[arg(long, default_value = DEFAULT_PERSIST_DIR)]
    pub persist_dir: PathBuf,

    /// Number of similar documents to retrieve
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_TOP_K, value_parser = parse_top_k)]
    pub similarity_top_k: usize,

    /// Show source documents and scores
    #[arg(long)]
    pub show_sources: bool,

    /// Ask several questions in one session
    #[arg(long, short = 'i')]
    pub interactive: bool,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl QueryArgs {
    /// `None` when neither `--query` nor `--interactive` was given.
    /// `--interactive` wins when both are.
    pub fn mode(&self) -> Option<QueryMode> {
        if self.interactive {
            Some(QueryMode::Interactive)
        } else {
            self.query.clone().map(QueryMode::Single)
        }
    }

    pub fn options(&self) -> Option<QueryOptions> {
        Some(QueryOptions {
            mode: self.mode()?,
            persist_dir: self.persist_dir.clone(),
            similarity_top_k: self.similarity_top_k,
            show_sources: self.show_sources,
            verbose: self.verbose,
        })
    }
}

fn parse_top_k(s: &str) -> Result<usize, String> {
    let k: usize = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if k == 0 {
        return Err("must be at least 1".into());
    }
    Ok(k)
}
