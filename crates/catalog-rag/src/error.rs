use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum RagError {
    #[error("OpenAI API key not found")]
    MissingApiKey,
    #[error("Config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Data directory '{0}' not found")]
    DataDirNotFound(PathBuf),
    #[error("No documents found in {0}")]
    NoDocuments(PathBuf),
    #[error(
        "Vector store directory '{0}' not found. Please run 'ingest' first to build the index."
    )]
    IndexNotFound(PathBuf),
    #[error(
        "Vector store directory '{0}' is empty. Please run 'ingest' first to build the index."
    )]
    IndexEmpty(PathBuf),
    #[error("Index has no nodes to persist")]
    EmptyIndex,
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("LanceDB error: {0}")]
    LanceDb(#[from] lancedb::Error),
    #[error("Embedding error: {0}")]
    Embed(String),
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Arrow error: {0}")]
    Arrow(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
