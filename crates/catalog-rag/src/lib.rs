pub mod chunk;
pub mod config;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod openai;
pub mod query;
pub mod schema;
pub mod store;
pub mod types;

pub use config::RagConfig;
pub use error::RagError;
pub use ingest::{VectorIndex, index_exists};
pub use loader::load_documents;
pub use openai::OpenAiClient;
pub use query::{DEFAULT_SIMILARITY_TOP_K, QueryEngine};
pub use store::StoredIndex;
pub use types::*;

#[cfg(test)]
mod tests;
