use arrow_array::{FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::ArrowError;
use lancedb::database::CreateTableMode;
use std::path::Path;
use std::sync::Arc;

use crate::chunk::NodeParser;
use crate::config::RagConfig;
use crate::error::RagError;
use crate::openai::OpenAiClient;
use crate::schema::{NODES_TABLE, nodes_schema};
use crate::types::{Document, Node};

/// True when `dir` exists and has at least one entry.
///
/// This is the whole contract between ingest and query: a non-empty
/// directory is a usable index, anything else needs an ingest first.
pub fn index_exists(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Nodes and their embeddings, held in memory until persisted.
pub struct VectorIndex {
    nodes: Vec<Node>,
    embeddings: Vec<Vec<f32>>,
    dim: usize,
}

impl VectorIndex {
    /// Chunk `documents` into nodes and embed them in batches.
    pub async fn from_documents(
        client: &OpenAiClient,
        config: &RagConfig,
        documents: &[Document],
    ) -> Result<Self, RagError> {
        let nodes = NodeParser::from_config(config).get_nodes(documents);
        tracing::info!(
            documents = documents.len(),
            nodes = nodes.len(),
            "parsed documents into nodes"
        );

        let texts: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();
        let batches: Vec<&[String]> = texts.chunks(config.embed_batch_size.max(1)).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for (i, batch) in batches.iter().enumerate() {
            tracing::info!("embedding batch {}/{} ({} nodes)", i + 1, batches.len(), batch.len());
            embeddings.extend(client.embed(&config.embed_model, batch).await?);
        }

        Self::from_parts(nodes, embeddings)
    }

    /// Assemble an index from precomputed embeddings.
    pub fn from_parts(nodes: Vec<Node>, embeddings: Vec<Vec<f32>>) -> Result<Self, RagError> {
        if nodes.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if nodes.len() != embeddings.len() {
            return Err(RagError::Embed(format!(
                "{} nodes but {} embeddings",
                nodes.len(),
                embeddings.len()
            )));
        }
        let dim = embeddings[0].len();
        if dim == 0 || embeddings.iter().any(|e| e.len() != dim) {
            return Err(RagError::Embed("embeddings have inconsistent dimensions".into()));
        }
        Ok(Self {
            nodes,
            embeddings,
            dim,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Write the `nodes` table into `dir`, creating the directory if needed.
    ///
    /// An existing `nodes` table is overwritten. Other files in `dir` are left alone.
    pub async fn persist(&self, dir: &Path) -> Result<(), RagError> {
        tokio::fs::create_dir_all(dir).await?;

        let db = lancedb::connect(&dir.to_string_lossy()).execute().await?;
        let batch = self.to_record_batch()?;
        let reader = RecordBatchIterator::new(vec![Ok(batch)], nodes_schema(self.dim as i32));
        db.create_table(NODES_TABLE, Box::new(reader))
            .mode(CreateTableMode::Overwrite)
            .execute()
            .await?;

        tracing::info!(nodes = self.nodes.len(), dir = %dir.display(), "persisted index");
        Ok(())
    }

    fn to_record_batch(&self) -> Result<RecordBatch, RagError> {
        let node_ids: Vec<&str> = self.nodes.iter().map(|n| n.node_id.as_str()).collect();
        let doc_ids: Vec<&str> = self.nodes.iter().map(|n| n.doc_id.as_str()).collect();
        let texts: Vec<&str> = self.nodes.iter().map(|n| n.text.as_str()).collect();
        let metadata = self
            .nodes
            .iter()
            .map(|n| serde_json::to_string(&n.metadata))
            .collect::<Result<Vec<_>, _>>()?;

        RecordBatch::try_new(
            nodes_schema(self.dim as i32),
            vec![
                Arc::new(StringArray::from(node_ids)),
                Arc::new(StringArray::from(doc_ids)),
                Arc::new(build_vector_array(&self.embeddings, self.dim as i32)),
                Arc::new(StringArray::from(texts)),
                Arc::new(StringArray::from(metadata)),
            ],
        )
        .map_err(|e: ArrowError| RagError::Arrow(e.to_string()))
    }
}

fn build_vector_array(embeddings: &[Vec<f32>], dim: i32) -> FixedSizeListArray {
    let flat: Vec<f32> = embeddings.iter().flat_map(|v| v.iter().copied()).collect();
    let flat_array = Arc::new(Float32Array::from(flat));
    let field = Arc::new(arrow_schema::Field::new(
        "item",
        arrow_schema::DataType::Float32,
        true,
    ));
    FixedSizeListArray::new(field, dim, flat_array, None)
}
