use arrow_array::{Array, Float32Array, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::DistanceType;
use lancedb::query::{ExecutableQuery, QueryBase, Select};

use crate::config::RagConfig;
use crate::error::RagError;
use crate::openai::{ChatMessage, OpenAiClient};
use crate::store::StoredIndex;
use crate::types::{Metadata, Response, SourceNode};

pub const DEFAULT_SIMILARITY_TOP_K: usize = 3;

/// Answer text used when retrieval finds nothing; the LLM is not called.
pub const EMPTY_RESPONSE: &str = "Empty Response";

const SYSTEM_PROMPT: &str = "You answer questions about a product catalog. \
Use only the catalog context you are given, never prior knowledge. \
If the context does not contain the answer, say so plainly. \
Do not mention the context itself in your answer.";

/// Metadata keys kept out of the prompt.
const PROMPT_EXCLUDED_KEYS: &[&str] = &["file_path"];

// ── Arrow extraction helpers ────────────────────────────────────────────────

fn str_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, RagError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| RagError::Arrow(format!("missing string column {name}")))
}

fn col_str(arr: &StringArray, row: usize) -> String {
    if arr.is_null(row) {
        String::new()
    } else {
        arr.value(row).to_string()
    }
}

fn distance_column(batch: &RecordBatch) -> Option<&Float32Array> {
    batch
        .column_by_name("_distance")
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
}

fn source_nodes_from_batch(batch: &RecordBatch) -> Result<Vec<SourceNode>, RagError> {
    let ids = str_column(batch, "node_id")?;
    let texts = str_column(batch, "text")?;
    let metadata = str_column(batch, "metadata")?;
    let distances = distance_column(batch);

    let mut out = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let raw_meta = col_str(metadata, row);
        let metadata: Metadata = if raw_meta.is_empty() {
            Metadata::new()
        } else {
            serde_json::from_str(&raw_meta)?
        };
        // Cosine distance is 1 - cosine similarity.
        let score = distances.map(|d| 1.0 - d.value(row)).unwrap_or(0.0);
        out.push(SourceNode {
            node_id: col_str(ids, row),
            text: col_str(texts, row),
            score,
            metadata,
        });
    }
    Ok(out)
}

// ── Prompt ──────────────────────────────────────────────────────────────────

/// Render retrieved nodes and the question into the user prompt.
pub fn build_prompt(question: &str, nodes: &[SourceNode]) -> String {
    let context = nodes
        .iter()
        .map(|n| {
            let meta: Vec<String> = n
                .metadata
                .iter()
                .filter(|(k, _)| !PROMPT_EXCLUDED_KEYS.contains(&k.as_str()))
                .map(|(k, v)| format!("{k}: {v}"))
                .collect();
            if meta.is_empty() {
                n.text.clone()
            } else {
                format!("{}\n\n{}", meta.join("\n"), n.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Catalog context is below.\n\
         ---------------------\n\
         {context}\n\
         ---------------------\n\
         Using the catalog context and not prior knowledge, answer the question.\n\
         Question: {question}\n\
         Answer: "
    )
}

// ── Query engine ────────────────────────────────────────────────────────────

/// Retrieval-augmented question answering over a [`StoredIndex`].
pub struct QueryEngine {
    index: StoredIndex,
    client: OpenAiClient,
    config: RagConfig,
    similarity_top_k: usize,
    verbose: bool,
}

impl QueryEngine {
    pub fn new(
        index: StoredIndex,
        client: OpenAiClient,
        config: RagConfig,
        similarity_top_k: usize,
    ) -> Self {
        Self {
            index,
            client,
            config,
            similarity_top_k: similarity_top_k.max(1),
            verbose: false,
        }
    }

    /// Log every retrieved node id and score at debug level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn similarity_top_k(&self) -> usize {
        self.similarity_top_k
    }

    /// The `similarity_top_k` nodes closest to `question`, best first.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SourceNode>, RagError> {
        let embedding = self
            .client
            .embed_query(&self.config.embed_model, question)
            .await?;

        let batches = self
            .index
            .nodes
            .query()
            .nearest_to(embedding.as_slice())?
            .distance_type(DistanceType::Cosine)
            .select(Select::columns(&["node_id", "text", "metadata"]))
            .limit(self.similarity_top_k)
            .execute()
            .await?
            .try_collect::<Vec<_>>()
            .await?;

        let mut nodes = Vec::new();
        for batch in &batches {
            nodes.extend(source_nodes_from_batch(batch)?);
        }
        nodes.sort_by(|a, b| b.score.total_cmp(&a.score));
        nodes.truncate(self.similarity_top_k);

        if self.verbose {
            for n in &nodes {
                tracing::debug!(node_id = %n.node_id, score = n.score, "retrieved node");
            }
        }
        Ok(nodes)
    }

    /// Retrieve context for `question` and ask the LLM to answer from it.
    pub async fn query(&self, question: &str) -> Result<Response, RagError> {
        let source_nodes = self.retrieve(question).await?;
        if source_nodes.is_empty() {
            return Ok(Response {
                answer: EMPTY_RESPONSE.to_string(),
                source_nodes,
            });
        }

        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(question, &source_nodes)),
        ];
        if self.verbose {
            tracing::debug!(model = %self.config.llm_model, "sending prompt to LLM");
        }
        let answer = self
            .client
            .chat(&self.config.llm_model, self.config.temperature, &messages)
            .await?;

        Ok(Response {
            answer: answer.trim().to_string(),
            source_nodes,
        })
    }
}
