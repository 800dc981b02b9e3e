//! Integration tests for the catalog-rag crate.
//!
//! These run the full load → build → persist → load → query pipeline against
//! a temporary LanceDB directory, with the embeddings and chat endpoints
//! served by wiremock. Embeddings are keyword indicator vectors so retrieval
//! order is predictable.

use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::config::RagConfig;
use crate::error::RagError;
use crate::ingest::{VectorIndex, index_exists};
use crate::loader::load_documents;
use crate::openai::OpenAiClient;
use crate::query::QueryEngine;
use crate::store::StoredIndex;

// ── Fixtures ─────────────────────────────────────────────────────────────────

const PRODUCTS_CSV: &str = "\
name,category,description,price
Galaxy M34,phone,Huge 6000 mAh battery that lasts two days,16999
Pixel 8,phone,Flagship camera with night mode,59999
ThinkPad X1,laptop,Lightweight laptop for business travel,149999
";

const KEYWORDS: &[&str] = &["battery", "camera", "laptop"];

fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = KEYWORDS
        .iter()
        .map(|k| if lower.contains(k) { 1.0 } else { 0.0 })
        .collect();
    // Keep every vector non-zero so cosine distance is defined.
    v.push(0.1);
    v
}

/// Embeds each input as a keyword indicator vector.
struct KeywordEmbeddings;

impl Respond for KeywordEmbeddings {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap();
        let data: Vec<Value> = body["input"]
            .as_array()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"index": i, "embedding": keyword_vector(t.as_str().unwrap())}))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"data": data}))
    }
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

async fn mock_openai() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(KeywordEmbeddings)
        .mount(&server)
        .await;
    server
}

fn test_config(server: &MockServer) -> RagConfig {
    RagConfig::with_api_key("sk-test").with_api_base(server.uri())
}

fn write_catalog(dir: &TempDir) -> std::path::PathBuf {
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    fs::write(data.join("products.csv"), PRODUCTS_CSV).unwrap();
    data
}

async fn build_and_persist(config: &RagConfig, data: &Path, store: &Path) -> usize {
    let client = OpenAiClient::new(config);
    let docs = load_documents(data).unwrap();
    let index = VectorIndex::from_documents(&client, config, &docs)
        .await
        .unwrap();
    index.persist(store).await.unwrap();
    index.len()
}

async fn embedding_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/embeddings")
        .count()
}

// ── Pipeline tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ingest_builds_one_node_per_row() {
    let server = mock_openai().await;
    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");

    let nodes = build_and_persist(&test_config(&server), &data, &store).await;
    assert_eq!(nodes, 3);
    assert!(index_exists(&store));

    let loaded = StoredIndex::load(&store).await.unwrap();
    assert_eq!(loaded.node_count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_ingest_batches_embedding_requests() {
    let server = mock_openai().await;
    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");

    let mut config = test_config(&server);
    config.embed_batch_size = 2;
    build_and_persist(&config, &data, &store).await;

    // 3 nodes in batches of 2
    assert_eq!(embedding_requests(&server).await, 2);
}

#[tokio::test]
async fn test_query_retrieves_most_similar_and_answers() {
    let server = mock_openai().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Galaxy M34"))
        .respond_with(chat_reply("  The Galaxy M34 has the biggest battery.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");
    let config = test_config(&server);
    build_and_persist(&config, &data, &store).await;

    let index = StoredIndex::load(&store).await.unwrap();
    let engine = QueryEngine::new(index, OpenAiClient::new(&config), config, 1);
    let response = engine
        .query("Which phone has the best battery?")
        .await
        .unwrap();

    assert_eq!(response.answer, "The Galaxy M34 has the biggest battery.");
    assert_eq!(response.source_nodes.len(), 1);
    let top = &response.source_nodes[0];
    assert_eq!(top.node_id, "products.csv:1#0");
    assert!(top.text.contains("Galaxy M34"));
    assert!(top.score > 0.9, "score {}", top.score);
    assert_eq!(top.metadata["file_name"], "products.csv");
    assert_eq!(top.metadata["row"], "1");
}

#[tokio::test]
async fn test_retrieve_orders_by_score_and_honors_top_k() {
    let server = mock_openai().await;
    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");
    let config = test_config(&server);
    build_and_persist(&config, &data, &store).await;

    let index = StoredIndex::load(&store).await.unwrap();
    let engine = QueryEngine::new(index, OpenAiClient::new(&config), config, 2);
    assert_eq!(engine.similarity_top_k(), 2);

    let nodes = engine.retrieve("a laptop for travel").await.unwrap();
    assert_eq!(nodes.len(), 2);
    assert!(nodes[0].text.contains("ThinkPad"));
    assert!(nodes[0].score >= nodes[1].score);
}

#[tokio::test]
async fn test_top_k_larger_than_index_returns_all() {
    let server = mock_openai().await;
    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");
    let config = test_config(&server);
    build_and_persist(&config, &data, &store).await;

    let index = StoredIndex::load(&store).await.unwrap();
    let engine = QueryEngine::new(index, OpenAiClient::new(&config), config, 10);
    let nodes = engine.retrieve("camera").await.unwrap();
    assert_eq!(nodes.len(), 3);
    assert!(nodes[0].text.contains("Pixel 8"));
}

#[tokio::test]
async fn test_query_llm_failure_is_reported() {
    let server = mock_openai().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");
    let config = test_config(&server);
    build_and_persist(&config, &data, &store).await;

    let index = StoredIndex::load(&store).await.unwrap();
    let engine = QueryEngine::new(index, OpenAiClient::new(&config), config, 3);
    let err = engine.query("battery?").await.unwrap_err();
    assert!(matches!(err, RagError::Llm(_)));
}

#[tokio::test]
async fn test_failed_embedding_leaves_previous_index_untouched() {
    let good = mock_openai().await;
    let dir = TempDir::new().unwrap();
    let data = write_catalog(&dir);
    let store = dir.path().join("vector_store");
    build_and_persist(&test_config(&good), &data, &store).await;

    let bad = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&bad)
        .await;
    let config = test_config(&bad);
    let docs = load_documents(&data).unwrap();
    let result = VectorIndex::from_documents(&OpenAiClient::new(&config), &config, &docs).await;
    assert!(matches!(result, Err(RagError::Embed(_))));

    let loaded = StoredIndex::load(&store).await.unwrap();
    assert_eq!(loaded.node_count().await.unwrap(), 3);
}
