use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source metadata attached to documents and carried onto their nodes.
pub type Metadata = BTreeMap<String, String>;

/// Raw text of one input record: a CSV row or a whole text file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub doc_id: String,
    pub text: String,
    pub metadata: Metadata,
}

/// One chunk of a document's text; the unit that gets embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    pub node_id: String,
    pub doc_id: String,
    pub text: String,
    pub metadata: Metadata,
}

/// A retrieved node with its cosine similarity to the question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceNode {
    pub node_id: String,
    pub text: String,
    pub score: f32,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub answer: String,
    pub source_nodes: Vec<SourceNode>,
}

pub struct IngestStats {
    pub documents: usize,
    pub nodes: usize,
}
