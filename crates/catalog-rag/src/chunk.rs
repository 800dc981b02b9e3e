use unicode_segmentation::UnicodeSegmentation;

use crate::config::RagConfig;
use crate::types::{Document, Node};

const CHARS_PER_TOKEN: usize = 4;

/// Rough token count used for chunk sizing.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Sentence-packing splitter that turns documents into nodes.
pub struct NodeParser {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl NodeParser {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split every document and assign node ids `{doc_id}#{n}`.
    pub fn get_nodes(&self, documents: &[Document]) -> Vec<Node> {
        documents
            .iter()
            .flat_map(|doc| {
                self.split_text(&doc.text)
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| Node {
                        node_id: format!("{}#{i}", doc.doc_id),
                        doc_id: doc.doc_id.clone(),
                        text,
                        metadata: doc.metadata.clone(),
                    })
            })
            .collect()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces = self.pieces(text);

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_tokens = 0usize;

        for piece in pieces {
            let tokens = estimate_tokens(piece);
            if !current.is_empty() && current_tokens + tokens > self.chunk_size {
                push_chunk(&mut chunks, &current);

                // Carry trailing sentences that fit in the overlap window.
                let mut carried = 0usize;
                let mut keep = 0usize;
                for p in current.iter().rev() {
                    let t = estimate_tokens(p);
                    if carried + t > self.chunk_overlap || carried + t + tokens > self.chunk_size {
                        break;
                    }
                    carried += t;
                    keep += 1;
                }
                current.drain(..current.len() - keep);
                current_tokens = carried;
            }
            current.push(piece);
            current_tokens += tokens;
        }
        push_chunk(&mut chunks, &current);
        chunks
    }

    /// Sentences, with any sentence longer than a chunk hard-split.
    fn pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let max_chars = self.chunk_size * CHARS_PER_TOKEN;
        let mut out = Vec::new();
        for sentence in text.split_sentence_bounds() {
            if estimate_tokens(sentence) <= self.chunk_size {
                out.push(sentence);
                continue;
            }
            let mut start = 0;
            let mut count = 0;
            for (idx, _) in sentence.char_indices() {
                if count == max_chars {
                    out.push(&sentence[start..idx]);
                    start = idx;
                    count = 0;
                }
                count += 1;
            }
            out.push(&sentence[start..]);
        }
        out
    }
}

fn push_chunk(chunks: &mut Vec<String>, parts: &[&str]) {
    let joined = parts.concat();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
