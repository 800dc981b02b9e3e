use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const NODES_TABLE: &str = "nodes";

fn vector_field(dim: i32) -> Field {
    Field::new(
        "vector",
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, true)),
            dim,
        ),
        false,
    )
}

/// Schema of the `nodes` table. `dim` is the embedding model's output width.
pub fn nodes_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("node_id", DataType::Utf8, false),
        Field::new("doc_id", DataType::Utf8, false),
        vector_field(dim),
        Field::new("text", DataType::Utf8, false),
        // JSON object of string → string
        Field::new("metadata", DataType::Utf8, false),
    ]))
}
