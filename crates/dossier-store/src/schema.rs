use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

pub const DEFAULT_EMBEDDING_DIM: i32 = 384;

/// Chunk table schema. The six entity sets are stored as JSON-encoded
/// string columns next to the text and its vector.
pub fn build_chunk_schema(dim: i32) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("document_id", DataType::Utf8, false),
        Field::new("file_hash", DataType::Utf8, false),
        Field::new("page_number", DataType::Int32, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("person_names", DataType::Utf8, false),
        Field::new("location_names", DataType::Utf8, false),
        Field::new("organization_names", DataType::Utf8, false),
        Field::new("date_entities", DataType::Utf8, false),
        Field::new("file_numbers", DataType::Utf8, false),
        Field::new("other_entities", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim),
            true,
        ),
    ]))
}
