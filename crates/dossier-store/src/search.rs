//! Vector search and corpus scans over the chunk table.

use crate::table::{escape_literal, open_db};
use anyhow::{Context, Result};
use arrow_array::{Float32Array, Int32Array, RecordBatch, StringArray};
use dossier_core::traits::ChunkStore;
use dossier_core::types::{Chunk, ChunkSource, DocumentFilter, EntitySets};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use std::path::Path;
use tracing::debug;

pub struct LanceChunkStore {
    db: Connection,
    table_name: String,
}

impl LanceChunkStore {
    pub async fn open(db_path: &Path, table_name: &str) -> Result<Self> {
        let db = open_db(db_path.to_string_lossy().as_ref()).await?;
        Ok(Self { db, table_name: table_name.to_string() })
    }

    pub fn from_connection(db: Connection, table_name: &str) -> Self {
        Self { db, table_name: table_name.to_string() }
    }
}

/// `document_id = 'a' OR document_id = 'b' ...` over the filter's ids.
fn document_filter_expr(filter: &DocumentFilter) -> String {
    filter
        .ids()
        .map(|id| format!("document_id = '{}'", escape_literal(id)))
        .collect::<Vec<_>>()
        .join(" OR ")
}

fn str_col<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow::anyhow!("column '{}' missing or not a string column", name))
}

/// Decode one result batch into chunks. Entity columns decode leniently:
/// a malformed field is logged and read as empty rather than failing the
/// whole search.
fn batch_to_chunks(batch: &RecordBatch, out: &mut Vec<Chunk>) -> Result<()> {
    let ids = str_col(batch, "id")?;
    let document_ids = str_col(batch, "document_id")?;
    let pages = batch
        .column_by_name("page_number")
        .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
        .ok_or_else(|| anyhow::anyhow!("column 'page_number' missing or not an int column"))?;
    let texts = str_col(batch, "text")?;
    let persons = str_col(batch, "person_names")?;
    let locations = str_col(batch, "location_names")?;
    let organizations = str_col(batch, "organization_names")?;
    let dates = str_col(batch, "date_entities")?;
    let file_numbers = str_col(batch, "file_numbers")?;
    let others = str_col(batch, "other_entities")?;
    let distances =
        batch.column_by_name("_distance").and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    for i in 0..batch.num_rows() {
        let entities = EntitySets::from_json_fields_lenient(
            persons.value(i),
            locations.value(i),
            organizations.value(i),
            dates.value(i),
            file_numbers.value(i),
            others.value(i),
        );
        out.push(Chunk {
            id: ids.value(i).to_string(),
            document_id: document_ids.value(i).to_string(),
            page_number: pages.value(i).max(0) as u32,
            text: texts.value(i).to_string(),
            distance: distances.map(|d| d.value(i)).unwrap_or(0.0),
            entities,
            entity_matches: None,
            source: ChunkSource::Semantic,
        });
    }
    Ok(())
}

impl ChunkStore for LanceChunkStore {
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<Chunk>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        // An empty filter would render as an empty predicate; it means
        // "no documents", not "all documents".
        if filter.map(DocumentFilter::is_empty).unwrap_or(false) {
            return Ok(Vec::new());
        }

        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .with_context(|| format!("failed to open chunk table '{}'", self.table_name))?;
        let mut query = table
            .vector_search(vector.to_vec())
            .context("vector search rejected the query vector")?
            .limit(top_k);
        if let Some(f) = filter {
            query = query.only_if(document_filter_expr(f));
        }

        let mut stream = query.execute().await.context("vector search failed")?;
        let mut chunks = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            batch_to_chunks(&batch, &mut chunks)?;
        }
        // Stream batches can interleave; enforce ascending distance.
        chunks.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        chunks.truncate(top_k);
        debug!(hits = chunks.len(), top_k, filtered = filter.is_some(), "vector search");
        Ok(chunks)
    }

    async fn scan_all(&self) -> Result<Vec<Chunk>> {
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .with_context(|| format!("failed to open chunk table '{}'", self.table_name))?;
        let mut stream = table.query().execute().await.context("corpus scan failed")?;
        let mut chunks = Vec::new();
        while let Some(batch) = stream.try_next().await? {
            batch_to_chunks(&batch, &mut chunks)?;
        }
        debug!(chunks = chunks.len(), "corpus scan");
        Ok(chunks)
    }

    async fn count(&self) -> Result<usize> {
        let table = self
            .db
            .open_table(&self.table_name)
            .execute()
            .await
            .with_context(|| format!("failed to open chunk table '{}'", self.table_name))?;
        Ok(table.count_rows(None).await?)
    }
}
