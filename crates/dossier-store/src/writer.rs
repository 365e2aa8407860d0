//! Chunk ingestion into LanceDB.

use crate::schema::build_chunk_schema;
use crate::table::{ensure_table, escape_literal, open_db, set_meta};
use anyhow::{anyhow, ensure, Result};
use arrow_array::{FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator, StringArray};
use chrono::Utc;
use dossier_core::types::Chunk;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::Connection;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const INSERT_BATCH_SIZE: usize = 1000;

pub struct LanceChunkWriter {
    db: Connection,
    table_name: String,
    dim: i32,
}

impl LanceChunkWriter {
    pub async fn new(db_path: &Path, table_name: &str, dim: usize) -> Result<Self> {
        let db = open_db(db_path.to_string_lossy().as_ref()).await?;
        let writer = Self { db, table_name: table_name.to_string(), dim: dim as i32 };
        ensure_table(&writer.db, &writer.table_name, build_chunk_schema(writer.dim)).await?;
        Ok(writer)
    }

    pub fn connection(&self) -> &Connection {
        &self.db
    }

    /// True when any stored chunk carries this file hash; re-ingest of an
    /// unchanged file is skipped on that basis.
    pub async fn document_exists(&self, file_hash: &str) -> Result<bool> {
        let table = self.db.open_table(&self.table_name).execute().await?;
        let mut stream = table
            .query()
            .only_if(format!("file_hash = '{}'", escape_literal(file_hash)))
            .limit(1)
            .execute()
            .await?;
        while let Some(batch) = futures::TryStreamExt::try_next(&mut stream).await? {
            if batch.num_rows() > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Insert one document's chunks with their vectors, in batches.
    pub async fn insert_document(
        &self,
        file_hash: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }
        if chunks.len() != vectors.len() {
            return Err(anyhow!(
                "chunks and vectors length mismatch: {} vs {}",
                chunks.len(),
                vectors.len()
            ));
        }
        for start in (0..chunks.len()).step_by(INSERT_BATCH_SIZE) {
            let end = (start + INSERT_BATCH_SIZE).min(chunks.len());
            let batch =
                self.to_record_batch(file_hash, &chunks[start..end], &vectors[start..end])?;
            let schema = batch.schema();
            let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
            self.db.open_table(&self.table_name).execute().await?.add(reader).execute().await?;
        }
        info!(table = %self.table_name, chunks = chunks.len(), "inserted document chunks");
        Ok(())
    }

    /// Record ingest bookkeeping in the meta table.
    pub async fn stamp_ingest(&self) -> Result<()> {
        set_meta(&self.db, "last_ingest_at", &Utc::now().to_rfc3339()).await?;
        set_meta(&self.db, "embedding_dim", &self.dim.to_string()).await
    }

    fn to_record_batch(
        &self,
        file_hash: &str,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<RecordBatch> {
        let schema = build_chunk_schema(self.dim);
        let mut ids = Vec::with_capacity(chunks.len());
        let mut document_ids = Vec::with_capacity(chunks.len());
        let mut file_hashes = Vec::with_capacity(chunks.len());
        let mut pages = Vec::with_capacity(chunks.len());
        let mut texts = Vec::with_capacity(chunks.len());
        let mut persons = Vec::with_capacity(chunks.len());
        let mut locations = Vec::with_capacity(chunks.len());
        let mut organizations = Vec::with_capacity(chunks.len());
        let mut dates = Vec::with_capacity(chunks.len());
        let mut file_numbers = Vec::with_capacity(chunks.len());
        let mut others = Vec::with_capacity(chunks.len());
        let mut rows: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(chunks.len());

        for (chunk, vector) in chunks.iter().zip(vectors.iter()) {
            ensure!(
                vector.len() == self.dim as usize,
                "vector dim {} does not match table dim {}",
                vector.len(),
                self.dim
            );
            ids.push(chunk.id.clone());
            document_ids.push(chunk.document_id.clone());
            file_hashes.push(file_hash.to_string());
            pages.push(chunk.page_number as i32);
            texts.push(chunk.text.clone());
            persons.push(serde_json::to_string(&chunk.entities.person_names)?);
            locations.push(serde_json::to_string(&chunk.entities.location_names)?);
            organizations.push(serde_json::to_string(&chunk.entities.organization_names)?);
            dates.push(serde_json::to_string(&chunk.entities.date_entities)?);
            file_numbers.push(serde_json::to_string(&chunk.entities.file_numbers)?);
            others.push(serde_json::to_string(&chunk.entities.other_entities)?);
            rows.push(Some(vector.iter().map(|&x| Some(x)).collect()));
        }

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(ids)),
                Arc::new(StringArray::from(document_ids)),
                Arc::new(StringArray::from(file_hashes)),
                Arc::new(Int32Array::from(pages)),
                Arc::new(StringArray::from(texts)),
                Arc::new(StringArray::from(persons)),
                Arc::new(StringArray::from(locations)),
                Arc::new(StringArray::from(organizations)),
                Arc::new(StringArray::from(dates)),
                Arc::new(StringArray::from(file_numbers)),
                Arc::new(StringArray::from(others)),
                Arc::new(FixedSizeListArray::from_iter_primitive::<
                    arrow_array::types::Float32Type,
                    _,
                    _,
                >(rows.into_iter(), self.dim)),
            ],
        )?;
        Ok(batch)
    }
}
