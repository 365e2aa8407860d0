//! In-memory chunk store: exact scan, no persistence.
//!
//! Serves retrieval tests and small offline corpora through the same
//! `ChunkStore` trait as the LanceDB store.

use anyhow::{ensure, Result};
use dossier_core::traits::ChunkStore;
use dossier_core::types::{Chunk, ChunkSource, DocumentFilter};
use std::sync::{PoisonError, RwLock};

#[derive(Default)]
pub struct MemoryChunkStore {
    rows: RwLock<Vec<(Vec<f32>, Chunk)>>,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, vector: Vec<f32>, chunk: Chunk) {
        self.rows.write().unwrap_or_else(PoisonError::into_inner).push((vector, chunk));
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Squared L2; same ordering as the real distance.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl ChunkStore for MemoryChunkStore {
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<Chunk>> {
        if top_k == 0 || filter.map(DocumentFilter::is_empty).unwrap_or(false) {
            return Ok(Vec::new());
        }

        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        let mut hits = Vec::new();
        for (stored_vector, chunk) in rows.iter() {
            ensure!(
                stored_vector.len() == vector.len(),
                "stored vector dim {} does not match query dim {}",
                stored_vector.len(),
                vector.len()
            );
            if let Some(f) = filter {
                if !f.contains(&chunk.document_id) {
                    continue;
                }
            }
            let mut hit = chunk.clone();
            hit.distance = squared_l2(vector, stored_vector);
            hit.entity_matches = None;
            hit.source = ChunkSource::Semantic;
            hits.push(hit);
        }
        hits.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    async fn scan_all(&self) -> Result<Vec<Chunk>> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows
            .iter()
            .map(|(_, chunk)| {
                let mut c = chunk.clone();
                c.distance = 0.0;
                c.entity_matches = None;
                c.source = ChunkSource::Semantic;
                c
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.len())
    }
}
