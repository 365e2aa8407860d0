//! Dense retrieval: one query embedding, one store search.

use anyhow::{anyhow, Result};
use dossier_core::traits::{ChunkStore, Embedder};
use dossier_core::types::{Chunk, DocumentFilter};
use tracing::debug;

/// Pairs the embedder with a chunk store. The query is embedded exactly
/// once per call; there is no embedding cache.
pub struct SemanticSearcher<S> {
    store: S,
    embedder: Box<dyn Embedder>,
}

impl<S: ChunkStore> SemanticSearcher<S> {
    pub fn new(store: S, embedder: Box<dyn Embedder>) -> Self {
        Self { store, embedder }
    }

    /// The underlying store, for entity scans and stats.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    /// Nearest chunks to `query`, ascending by distance, optionally
    /// restricted to the documents in `filter`.
    pub async fn search(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> Result<Vec<Chunk>> {
        let vector = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        let hits = self.store.search(&vector, top_k, filter).await?;
        debug!(top_k, filtered = filter.is_some(), hits = hits.len(), "semantic search");
        Ok(hits)
    }
}
