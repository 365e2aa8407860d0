use crate::types::{Chunk, DocumentFilter, Mention};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// External NER seam: text in, raw labeled mentions out. Normalization and
/// category routing happen in the extraction pipeline, not here.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, text: &str) -> anyhow::Result<Vec<Mention>>;
}

/// Vector store seam. Used through generics, not trait objects.
#[allow(async_fn_in_trait)]
pub trait ChunkStore: Send + Sync {
    /// Nearest chunks to `vector`, ascending by distance, optionally
    /// restricted to the documents in `filter`.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&DocumentFilter>,
    ) -> anyhow::Result<Vec<Chunk>>;

    /// Every stored chunk, for entity scans.
    async fn scan_all(&self) -> anyhow::Result<Vec<Chunk>>;

    async fn count(&self) -> anyhow::Result<usize>;
}
