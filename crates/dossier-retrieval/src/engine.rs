//! The retrieval engine: collaborators, mode dispatch and the simple
//! semantic-plus-entity path. The scenario implementations live in the
//! scenarios module.

use crate::merge::dedup_first_wins;
use crate::response::{PathCounts, RetrievalMode, RetrievalOutcome};
use crate::semantic::SemanticSearcher;
use anyhow::{Context, Result};
use dossier_core::config::RetrievalSettings;
use dossier_core::traits::{ChunkStore, Embedder};
use dossier_core::types::{Chunk, QueryEntities};
use dossier_entities::{EntityExtractor, EntityMatcher};
use tracing::{debug, warn};

/// Answers retrieval requests against one chunk store. Holds only
/// read-only collaborators, so one engine serves concurrent requests.
pub struct RetrievalEngine<S> {
    pub(crate) searcher: SemanticSearcher<S>,
    pub(crate) extractor: EntityExtractor,
    pub(crate) matcher: EntityMatcher,
    pub(crate) settings: RetrievalSettings,
}

impl<S: ChunkStore> RetrievalEngine<S> {
    pub fn new(store: S, embedder: Box<dyn Embedder>, extractor: EntityExtractor) -> Self {
        Self::with_settings(store, embedder, extractor, RetrievalSettings::default())
    }

    pub fn with_settings(
        store: S,
        embedder: Box<dyn Embedder>,
        extractor: EntityExtractor,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            searcher: SemanticSearcher::new(store, embedder),
            extractor,
            matcher: EntityMatcher::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Answer one request in the given mode. Simple mode takes its result
    /// bounds from the settings; the scenario modes are governed by their
    /// own per-scenario caps.
    pub async fn retrieve(&self, query: &str, mode: RetrievalMode) -> Result<RetrievalOutcome> {
        match mode {
            RetrievalMode::Simple => {
                self.retrieve_simple(query, self.settings.min_chunks, self.settings.max_chunks)
                    .await
            }
            RetrievalMode::Hybrid => self.retrieve_hybrid(query).await,
            RetrievalMode::DocumentExpansion => self.retrieve_with_document_expansion(query).await,
        }
    }

    /// Semantic top-k and entity top-k side by side: semantic chunks first,
    /// entity chunks appended minus duplicates, no re-ranking. `max_chunks`
    /// truncates; falling short of `min_chunks` only warns.
    pub async fn retrieve_simple(
        &self,
        query: &str,
        min_chunks: usize,
        max_chunks: usize,
    ) -> Result<RetrievalOutcome> {
        let semantic = self.searcher.search(query, self.settings.seed_top_k, None).await?;
        let entity = self.entity_hits(query, self.settings.seed_top_k).await?;

        let semantic_count = semantic.len();
        let entity_count = entity.len();
        let mut chunks = dedup_first_wins(semantic, entity);
        if chunks.len() < min_chunks {
            warn!(found = chunks.len(), min_chunks, "fewer chunks than the requested minimum");
        }
        chunks.truncate(max_chunks);
        debug!(semantic_count, entity_count, returned = chunks.len(), "simple retrieval complete");

        Ok(RetrievalOutcome {
            query: query.to_string(),
            total_results: chunks.len(),
            counts: PathCounts::Simple { semantic_count, entity_count },
            chunks,
        })
    }

    /// Entity-ranked chunks for `query`. Queries without extractable
    /// entities contribute nothing; store failures propagate.
    pub(crate) async fn entity_hits(&self, query: &str, top_k: usize) -> Result<Vec<Chunk>> {
        let Some(entities) = self.query_entities(query) else {
            return Ok(Vec::new());
        };
        let corpus = self.searcher.store().scan_all().await.context("entity scan failed")?;
        Ok(self.matcher.rank(&entities, &corpus, top_k))
    }

    /// Extracted query entities, or `None` when extraction fails or finds
    /// nothing. Failures are logged and swallowed here so entity-driven
    /// paths degrade to an empty contribution instead of erroring.
    pub(crate) fn query_entities(&self, query: &str) -> Option<QueryEntities> {
        match self.extractor.extract(query) {
            Ok(entities) if entities.is_empty() => {
                debug!("no entities in query");
                None
            }
            Ok(entities) => Some(entities),
            Err(err) => {
                warn!(error = %err, "query entity extraction failed");
                None
            }
        }
    }
}
