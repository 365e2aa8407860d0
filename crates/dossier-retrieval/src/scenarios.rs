//! The two competing retrieval scenarios and their combinations.
//!
//! Scenario 1 lets a coarse semantic pass pick the relevant documents and
//! then mines them deeper. Scenario 2 starts from entity overlap and
//! expands within the documents holding those entities. The hybrid mode
//! runs both concurrently and merges; document expansion is a single-pass
//! alternative with a per-document diversity cap.

use crate::engine::RetrievalEngine;
use crate::merge::{merge_unique, merge_with_document_cap, sort_ascending};
use crate::response::{PathCounts, RetrievalOutcome};
use anyhow::{Context, Result};
use dossier_core::traits::ChunkStore;
use dossier_core::types::{Chunk, ChunkSource, DocumentFilter};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Second-pass fetch width per document in both scenarios.
const CHUNKS_PER_DOC: usize = 10;
/// Fetch cap for scenario 1's filtered pass.
const SCENARIO_1_FETCH_CAP: usize = 50;
/// Fetch cap for scenario 2's filtered pass.
const SCENARIO_2_FETCH_CAP: usize = 100;
/// Per-document fetch width for document expansion.
const EXPANSION_CHUNKS_PER_DOC: usize = 5;
/// Fetch cap for document expansion's filtered pass.
const EXPANSION_FETCH_CAP: usize = 100;

impl<S: ChunkStore> RetrievalEngine<S> {
    /// Scenario 1, direct semantic expansion: the top seed chunks identify
    /// which documents matter, a filtered second pass mines those documents,
    /// and the closest few survive.
    pub async fn scenario_one(&self, query: &str) -> Result<Vec<Chunk>> {
        let seeds = self.searcher.search(query, self.settings.seed_top_k, None).await?;
        if seeds.is_empty() {
            debug!("scenario 1: no seed chunks");
            return Ok(Vec::new());
        }

        let filter = DocumentFilter::from_chunks(&seeds);
        let limit = (filter.len() * CHUNKS_PER_DOC).min(SCENARIO_1_FETCH_CAP);
        let mut expanded = self.searcher.search(query, limit, Some(&filter)).await?;
        for chunk in &mut expanded {
            chunk.source = ChunkSource::Scenario1;
        }
        sort_ascending(&mut expanded);
        expanded.truncate(self.settings.scenario1_top_k);
        debug!(documents = filter.len(), chunks = expanded.len(), "scenario 1 complete");
        Ok(expanded)
    }

    /// Scenario 2, entity-first expansion: the strongest entity matches
    /// come through as-is, followed by the best semantic chunks from every
    /// document the entities appear in. Never falls back to plain semantic
    /// search: an entity-free query yields nothing.
    pub async fn scenario_two(&self, query: &str) -> Result<Vec<Chunk>> {
        let matched = self.entity_hits(query, self.settings.entity_scan_cap).await?;
        if matched.is_empty() {
            debug!("scenario 2: no entity matches");
            return Ok(Vec::new());
        }

        let mut core: Vec<Chunk> =
            matched.iter().take(self.settings.entity_chunks).cloned().collect();
        for chunk in &mut core {
            chunk.source = ChunkSource::Scenario2Entity;
        }

        // Document ids come from every match, not only the selected core.
        let filter = DocumentFilter::from_chunks(&matched);
        let limit = (filter.len() * CHUNKS_PER_DOC).min(SCENARIO_2_FETCH_CAP);
        let hits = self.searcher.search(query, limit, Some(&filter)).await?;

        let mut seen: HashSet<String> = core.iter().map(|c| c.id.clone()).collect();
        let mut expansion = Vec::new();
        for mut hit in hits {
            if !seen.insert(hit.id.clone()) {
                continue;
            }
            hit.source = ChunkSource::Scenario2Document;
            expansion.push(hit);
        }
        sort_ascending(&mut expansion);
        expansion.truncate(self.settings.document_chunks);

        debug!(
            core = core.len(),
            expansion = expansion.len(),
            documents = filter.len(),
            "scenario 2 complete"
        );
        core.extend(expansion);
        Ok(core)
    }

    /// Run both scenarios concurrently and merge their outputs into one
    /// deduplicated, distance-ordered list. If one scenario fails the
    /// result degrades to the other's output; both failing is an error.
    pub async fn retrieve_hybrid(&self, query: &str) -> Result<RetrievalOutcome> {
        let (first, second) = tokio::join!(self.scenario_one(query), self.scenario_two(query));
        let (scenario_1, scenario_2) = match (first, second) {
            (Ok(s1), Ok(s2)) => (s1, s2),
            (Ok(s1), Err(err)) => {
                warn!(error = %err, "scenario 2 failed, keeping scenario 1 output");
                (s1, Vec::new())
            }
            (Err(err), Ok(s2)) => {
                warn!(error = %err, "scenario 1 failed, keeping scenario 2 output");
                (Vec::new(), s2)
            }
            (Err(first_err), Err(second_err)) => {
                return Err(
                    first_err.context(format!("both scenarios failed; scenario 2: {second_err:#}"))
                );
            }
        };

        let scenario_1_count = scenario_1.len();
        let scenario_2_count = scenario_2.len();
        let chunks = merge_unique(scenario_1, scenario_2);
        debug!(scenario_1_count, scenario_2_count, merged = chunks.len(), "hybrid complete");

        Ok(RetrievalOutcome {
            query: query.to_string(),
            total_results: chunks.len(),
            counts: PathCounts::Hybrid { scenario_1_count, scenario_2_count },
            chunks,
        })
    }

    /// Single-pass alternative to the hybrid: semantic seeds, expanded with
    /// chunks from every entity-matched document under the per-document
    /// cap. Seeds are kept unconditionally; a query without entities
    /// returns them unchanged.
    pub async fn retrieve_with_document_expansion(&self, query: &str) -> Result<RetrievalOutcome> {
        let seeds = self.searcher.search(query, self.settings.seed_top_k, None).await?;
        let semantic_count = seeds.len();

        let Some(entities) = self.query_entities(query) else {
            return Ok(RetrievalOutcome {
                query: query.to_string(),
                total_results: seeds.len(),
                counts: PathCounts::Expansion {
                    semantic_count,
                    entity_count: 0,
                    document_expansion: false,
                    matched_documents: Vec::new(),
                },
                chunks: seeds,
            });
        };

        let corpus = self.searcher.store().scan_all().await.context("entity scan failed")?;
        let matched = self.matcher.rank(&entities, &corpus, self.settings.expansion_scan_cap);
        let entity_count = matched.len();
        let filter = DocumentFilter::from_chunks(&matched);

        let mut expansion = Vec::new();
        if !filter.is_empty() {
            let limit = (filter.len() * EXPANSION_CHUNKS_PER_DOC).min(EXPANSION_FETCH_CAP);
            expansion = self.searcher.search(query, limit, Some(&filter)).await?;
            for chunk in &mut expansion {
                chunk.source = ChunkSource::DocumentExpansion;
            }
        }

        let matched_documents: Vec<String> = filter.ids().map(str::to_string).collect();
        let mut chunks = merge_with_document_cap(seeds, expansion, self.settings.per_document_cap);
        chunks.truncate(self.settings.expansion_max);
        debug!(
            seeds = semantic_count,
            entity_matches = entity_count,
            documents = matched_documents.len(),
            returned = chunks.len(),
            "document expansion complete"
        );

        Ok(RetrievalOutcome {
            query: query.to_string(),
            total_results: chunks.len(),
            counts: PathCounts::Expansion {
                semantic_count,
                entity_count,
                document_expansion: true,
                matched_documents,
            },
            chunks,
        })
    }
}
