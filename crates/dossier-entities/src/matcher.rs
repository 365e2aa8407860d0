//! Weighted entity overlap ranking.
//!
//! The sparse half of hybrid retrieval: stored chunks are scored by entity
//! overlap with the query's sets. An exact file-number hit adds 10 per
//! matching query id; every other category adds at most 1 per chunk no
//! matter how many of its terms hit. Survivors sort by descending count,
//! stable, so corpus order breaks ties.

use dossier_core::types::{Chunk, ChunkSource, EntityCategory, EntitySets, QueryEntities};
use tracing::debug;

#[derive(Debug, Default)]
pub struct EntityMatcher;

impl EntityMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Rank `corpus` against the query's entities, keeping the `top_k`
    /// strongest. Matched chunks come back annotated: match count set,
    /// synthetic zero distance, entity source tag. An empty query
    /// short-circuits to no results.
    pub fn rank(&self, query: &QueryEntities, corpus: &[Chunk], top_k: usize) -> Vec<Chunk> {
        if query.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut matched: Vec<Chunk> = Vec::new();
        for chunk in corpus {
            let count = self.match_count(query, &chunk.entities);
            if count == 0 {
                continue;
            }
            let mut hit = chunk.clone();
            hit.distance = 0.0;
            hit.entity_matches = Some(count);
            hit.source = ChunkSource::Entity;
            matched.push(hit);
        }

        matched.sort_by(|a, b| b.entity_matches.cmp(&a.entity_matches));
        matched.truncate(top_k);
        debug!(scanned = corpus.len(), matched = matched.len(), "entity scan complete");
        matched
    }

    /// Weighted match count between query and chunk entity sets.
    pub fn match_count(&self, query: &QueryEntities, chunk: &EntitySets) -> u32 {
        let mut count = 0;
        for category in EntityCategory::ALL {
            let query_terms = query.terms(category);
            let chunk_terms = chunk.terms(category);
            if query_terms.is_empty() || chunk_terms.is_empty() {
                continue;
            }
            if category == EntityCategory::FileNumber {
                // Exact ids; every matching query file number scores.
                for id in query_terms {
                    if chunk_terms.iter().any(|stored| stored == id) {
                        count += category.weight();
                    }
                }
            } else {
                // Capped: the whole category contributes at most one point.
                let hit = query_terms
                    .iter()
                    .any(|q| chunk_terms.iter().any(|c| contains_either(q, c)));
                if hit {
                    count += category.weight();
                }
            }
        }
        count
    }
}

/// Case handling is a type invariant: entity sets are lowercased on insert
/// and on decode, so substring checks compare directly.
fn contains_either(a: &str, b: &str) -> bool {
    a.contains(b) || b.contains(a)
}
