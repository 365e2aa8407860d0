//! Dedup-and-order utilities shared by every scenario combination.
//!
//! All merges follow the same discipline: a seen-id set where the first
//! occurrence of a chunk id wins its content and source tag. Ordering
//! differs per caller, so sorting is separate from deduplication.

use dossier_core::types::{Chunk, ChunkId};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Stable ascending sort by vector distance. Ties keep their input order,
/// which makes entity-core chunks (synthetic 0.0) surface in scan order.
pub fn sort_ascending(chunks: &mut [Chunk]) {
    chunks.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
}

/// Concatenate `primary` and `secondary`, dropping ids already seen.
/// Insertion order is kept, so callers that must not re-rank (the simple
/// mode) use this directly.
pub fn dedup_first_wins(primary: Vec<Chunk>, secondary: Vec<Chunk>) -> Vec<Chunk> {
    let mut seen: HashSet<ChunkId> = HashSet::with_capacity(primary.len() + secondary.len());
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());
    for chunk in primary.into_iter().chain(secondary) {
        if seen.insert(chunk.id.clone()) {
            merged.push(chunk);
        }
    }
    merged
}

/// Hybrid merge: dedup first-wins, then a stable ascending re-sort.
pub fn merge_unique(primary: Vec<Chunk>, secondary: Vec<Chunk>) -> Vec<Chunk> {
    let mut merged = dedup_first_wins(primary, secondary);
    sort_ascending(&mut merged);
    merged
}

/// Diversity merge for document expansion. Seeds are admitted
/// unconditionally but still count toward their document's budget;
/// expansion chunks are admitted only while their document stays under
/// `per_document_cap`. The result is sorted ascending by distance.
pub fn merge_with_document_cap(
    seeds: Vec<Chunk>,
    expansion: Vec<Chunk>,
    per_document_cap: usize,
) -> Vec<Chunk> {
    let mut seen: HashSet<ChunkId> = HashSet::new();
    let mut admitted: HashMap<String, usize> = HashMap::new();
    let mut merged = Vec::with_capacity(seeds.len() + expansion.len());

    for chunk in seeds {
        if !seen.insert(chunk.id.clone()) {
            continue;
        }
        *admitted.entry(chunk.document_id.clone()).or_insert(0) += 1;
        merged.push(chunk);
    }

    for chunk in expansion {
        if seen.contains(&chunk.id) {
            continue;
        }
        let count = admitted.entry(chunk.document_id.clone()).or_insert(0);
        if *count >= per_document_cap {
            continue;
        }
        *count += 1;
        seen.insert(chunk.id.clone());
        merged.push(chunk);
    }

    sort_ascending(&mut merged);
    merged
}
