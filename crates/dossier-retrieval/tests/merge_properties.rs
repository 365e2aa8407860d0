use std::collections::{HashMap, HashSet};

use dossier_core::types::{Chunk, ChunkSource, EntitySets};
use dossier_retrieval::merge::{dedup_first_wins, merge_unique, merge_with_document_cap};
use proptest::prelude::*;

/// (document, page, distance) triples; duplicate ids within one list are
/// legal input and must be collapsed the same way as cross-list duplicates.
fn rows() -> impl Strategy<Value = Vec<(u8, u8, u32)>> {
    prop::collection::vec((0u8..5, 0u8..12, 0u32..40), 0..25)
}

fn build(rows: &[(u8, u8, u32)], source: ChunkSource) -> Vec<Chunk> {
    rows.iter()
        .map(|&(doc, page, dist)| Chunk {
            id: format!("d{doc}:{page}"),
            document_id: format!("d{doc}"),
            page_number: u32::from(page),
            text: String::new(),
            distance: dist as f32 / 10.0,
            entities: EntitySets::new(),
            entity_matches: None,
            source,
        })
        .collect()
}

fn ids(chunks: &[Chunk]) -> Vec<String> {
    chunks.iter().map(|c| c.id.clone()).collect()
}

proptest! {
    #[test]
    fn merged_output_is_unique_ascending_and_first_wins(a in rows(), b in rows()) {
        let merged = merge_unique(
            build(&a, ChunkSource::Scenario1),
            build(&b, ChunkSource::Scenario2Entity),
        );

        let mut seen = HashSet::new();
        for chunk in &merged {
            prop_assert!(seen.insert(chunk.id.clone()), "duplicate id {}", chunk.id);
        }
        for pair in merged.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }

        // The first occurrence across primary-then-secondary owns the id and
        // its source tag survives the merge.
        let mut winners: HashMap<String, ChunkSource> = HashMap::new();
        for chunk in build(&a, ChunkSource::Scenario1)
            .into_iter()
            .chain(build(&b, ChunkSource::Scenario2Entity))
        {
            winners.entry(chunk.id).or_insert(chunk.source);
        }
        prop_assert_eq!(merged.len(), winners.len());
        for chunk in &merged {
            prop_assert_eq!(chunk.source, winners[&chunk.id]);
        }
    }

    #[test]
    fn dedup_preserves_insertion_order(a in rows(), b in rows()) {
        let out = dedup_first_wins(build(&a, ChunkSource::Semantic), build(&b, ChunkSource::Entity));

        let mut expected = Vec::new();
        let mut seen = HashSet::new();
        for chunk in build(&a, ChunkSource::Semantic)
            .into_iter()
            .chain(build(&b, ChunkSource::Entity))
        {
            if seen.insert(chunk.id.clone()) {
                expected.push(chunk.id);
            }
        }
        prop_assert_eq!(ids(&out), expected);
    }

    #[test]
    fn document_cap_binds_expansion_but_never_seeds(
        seeds in rows(),
        expansion in rows(),
        cap in 1usize..4,
    ) {
        let seed_chunks = build(&seeds, ChunkSource::Semantic);
        let out = merge_with_document_cap(
            seed_chunks.clone(),
            build(&expansion, ChunkSource::DocumentExpansion),
            cap,
        );

        let mut out_ids = HashSet::new();
        for chunk in &out {
            prop_assert!(out_ids.insert(chunk.id.clone()), "duplicate id {}", chunk.id);
        }
        for pair in out.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }

        // Every distinct seed survives, no matter how lopsided its document.
        let mut seed_ids = HashSet::new();
        let mut seeded: HashMap<String, usize> = HashMap::new();
        for chunk in &seed_chunks {
            if seed_ids.insert(chunk.id.clone()) {
                *seeded.entry(chunk.document_id.clone()).or_insert(0) += 1;
            }
        }
        for id in &seed_ids {
            prop_assert!(out_ids.contains(id), "seed {} dropped", id);
        }

        // Per document the expansion fills up to the cap and no further.
        let mut totals: HashMap<String, usize> = HashMap::new();
        for chunk in &out {
            *totals.entry(chunk.document_id.clone()).or_insert(0) += 1;
        }
        for (doc, total) in &totals {
            let from_seeds = seeded.get(doc).copied().unwrap_or(0);
            prop_assert!(
                *total <= from_seeds.max(cap),
                "document {} holds {} chunks with {} seeds and cap {}",
                doc, total, from_seeds, cap
            );
        }
    }

    #[test]
    fn equal_distances_keep_arrival_order(a in rows(), b in rows()) {
        let flatten = |list: Vec<Chunk>| {
            list.into_iter()
                .map(|mut c| {
                    c.distance = 0.0;
                    c
                })
                .collect::<Vec<_>>()
        };
        let primary = flatten(build(&a, ChunkSource::Scenario1));
        let secondary = flatten(build(&b, ChunkSource::Scenario2Entity));

        // With every distance equal the stable sort must not reorder, so
        // the merge degenerates to plain first-wins dedup.
        let merged = merge_unique(primary.clone(), secondary.clone());
        let deduped = dedup_first_wins(primary, secondary);
        prop_assert_eq!(ids(&merged), ids(&deduped));
    }
}
