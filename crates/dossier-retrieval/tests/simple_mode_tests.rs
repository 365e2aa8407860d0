use anyhow::Result;
use dossier_core::traits::Embedder;
use dossier_core::types::{Chunk, ChunkSource, EntityCategory, EntitySets};
use dossier_entities::EntityExtractor;
use dossier_retrieval::response::PathCounts;
use dossier_retrieval::{RetrievalEngine, RetrievalMode};
use dossier_store::MemoryChunkStore;

const WESTDALE_QUERY: &str = "What did Westdale Holdings, Inc. do in June 2022?";

/// Maps every text to the origin, so a chunk stored at `[d, 0]` sits at
/// distance d² from any query and the ranking is fully scripted.
struct OriginEmbedder;

impl Embedder for OriginEmbedder {
    fn dim(&self) -> usize {
        2
    }

    fn max_len(&self) -> usize {
        256
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.0, 0.0]).collect())
    }
}

fn chunk(document_id: &str, page: u32, build: impl FnOnce(&mut EntitySets)) -> Chunk {
    let mut entities = EntitySets::new();
    build(&mut entities);
    Chunk {
        id: format!("{document_id}:{page}"),
        document_id: document_id.to_string(),
        page_number: page,
        text: format!("{document_id} page {page}"),
        distance: 0.0,
        entities,
        entity_matches: None,
        source: ChunkSource::Semantic,
    }
}

fn insert(store: &MemoryChunkStore, d: f32, chunk: Chunk) {
    store.insert(vec![d, 0.0], chunk);
}

fn engine(store: MemoryChunkStore) -> RetrievalEngine<MemoryChunkStore> {
    RetrievalEngine::new(store, Box::new(OriginEmbedder), EntityExtractor::with_default_rules())
}

/// Entity-bearing pages far from the query, entity-free pages close to it.
fn corpus() -> MemoryChunkStore {
    let store = MemoryChunkStore::new();
    insert(
        &store,
        5.0,
        chunk("ledger", 1, |s| {
            s.insert(EntityCategory::Organization, "westdale holdings inc");
            s.insert(EntityCategory::Date, "june 2022");
        }),
    );
    insert(&store, 1.0, chunk("ledger", 2, |_| {}));
    insert(&store, 2.0, chunk("ledger", 3, |_| {}));
    insert(
        &store,
        6.0,
        chunk("minutes", 1, |s| {
            s.insert(EntityCategory::Organization, "westdale holdings inc");
        }),
    );
    insert(&store, 0.5, chunk("survey", 1, |_| {}));
    store
}

#[tokio::test]
async fn simple_appends_entity_hits_without_reranking() {
    let outcome = engine(corpus()).retrieve_simple(WESTDALE_QUERY, 3, 6).await.expect("simple");

    let ids: Vec<&str> = outcome.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["survey:1", "ledger:2", "ledger:3", "ledger:1", "minutes:1"]);

    // Semantic block first, entity block after it. The zero-distance entity
    // chunks sitting behind real distances shows nothing got re-sorted.
    assert!(outcome.chunks[..3].iter().all(|c| c.source == ChunkSource::Semantic));
    assert!(outcome.chunks[3..].iter().all(|c| c.source == ChunkSource::Entity));
    assert!(outcome.chunks[2].distance > 0.0);
    assert_eq!(outcome.chunks[3].distance, 0.0);
    assert_eq!(outcome.chunks[3].entity_matches, Some(2));

    assert_eq!(outcome.total_results, 5);
    match outcome.counts {
        PathCounts::Simple { semantic_count, entity_count } => {
            assert_eq!(semantic_count, 3);
            assert_eq!(entity_count, 2);
        }
        other => panic!("unexpected counts: {other:?}"),
    }
}

#[tokio::test]
async fn simple_dedup_keeps_the_semantic_instance() {
    let store = MemoryChunkStore::new();
    insert(
        &store,
        1.0,
        chunk("ledger", 1, |s| {
            s.insert(EntityCategory::Organization, "westdale holdings inc");
        }),
    );
    insert(&store, 2.0, chunk("ledger", 2, |_| {}));
    insert(
        &store,
        3.0,
        chunk("minutes", 1, |s| {
            s.insert(EntityCategory::Organization, "westdale holdings inc");
        }),
    );
    insert(&store, 10.0, chunk("survey", 1, |_| {}));

    let outcome = engine(store)
        .retrieve_simple("Tell me about Westdale Holdings, Inc.", 3, 6)
        .await
        .expect("simple");

    // Both entity hits already sit in the semantic top 3, so the entity
    // block adds nothing and the semantic instances keep their distances.
    let ids: Vec<&str> = outcome.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["ledger:1", "ledger:2", "minutes:1"]);
    assert!(outcome.chunks.iter().all(|c| c.source == ChunkSource::Semantic));
    assert!(outcome.chunks.iter().all(|c| c.distance > 0.0));
    assert!(outcome.chunks.iter().all(|c| c.entity_matches.is_none()));

    match outcome.counts {
        PathCounts::Simple { semantic_count, entity_count } => {
            assert_eq!(semantic_count, 3);
            assert_eq!(entity_count, 2);
        }
        other => panic!("unexpected counts: {other:?}"),
    }
}

#[tokio::test]
async fn simple_truncates_to_max_chunks() {
    let outcome = engine(corpus()).retrieve_simple(WESTDALE_QUERY, 3, 4).await.expect("simple");

    assert_eq!(outcome.total_results, 4);
    let ids: Vec<&str> = outcome.chunks.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["survey:1", "ledger:2", "ledger:3", "ledger:1"]);

    // Counts describe the per-path fetches, not the truncated output.
    match outcome.counts {
        PathCounts::Simple { semantic_count, entity_count } => {
            assert_eq!(semantic_count, 3);
            assert_eq!(entity_count, 2);
        }
        other => panic!("unexpected counts: {other:?}"),
    }
}

#[tokio::test]
async fn simple_outcome_serializes_flat() {
    let outcome = engine(corpus()).retrieve_simple(WESTDALE_QUERY, 3, 6).await.expect("simple");
    let value = serde_json::to_value(&outcome).expect("serialize");

    let object = value.as_object().expect("object");
    assert!(object.contains_key("query"));
    assert!(object.contains_key("total_results"));
    assert!(object.contains_key("semantic_count"));
    assert!(object.contains_key("entity_count"));
    assert!(object.contains_key("chunks"));
    assert!(!object.contains_key("counts"));

    assert_eq!(value["query"], WESTDALE_QUERY);
    assert_eq!(value["total_results"], 5);
    assert_eq!(value["chunks"][0]["source"], "semantic");
    assert_eq!(value["chunks"][3]["source"], "entity");
    assert_eq!(value["chunks"][3]["entity_matches"], 2);
}

#[tokio::test]
async fn retrieve_dispatches_on_mode() {
    let engine = engine(corpus());

    let simple = engine.retrieve(WESTDALE_QUERY, RetrievalMode::Simple).await.expect("simple");
    assert!(matches!(simple.counts, PathCounts::Simple { .. }));

    let hybrid = engine.retrieve(WESTDALE_QUERY, RetrievalMode::Hybrid).await.expect("hybrid");
    assert!(matches!(hybrid.counts, PathCounts::Hybrid { .. }));

    let expansion = engine
        .retrieve(WESTDALE_QUERY, RetrievalMode::DocumentExpansion)
        .await
        .expect("expansion");
    assert!(matches!(expansion.counts, PathCounts::Expansion { .. }));
}

#[test]
fn mode_parses_cli_names() {
    assert_eq!("simple".parse::<RetrievalMode>().expect("simple"), RetrievalMode::Simple);
    assert_eq!("hybrid".parse::<RetrievalMode>().expect("hybrid"), RetrievalMode::Hybrid);
    assert_eq!(
        "expansion".parse::<RetrievalMode>().expect("expansion"),
        RetrievalMode::DocumentExpansion
    );
    assert_eq!(
        "document-expansion".parse::<RetrievalMode>().expect("long form"),
        RetrievalMode::DocumentExpansion
    );
    assert!("keyword".parse::<RetrievalMode>().is_err());
    assert_eq!(RetrievalMode::DocumentExpansion.to_string(), "document-expansion");
}
