use dossier_core::config::{RetrievalSettings, Settings};
use dossier_core::error::Error;
use dossier_core::loader::{list_corpus_files, load_document, split_pages};
use dossier_core::types::{Chunk, ChunkSource, DocumentFilter, EntityCategory, EntitySets};
use std::fs;
use tempfile::TempDir;

#[test]
fn insert_normalizes_and_dedups() {
    let mut sets = EntitySets::new();
    sets.insert(EntityCategory::Organization, "WESTDALE");
    sets.insert(EntityCategory::Organization, "  Westdale ");
    sets.insert(EntityCategory::Organization, "westdale inc");
    sets.insert(EntityCategory::Organization, "");

    assert_eq!(sets.organization_names, vec!["westdale", "westdale inc"]);
    assert_eq!(sets.total(), 2);
    assert!(!sets.is_empty());
}

#[test]
fn insert_other_keeps_label_prefix() {
    let mut sets = EntitySets::new();
    sets.insert_other("Money", "$2.4 Million");
    sets.insert_other("money", "$2.4 million");

    assert_eq!(sets.other_entities, vec!["money:$2.4 million"]);
}

#[test]
fn strict_decode_names_the_bad_field() {
    let err = EntitySets::from_json_fields(
        r#"["alice"]"#,
        "not json",
        "[]",
        "[]",
        "[]",
        "[]",
    )
    .unwrap_err();

    match err {
        Error::Decode { field, .. } => assert_eq!(field, "location_names"),
        other => panic!("expected decode error, got {other:?}"),
    }
}

#[test]
fn strict_decode_normalizes_stored_terms() {
    let sets = EntitySets::from_json_fields(
        r#"["Alice Smith", "alice smith"]"#,
        "[]",
        "[]",
        "[]",
        r#"["ABC1-12345-XY"]"#,
        "",
    )
    .unwrap();

    assert_eq!(sets.person_names, vec!["alice smith"]);
    assert_eq!(sets.file_numbers, vec!["abc1-12345-xy"]);
    assert!(sets.other_entities.is_empty());
}

#[test]
fn lenient_decode_drops_only_the_bad_field() {
    let sets = EntitySets::from_json_fields_lenient(
        r#"["alice"]"#,
        "{broken",
        r#"["acme corp"]"#,
        "[]",
        "[]",
        "[]",
    );

    assert_eq!(sets.person_names, vec!["alice"]);
    assert!(sets.location_names.is_empty());
    assert_eq!(sets.organization_names, vec!["acme corp"]);
}

#[test]
fn chunk_serializes_with_flattened_entities() {
    let mut entities = EntitySets::new();
    entities.insert(EntityCategory::Person, "Alice");
    let chunk = Chunk {
        id: "doc:1".to_string(),
        document_id: "doc".to_string(),
        page_number: 1,
        text: "Alice was here".to_string(),
        distance: 0.0,
        entities,
        entity_matches: Some(1),
        source: ChunkSource::Scenario2Entity,
    };

    let json = serde_json::to_value(&chunk).unwrap();
    assert_eq!(json["person_names"][0], "alice");
    assert_eq!(json["source"], "scenario-2-entity");
    assert_eq!(json["entity_matches"], 1);

    let semantic = Chunk { entity_matches: None, ..chunk };
    let json = serde_json::to_value(&semantic).unwrap();
    assert!(json.get("entity_matches").is_none());
}

#[test]
fn document_filter_collects_distinct_ids() {
    let chunks: Vec<Chunk> = ["a", "b", "a"]
        .iter()
        .map(|doc| Chunk {
            id: format!("{doc}:1"),
            document_id: (*doc).to_string(),
            page_number: 1,
            text: String::new(),
            distance: 0.5,
            entities: EntitySets::new(),
            entity_matches: None,
            source: ChunkSource::Semantic,
        })
        .collect();

    let filter = DocumentFilter::from_chunks(&chunks);
    assert_eq!(filter.len(), 2);
    assert!(filter.contains("a"));
    assert!(filter.contains("b"));
    assert_eq!(filter.ids().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn matcher_priority_puts_file_numbers_first() {
    assert_eq!(EntityCategory::ALL[0], EntityCategory::FileNumber);
    assert_eq!(EntityCategory::FileNumber.weight(), 10);
    assert_eq!(EntityCategory::Person.weight(), 1);
}

#[test]
fn split_pages_honors_markers() {
    let content = "converter preamble\n<!-- Page 1 -->\nfirst page\n<!-- Page 2 -->\n\n<!--Page 3-->\nthird page\n";
    let pages = split_pages(content);

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].number, 1);
    assert_eq!(pages[0].text, "first page");
    assert_eq!(pages[1].number, 3);
    assert_eq!(pages[1].text, "third page");
}

#[test]
fn split_pages_without_markers_is_one_page() {
    let pages = split_pages("just some text\non two lines");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].number, 1);

    assert!(split_pages("   \n  ").is_empty());
}

#[test]
fn load_document_hashes_and_splits() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("case-file.md");
    fs::write(&path, "<!-- Page 1 -->\nalpha\n<!-- Page 2 -->\nbeta").unwrap();

    let doc = load_document(&path).unwrap();
    assert_eq!(doc.document_id, "case-file");
    assert_eq!(doc.pages.len(), 2);
    assert_eq!(doc.file_hash.len(), 64);

    let again = load_document(&path).unwrap();
    assert_eq!(doc.file_hash, again.file_hash);
}

#[test]
fn list_corpus_files_filters_and_sorts() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("b.md"), "b").unwrap();
    fs::write(dir.path().join("a.txt"), "a").unwrap();
    fs::write(dir.path().join("ignore.pdf"), "x").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/c.markdown"), "c").unwrap();

    let files = list_corpus_files(dir.path());
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.md", "c.markdown"]);
}

#[test]
fn retrieval_settings_defaults_match_scenarios() {
    let settings = RetrievalSettings::default();
    assert_eq!(settings.seed_top_k, 3);
    assert_eq!(settings.scenario1_top_k, 5);
    assert_eq!(settings.entity_chunks, 2);
    assert_eq!(settings.document_chunks, 2);
    assert_eq!(settings.entity_scan_cap, 100);
    assert_eq!(settings.expansion_scan_cap, 50);
    assert_eq!(settings.per_document_cap, 3);
    assert_eq!(settings.expansion_max, 10);

    let settings = Settings::default();
    assert_eq!(settings.embedding.dimension, 384);
    assert_eq!(settings.data.table, "document_chunks");
}
