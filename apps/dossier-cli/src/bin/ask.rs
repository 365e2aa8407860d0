use std::env;
use std::io;

use dossier_core::config::{expand_path, Settings};
use dossier_embed::default_embedder;
use dossier_entities::EntityExtractor;
use dossier_retrieval::response::PathCounts;
use dossier_retrieval::{RetrievalEngine, RetrievalMode};
use dossier_store::LanceChunkStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} \"<query>\" [--mode simple|hybrid|expansion] [--json]", args[0]);
        eprintln!(
            "Example: {} 'What did Westdale Holdings, Inc. do in June 2022?' --mode hybrid",
            args[0]
        );
        std::process::exit(1);
    }
    let query = args[1].clone();
    let mut mode = RetrievalMode::Hybrid;
    let mut json = false;
    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--mode" | "-m" => {
                if i + 1 < args.len() {
                    mode = args[i + 1].parse().unwrap_or_else(|e| {
                        eprintln!("Error: {}", e);
                        std::process::exit(1)
                    });
                    i += 1;
                } else {
                    eprintln!("Error: --mode requires a value");
                    std::process::exit(1);
                }
            }
            "--json" => json = true,
            _ => {}
        }
        i += 1;
    }

    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let db_path = expand_path(&settings.data.store_dir);
    let store = LanceChunkStore::open(&db_path, &settings.data.table).await?;
    let embedder = default_embedder(&settings.embedding)?;
    let engine = RetrievalEngine::with_settings(
        store,
        embedder,
        EntityExtractor::with_default_rules(),
        settings.retrieval.clone(),
    );

    let outcome = engine.retrieve(&query, mode).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("🔍 dossier-ask\n==============");
    println!("Query: {}", outcome.query);
    println!("Mode: {}", mode);
    match &outcome.counts {
        PathCounts::Simple { semantic_count, entity_count } => {
            println!("Fetched: {} semantic, {} entity", semantic_count, entity_count);
        }
        PathCounts::Hybrid { scenario_1_count, scenario_2_count } => {
            println!(
                "Fetched: {} from scenario 1, {} from scenario 2",
                scenario_1_count, scenario_2_count
            );
        }
        PathCounts::Expansion {
            semantic_count,
            entity_count,
            document_expansion,
            matched_documents,
        } => {
            println!(
                "Fetched: {} semantic, {} entity (expansion: {})",
                semantic_count, entity_count, document_expansion
            );
            if !matched_documents.is_empty() {
                println!("Documents: {}", matched_documents.join(", "));
            }
        }
    }

    println!("\n🔍 Found {} chunks for: \"{}\"", outcome.total_results, query);
    for (i, chunk) in outcome.chunks.iter().enumerate() {
        let matches =
            chunk.entity_matches.map(|m| format!("  matches={}", m)).unwrap_or_default();
        println!(
            "\n  {}. distance={:.4}  source={}  doc={}  page={}{}",
            i + 1,
            chunk.distance,
            chunk.source,
            chunk.document_id,
            chunk.page_number,
            matches
        );
        println!("     📝 {}", snippet(&chunk.text, 200));
    }
    Ok(())
}

/// Single-line preview of a chunk, cut at `max_chars`.
fn snippet(text: &str, max_chars: usize) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.chars().count() <= max_chars {
        return joined;
    }
    let cut: String = joined.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}
