use std::env;
use std::io;

use dossier_core::config::{expand_path, Settings};
use dossier_retrieval::ingest::corpus_stats;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let json = env::args().skip(1).any(|a| a == "--json");

    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let db_path = expand_path(&settings.data.store_dir);
    let stats = corpus_stats(&db_path, &settings.data.table).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("📊 dossier-stats\n================");
    println!("Store: {}", db_path.display());
    println!("Table: {}", stats.table);
    println!("Chunks: {}", stats.total_chunks);
    println!("Embedding dim: {}", stats.embedding_dim.as_deref().unwrap_or("unknown"));
    println!("Last ingest: {}", stats.last_ingest_at.as_deref().unwrap_or("never"));
    Ok(())
}
