use std::env;
use std::io;
use std::path::PathBuf;

use dossier_core::config::{expand_path, Settings};
use dossier_core::loader::list_corpus_files;
use dossier_embed::default_embedder;
use dossier_entities::EntityExtractor;
use dossier_retrieval::ingest::{FailedFile, IngestReport, IngestStatus, IngestedFile, SkippedFile};
use dossier_retrieval::Ingestor;
use dossier_store::LanceChunkWriter;
use indicatif::{ProgressBar, ProgressStyle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut corpus_dir: Option<PathBuf> = None;
    let mut file: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--file" | "-f" => {
                if i + 1 < args.len() {
                    file = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    eprintln!("Error: --file requires a file name");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                eprintln!("Usage: dossier-ingest [corpus_dir] [--file NAME]");
                std::process::exit(0);
            }
            _ if !args[i].starts_with('-') => corpus_dir = Some(PathBuf::from(&args[i])),
            _ => {}
        }
        i += 1;
    }

    let settings = Settings::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let corpus_dir = corpus_dir.unwrap_or_else(|| expand_path(&settings.data.corpus_dir));
    let db_path = expand_path(&settings.data.store_dir);

    println!("Dossier Ingest\n==============");
    println!("Corpus directory: {}", corpus_dir.display());
    println!("Store: {} (table {})", db_path.display(), settings.data.table);

    let writer =
        LanceChunkWriter::new(&db_path, &settings.data.table, settings.embedding.dimension)
            .await?;
    let embedder = default_embedder(&settings.embedding)?;
    let ingestor = Ingestor::new(writer, embedder, EntityExtractor::with_default_rules());

    let files = match &file {
        Some(name) => vec![corpus_dir.join(name)],
        None => list_corpus_files(&corpus_dir),
    };
    if files.is_empty() {
        println!("⚠️  No corpus files found under {}", corpus_dir.display());
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut report = IngestReport::default();
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        pb.set_message(name.clone());
        match ingestor.ingest_file(&path).await {
            Ok(IngestStatus::Ingested { chunks }) => {
                report.ingested.push(IngestedFile { file: name, chunks });
            }
            Ok(IngestStatus::Skipped(reason)) => {
                report.skipped.push(SkippedFile { file: name, reason });
            }
            Err(err) => {
                report.failed.push(FailedFile { file: name, error: format!("{err:#}") });
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    println!("\n📊 Ingested {} files ({} chunks)", report.ingested.len(), report.total_chunks());
    for f in &report.ingested {
        println!("  + {} ({} chunks)", f.file, f.chunks);
    }
    if !report.skipped.is_empty() {
        println!("⏭️  Skipped {} files", report.skipped.len());
        for f in &report.skipped {
            println!("  - {} ({})", f.file, f.reason.as_str());
        }
    }
    if !report.failed.is_empty() {
        println!("❌ Failed {} files", report.failed.len());
        for f in &report.failed {
            println!("  ! {}: {}", f.file, f.error);
        }
    }

    println!("\n💡 To query, use: cargo run --bin dossier-ask -- '<query>' --mode hybrid");
    Ok(())
}
