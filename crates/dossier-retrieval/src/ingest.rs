//! Corpus ingestion: load files, split pages, extract entities, embed and
//! insert. Files whose content hash is already stored are skipped, so
//! re-running ingest over an unchanged corpus is a no-op.

use anyhow::{Context, Result};
use dossier_core::loader::{list_corpus_files, load_document, LoadedDocument};
use dossier_core::traits::Embedder;
use dossier_core::types::{Chunk, ChunkSource};
use dossier_entities::EntityExtractor;
use dossier_store::table::{get_meta, open_db};
use dossier_store::LanceChunkWriter;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// What happened to one corpus file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    Ingested { chunks: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A stored chunk already carries this file's content hash.
    AlreadyIngested,
    /// The file held no non-empty pages.
    NoPages,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::AlreadyIngested => "already ingested",
            SkipReason::NoPages => "no pages",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestedFile {
    pub file: String,
    pub chunks: usize,
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub file: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Outcome of a directory run. Per-file failures land in `failed` and do
/// not stop the run.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub ingested: Vec<IngestedFile>,
    pub skipped: Vec<SkippedFile>,
    pub failed: Vec<FailedFile>,
}

impl IngestReport {
    pub fn total_chunks(&self) -> usize {
        self.ingested.iter().map(|f| f.chunks).sum()
    }
}

/// Drives the ingest pipeline for one corpus into one chunk table.
pub struct Ingestor {
    writer: LanceChunkWriter,
    embedder: Box<dyn Embedder>,
    extractor: EntityExtractor,
}

impl Ingestor {
    pub fn new(
        writer: LanceChunkWriter,
        embedder: Box<dyn Embedder>,
        extractor: EntityExtractor,
    ) -> Self {
        Self { writer, embedder, extractor }
    }

    /// Ingest one corpus file: page-split, per-page entity extraction,
    /// batch embedding, insert. Unchanged and empty files are skipped.
    pub async fn ingest_file(&self, path: &Path) -> Result<IngestStatus> {
        let document = load_document(path)?;
        if self.writer.document_exists(&document.file_hash).await? {
            info!(file = %path.display(), "file already ingested, skipping");
            return Ok(IngestStatus::Skipped(SkipReason::AlreadyIngested));
        }
        if document.pages.is_empty() {
            warn!(file = %path.display(), "no usable pages, skipping");
            return Ok(IngestStatus::Skipped(SkipReason::NoPages));
        }

        let chunks = self.build_chunks(&document)?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors =
            self.embedder.embed_batch(&texts).context("embedding corpus pages failed")?;
        self.writer.insert_document(&document.file_hash, &chunks, &vectors).await?;
        self.writer.stamp_ingest().await?;
        info!(file = %path.display(), chunks = chunks.len(), "ingested");
        Ok(IngestStatus::Ingested { chunks: chunks.len() })
    }

    /// Ingest every supported file under `dir`, or only `file_name` when
    /// given. Per-file errors are collected, not propagated.
    pub async fn ingest_directory(
        &self,
        dir: &Path,
        file_name: Option<&str>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let files = match file_name {
            Some(name) => {
                let path = dir.join(name);
                if !path.is_file() {
                    report
                        .failed
                        .push(FailedFile { file: name.to_string(), error: "not found".into() });
                    return Ok(report);
                }
                vec![path]
            }
            None => list_corpus_files(dir),
        };

        info!(files = files.len(), dir = %dir.display(), "starting ingest");
        for path in files {
            let file = path.display().to_string();
            match self.ingest_file(&path).await {
                Ok(IngestStatus::Ingested { chunks }) => {
                    report.ingested.push(IngestedFile { file, chunks });
                }
                Ok(IngestStatus::Skipped(reason)) => {
                    report.skipped.push(SkippedFile { file, reason });
                }
                Err(err) => {
                    warn!(file = %file, error = %err, "ingest failed");
                    report.failed.push(FailedFile { file, error: format!("{err:#}") });
                }
            }
        }
        info!(
            ingested = report.ingested.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "ingest complete"
        );
        Ok(report)
    }

    fn build_chunks(&self, document: &LoadedDocument) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::with_capacity(document.pages.len());
        for page in &document.pages {
            let entities = self.extractor.extract(&page.text).with_context(|| {
                format!("extracting entities from {} page {}", document.document_id, page.number)
            })?;
            chunks.push(Chunk {
                id: format!("{}:{}", document.document_id, page.number),
                document_id: document.document_id.clone(),
                page_number: page.number,
                text: page.text.clone(),
                distance: 0.0,
                entities,
                entity_matches: None,
                source: ChunkSource::default(),
            });
        }
        Ok(chunks)
    }
}

/// Corpus bookkeeping surfaced by the stats CLI.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusStats {
    pub total_chunks: usize,
    pub table: String,
    pub embedding_dim: Option<String>,
    pub last_ingest_at: Option<String>,
}

/// Snapshot the chunk count and ingest metadata. A database that has never
/// been ingested into reports zero chunks and no metadata.
pub async fn corpus_stats(db_path: &Path, table_name: &str) -> Result<CorpusStats> {
    let db = open_db(db_path.to_string_lossy().as_ref()).await?;
    let names = db.table_names().execute().await?;
    let total_chunks = if names.iter().any(|n| n == table_name) {
        db.open_table(table_name).execute().await?.count_rows(None).await?
    } else {
        0
    };
    let embedding_dim = get_meta(&db, "embedding_dim").await?;
    let last_ingest_at = get_meta(&db, "last_ingest_at").await?;
    Ok(CorpusStats {
        total_chunks,
        table: table_name.to_string(),
        embedding_dim,
        last_ingest_at,
    })
}
