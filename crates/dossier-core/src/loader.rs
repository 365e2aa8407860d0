//! Corpus file loading: page-marker splitting and content hashing.
//!
//! Markdown exports carry `<!-- Page N -->` markers from the upstream PDF
//! conversion; files without markers load as a single page 1.

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s*[Pp]age\s+(\d+)\s*-->").unwrap());

const CORPUS_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// One page of a source document. `number` comes from the page marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// A corpus file split into pages, with a content hash for ingest dedup.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document_id: String,
    pub path: PathBuf,
    pub file_hash: String,
    pub pages: Vec<PageText>,
}

/// List supported corpus files under `root`, recursively, sorted by path.
pub fn list_corpus_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| CORPUS_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if supported {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

/// Read and split one corpus file. Pages that are empty after trimming are
/// dropped, so a blank file yields zero pages.
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read corpus file {}", path.display()))?;
    let file_hash = blake3::hash(&bytes).to_hex().to_string();
    let content = String::from_utf8_lossy(&bytes);
    let document_id = document_id_for(path);
    let pages = split_pages(&content);
    Ok(LoadedDocument { document_id, path: path.to_path_buf(), file_hash, pages })
}

fn document_id_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Split on page markers. Text before the first marker is preamble emitted
/// by the converter and is dropped; no markers means one page 1.
pub fn split_pages(content: &str) -> Vec<PageText> {
    let markers: Vec<_> = PAGE_MARKER.captures_iter(content).collect();
    if markers.is_empty() {
        let text = content.trim();
        if text.is_empty() {
            return Vec::new();
        }
        return vec![PageText { number: 1, text: text.to_string() }];
    }

    let mut pages = Vec::with_capacity(markers.len());
    for (i, caps) in markers.iter().enumerate() {
        let Some(whole) = caps.get(0) else { continue };
        let Some(number) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        let start = whole.end();
        let end = markers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(content.len());
        let text = content[start..end].trim();
        if text.is_empty() {
            continue;
        }
        pages.push(PageText { number, text: text.to_string() });
    }
    pages
}
