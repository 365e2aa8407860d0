//! Request/response boundary types for the retrieval engine.

use dossier_core::error::Error;
use dossier_core::types::Chunk;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of retrieval strategies, matched exhaustively by the
/// engine and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RetrievalMode {
    /// Semantic top-k plus entity top-k, deduplicated, no re-ranking.
    Simple,
    /// Both scenarios run concurrently and merge.
    Hybrid,
    /// Single-pass semantic search expanded across entity-matched
    /// documents under a per-document cap.
    DocumentExpansion,
}

impl RetrievalMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RetrievalMode::Simple => "simple",
            RetrievalMode::Hybrid => "hybrid",
            RetrievalMode::DocumentExpansion => "document-expansion",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(RetrievalMode::Simple),
            "hybrid" => Ok(RetrievalMode::Hybrid),
            "expansion" | "document-expansion" => Ok(RetrievalMode::DocumentExpansion),
            other => Err(Error::InvalidConfig(format!("unknown retrieval mode '{other}'"))),
        }
    }
}

/// Per-path result counts; the shape depends on which mode ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathCounts {
    Simple {
        semantic_count: usize,
        entity_count: usize,
    },
    Hybrid {
        scenario_1_count: usize,
        scenario_2_count: usize,
    },
    Expansion {
        semantic_count: usize,
        entity_count: usize,
        document_expansion: bool,
        matched_documents: Vec<String>,
    },
}

/// One answered retrieval request: the final ranked chunks plus the
/// counts of what each path contributed before merging.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalOutcome {
    pub query: String,
    pub total_results: usize,
    #[serde(flatten)]
    pub counts: PathCounts,
    pub chunks: Vec<Chunk>,
}
