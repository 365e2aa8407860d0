//! dossier-retrieval
//!
//! The hybrid retrieval engine: two competing scenarios (direct semantic
//! expansion and entity-first expansion), a document-expansion variant and
//! a simple dual-path mode, all answering through one `RetrievalEngine`.
//! `ingest` drives the corpus-to-store pipeline the engine reads from.

pub mod engine;
pub mod ingest;
pub mod merge;
pub mod response;
pub mod semantic;

mod scenarios;

pub use engine::RetrievalEngine;
pub use ingest::Ingestor;
pub use response::{RetrievalMode, RetrievalOutcome};
pub use semantic::SemanticSearcher;
