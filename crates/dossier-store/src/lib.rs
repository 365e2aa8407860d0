//! dossier-store
//!
//! Chunk persistence and lookup: a LanceDB-backed store plus an in-memory
//! exact-scan store behind the same `ChunkStore` trait. `writer` handles
//! ingestion, `search` serves vector queries and corpus scans.

pub mod memory;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use memory::MemoryChunkStore;
pub use search::LanceChunkStore;
pub use writer::LanceChunkWriter;
