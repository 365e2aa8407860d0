//! dossier-entities
//!
//! Entity extraction and entity-driven ranking. `extractor` turns text into
//! normalized entity sets through a pluggable tagger, `matcher` ranks stored
//! chunks by weighted entity overlap with a query.

pub mod extractor;
pub mod file_number;
pub mod matcher;
pub mod normalize;
pub mod tagger;

pub use extractor::EntityExtractor;
pub use matcher::EntityMatcher;
pub use tagger::RuleTagger;
