//! Domain types shared by the extraction, store and retrieval crates.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub type ChunkId = String;

/// The six entity categories carried on every chunk.
///
/// `ALL` lists them in matcher priority order: file numbers are checked
/// first and outweigh everything else, the free-text categories follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    FileNumber,
    Person,
    Location,
    Organization,
    Date,
    Other,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 6] = [
        EntityCategory::FileNumber,
        EntityCategory::Person,
        EntityCategory::Location,
        EntityCategory::Organization,
        EntityCategory::Date,
        EntityCategory::Other,
    ];

    /// Weight a single hit in this category adds to a chunk's match count.
    pub fn weight(self) -> u32 {
        match self {
            EntityCategory::FileNumber => 10,
            _ => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityCategory::FileNumber => "file_number",
            EntityCategory::Person => "person",
            EntityCategory::Location => "location",
            EntityCategory::Organization => "organization",
            EntityCategory::Date => "date",
            EntityCategory::Other => "other",
        }
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Six ordered sets of entity terms attached to a chunk or built from a query.
///
/// Terms are lowercase, unique within their set and keep first-seen order;
/// `insert` enforces all three. `other` terms keep the label the tagger
/// assigned as a `label:text` prefix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySets {
    #[serde(default)]
    pub person_names: Vec<String>,
    #[serde(default)]
    pub location_names: Vec<String>,
    #[serde(default)]
    pub organization_names: Vec<String>,
    #[serde(default)]
    pub date_entities: Vec<String>,
    #[serde(default)]
    pub file_numbers: Vec<String>,
    #[serde(default)]
    pub other_entities: Vec<String>,
}

/// Entities extracted from a query string; built per request, never persisted.
pub type QueryEntities = EntitySets;

impl EntitySets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a term after lowercase/trim normalization. Duplicates are
    /// dropped, first-seen order is kept.
    pub fn insert(&mut self, category: EntityCategory, term: &str) {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return;
        }
        let set = self.terms_mut(category);
        if !set.iter().any(|t| t == &term) {
            set.push(term);
        }
    }

    /// Insert an `other` term carrying its original tagger label.
    pub fn insert_other(&mut self, label: &str, term: &str) {
        let label = label.trim();
        let term = term.trim();
        if label.is_empty() || term.is_empty() {
            return;
        }
        let combined = format!("{label}:{term}");
        self.insert(EntityCategory::Other, &combined);
    }

    pub fn terms(&self, category: EntityCategory) -> &[String] {
        match category {
            EntityCategory::Person => &self.person_names,
            EntityCategory::Location => &self.location_names,
            EntityCategory::Organization => &self.organization_names,
            EntityCategory::Date => &self.date_entities,
            EntityCategory::FileNumber => &self.file_numbers,
            EntityCategory::Other => &self.other_entities,
        }
    }

    fn terms_mut(&mut self, category: EntityCategory) -> &mut Vec<String> {
        match category {
            EntityCategory::Person => &mut self.person_names,
            EntityCategory::Location => &mut self.location_names,
            EntityCategory::Organization => &mut self.organization_names,
            EntityCategory::Date => &mut self.date_entities,
            EntityCategory::FileNumber => &mut self.file_numbers,
            EntityCategory::Other => &mut self.other_entities,
        }
    }

    pub fn is_empty(&self) -> bool {
        EntityCategory::ALL.iter().all(|c| self.terms(*c).is_empty())
    }

    pub fn total(&self) -> usize {
        EntityCategory::ALL.iter().map(|c| self.terms(*c).len()).sum()
    }

    /// Strict decode of the six stored JSON columns. Fails on the first
    /// malformed field, naming it.
    pub fn from_json_fields(
        person_names: &str,
        location_names: &str,
        organization_names: &str,
        date_entities: &str,
        file_numbers: &str,
        other_entities: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            person_names: decode_field("person_names", person_names)?,
            location_names: decode_field("location_names", location_names)?,
            organization_names: decode_field("organization_names", organization_names)?,
            date_entities: decode_field("date_entities", date_entities)?,
            file_numbers: decode_field("file_numbers", file_numbers)?,
            other_entities: decode_field("other_entities", other_entities)?,
        })
    }

    /// Lenient decode used at the store read boundary: a malformed field
    /// becomes an empty set and is logged, intact fields survive.
    pub fn from_json_fields_lenient(
        person_names: &str,
        location_names: &str,
        organization_names: &str,
        date_entities: &str,
        file_numbers: &str,
        other_entities: &str,
    ) -> Self {
        let lenient = |field: &'static str, raw: &str| match decode_field(field, raw) {
            Ok(terms) => terms,
            Err(err) => {
                tracing::warn!(field, error = %err, "dropping malformed stored entity field");
                Vec::new()
            }
        };
        Self {
            person_names: lenient("person_names", person_names),
            location_names: lenient("location_names", location_names),
            organization_names: lenient("organization_names", organization_names),
            date_entities: lenient("date_entities", date_entities),
            file_numbers: lenient("file_numbers", file_numbers),
            other_entities: lenient("other_entities", other_entities),
        }
    }
}

fn decode_field(field: &'static str, raw: &str) -> Result<Vec<String>, Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let terms: Vec<String> =
        serde_json::from_str(raw).map_err(|source| Error::Decode { field, source })?;
    Ok(normalize_terms(terms))
}

fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_lowercase();
        if term.is_empty() || out.iter().any(|t| t == &term) {
            continue;
        }
        out.push(term);
    }
    out
}

/// Labels which retrieval path selected a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkSource {
    #[default]
    #[serde(rename = "semantic")]
    Semantic,
    #[serde(rename = "entity")]
    Entity,
    #[serde(rename = "scenario-1")]
    Scenario1,
    #[serde(rename = "scenario-2-entity")]
    Scenario2Entity,
    #[serde(rename = "scenario-2-document")]
    Scenario2Document,
    #[serde(rename = "document-expansion")]
    DocumentExpansion,
}

impl ChunkSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ChunkSource::Semantic => "semantic",
            ChunkSource::Entity => "entity",
            ChunkSource::Scenario1 => "scenario-1",
            ChunkSource::Scenario2Entity => "scenario-2-entity",
            ChunkSource::Scenario2Document => "scenario-2-document",
            ChunkSource::DocumentExpansion => "document-expansion",
        }
    }
}

impl fmt::Display for ChunkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A page-sized chunk of a source document plus its retrieval annotations.
///
/// - `id`: `"{document_id}:{page_number}"`, assigned at ingestion
/// - `distance`: vector distance to the query, lower is closer. Chunks
///   selected purely by entity match carry a synthetic `0.0`.
/// - `entity_matches`: weighted entity match count, present only on chunks
///   that went through the entity matcher
/// - `source`: which retrieval path selected the chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub document_id: String,
    pub page_number: u32,
    pub text: String,
    pub distance: f32,
    #[serde(flatten)]
    pub entities: EntitySets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_matches: Option<u32>,
    #[serde(default)]
    pub source: ChunkSource,
}

/// A raw labeled span produced by an entity tagger, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Mention {
    pub text: String,
    pub label: MentionLabel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MentionLabel {
    Person,
    Location,
    Organization,
    Date,
    /// Anything else the tagger recognizes, keeping its label (e.g. "money").
    Other(String),
}

/// An ordered set of document ids a vector search is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentFilter {
    ids: BTreeSet<String>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the distinct document ids of `chunks`.
    pub fn from_chunks(chunks: &[Chunk]) -> Self {
        chunks.iter().map(|c| c.document_id.clone()).collect()
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }
}

impl FromIterator<String> for DocumentFilter {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self { ids: iter.into_iter().collect() }
    }
}
