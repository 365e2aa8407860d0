//! Extraction pipeline: tagger mentions in, normalized entity sets out.

use crate::file_number::extract_file_numbers;
use crate::normalize::clean_term;
use crate::tagger::RuleTagger;
use anyhow::Context;
use dossier_core::traits::EntityTagger;
use dossier_core::types::{EntityCategory, EntitySets, MentionLabel};

/// Owns the tagger and applies the normalization contract every consumer
/// relies on: lowercase terms, stoplist and length filtering, first-seen
/// dedup, and the independent file-number pass over the raw text.
pub struct EntityExtractor {
    tagger: Box<dyn EntityTagger>,
}

impl EntityExtractor {
    pub fn new(tagger: Box<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    pub fn with_default_rules() -> Self {
        Self::new(Box::new(RuleTagger::new()))
    }

    pub fn extract(&self, text: &str) -> anyhow::Result<EntitySets> {
        let mut sets = EntitySets::new();
        if text.trim().is_empty() {
            return Ok(sets);
        }

        let mentions = self.tagger.tag(text).context("entity tagging failed")?;
        for mention in mentions {
            match mention.label {
                MentionLabel::Person => insert_clean(&mut sets, EntityCategory::Person, &mention.text),
                MentionLabel::Location => {
                    insert_clean(&mut sets, EntityCategory::Location, &mention.text)
                }
                MentionLabel::Organization => {
                    insert_clean(&mut sets, EntityCategory::Organization, &mention.text)
                }
                MentionLabel::Date => insert_clean(&mut sets, EntityCategory::Date, &mention.text),
                MentionLabel::Other(label) => {
                    if let Some(term) = clean_term(&mention.text) {
                        sets.insert_other(&label, &term);
                    }
                }
            }
        }

        // File numbers never come from the tagger; the dedicated pattern
        // runs over the raw text.
        for id in extract_file_numbers(text) {
            sets.insert(EntityCategory::FileNumber, &id);
        }

        tracing::debug!(total = sets.total(), "extracted entities");
        Ok(sets)
    }
}

fn insert_clean(sets: &mut EntitySets, category: EntityCategory, raw: &str) {
    if let Some(term) = clean_term(raw) {
        sets.insert(category, &term);
    }
}
