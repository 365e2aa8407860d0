//! Rule-based default tagger.
//!
//! A lightweight pattern tagger standing in for a model-backed NER service;
//! anything smarter plugs in through the same `EntityTagger` trait. Output
//! is raw mentions, the extraction pipeline normalizes and dedups.

use dossier_core::traits::EntityTagger;
use dossier_core::types::{Mention, MentionLabel};
use regex::Regex;
use std::sync::LazyLock;

static DATE_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.?\s+(?:\d{1,2}(?:st|nd|rd|th)?,?\s+)?\d{4}\b",
    )
    .unwrap()
});

static DATE_ISO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());

static DATE_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,2}/\d{1,2}/\d{2,4}\b").unwrap());

static MONEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\$\s?\d[\d,]*(?:\.\d+)?(?:\s?(?:million|billion|thousand|mm|bn|[mk]))?")
        .unwrap()
});

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)?\s?%").unwrap());

static ORG_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:[A-Z][A-Za-z&'-]*\s+){0,4}[A-Z][A-Za-z&'-]*,?\s+(?:Inc|Incorporated|LLC|Ltd|Limited|Corp|Corporation|Co|Company|Group|Holdings|Partners|Bank|Trust)\b\.?",
    )
    .unwrap()
});

static ORG_ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][A-Z&]{2,5}\b").unwrap());

static PERSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:Mr|Mrs|Ms|Dr|Prof|Judge|Justice|Officer|Detective|Agent)\.?\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b",
    )
    .unwrap()
});

static LOCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:in|at|near|from)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b").unwrap()
});

/// Capitalized spans that follow a location preposition but are calendar
/// words, not places.
const NOT_LOCATIONS: [&str; 19] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Default)]
pub struct RuleTagger;

impl RuleTagger {
    pub fn new() -> Self {
        Self
    }
}

impl EntityTagger for RuleTagger {
    fn tag(&self, text: &str) -> anyhow::Result<Vec<Mention>> {
        let mut mentions = Vec::new();

        for caps in PERSON.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                mentions.push(Mention {
                    text: name.as_str().to_string(),
                    label: MentionLabel::Person,
                });
            }
        }

        for caps in LOCATION.captures_iter(text) {
            let Some(place) = caps.get(1) else { continue };
            let first_word =
                place.as_str().split_whitespace().next().unwrap_or_default().to_lowercase();
            if NOT_LOCATIONS.contains(&first_word.as_str()) {
                continue;
            }
            mentions.push(Mention {
                text: place.as_str().to_string(),
                label: MentionLabel::Location,
            });
        }

        for m in ORG_SUFFIX.find_iter(text) {
            mentions.push(Mention {
                text: m.as_str().trim_end_matches('.').replace(',', ""),
                label: MentionLabel::Organization,
            });
        }
        for m in ORG_ACRONYM.find_iter(text) {
            mentions
                .push(Mention { text: m.as_str().to_string(), label: MentionLabel::Organization });
        }

        for re in [&DATE_MONTH, &DATE_ISO, &DATE_NUMERIC] {
            for m in re.find_iter(text) {
                mentions.push(Mention { text: m.as_str().to_string(), label: MentionLabel::Date });
            }
        }

        for m in MONEY.find_iter(text) {
            mentions.push(Mention {
                text: m.as_str().to_string(),
                label: MentionLabel::Other("money".to_string()),
            });
        }
        for m in PERCENT.find_iter(text) {
            mentions.push(Mention {
                text: m.as_str().to_string(),
                label: MentionLabel::Other("percent".to_string()),
            });
        }

        Ok(mentions)
    }
}
