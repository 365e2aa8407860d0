//! Term normalization applied to every tagger mention before storage or
//! matching.

const MIN_TERM_CHARS: usize = 3;

/// Terms too generic to identify anything in a case file.
const GENERIC_TERMS: [&str; 36] = [
    "the", "and", "today", "yesterday", "tomorrow", "year", "years", "month", "months", "week",
    "weeks", "day", "days", "date", "dates", "time", "times", "page", "pages", "document",
    "documents", "file", "files", "report", "reports", "section", "sections", "company",
    "companies", "person", "people", "number", "numbers", "case", "cases", "total",
];

/// Lowercase and trim a raw mention; reject terms that are too short or on
/// the generic stoplist.
pub fn clean_term(raw: &str) -> Option<String> {
    let term = raw.trim().to_lowercase();
    if term.chars().count() < MIN_TERM_CHARS || is_generic(&term) {
        return None;
    }
    Some(term)
}

pub fn is_generic(term: &str) -> bool {
    GENERIC_TERMS.contains(&term)
}
