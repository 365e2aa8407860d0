//! Case-file identifier extraction.
//!
//! File numbers look like `ABC1-12345-XY`: three to four alphanumerics, a
//! dash, five to seven digits, a dash, two to four letters. They are pulled
//! straight from the raw text, independently of the tagger.

use regex::Regex;
use std::sync::LazyLock;

static FILE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9]{3,4}-[0-9]{5,7}-[A-Za-z]{2,4}\b").unwrap());

/// All file numbers in `text`, lowercased, first-seen order, deduped.
pub fn extract_file_numbers(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for m in FILE_NUMBER.find_iter(text) {
        let id = m.as_str().to_lowercase();
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
