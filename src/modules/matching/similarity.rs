use strsim::normalized_levenshtein;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::author::normalize_authors;
use crate::domain::{CatalogRecord, MatchQuery};

/// Lowercase, strip accents and punctuation, then sort the tokens
fn sorted_tokens(text: &str) -> String {
    let cleaned: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-order-insensitive similarity in 0..=100
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let a = sorted_tokens(a);
    let b = sorted_tokens(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (normalized_levenshtein(&a, &b) * 100.0).round() as u8
}

pub fn title_score(record: &CatalogRecord, query: &MatchQuery) -> u8 {
    token_sort_ratio(&record.title, &query.target_title)
}

/// Best score over the record's normalized authors; 0 when there are none
pub fn author_score(record: &CatalogRecord, query: &MatchQuery) -> u8 {
    normalize_authors(&record.authors)
        .iter()
        .map(|author| token_sort_ratio(author, &query.target_author))
        .max()
        .unwrap_or(0)
}

/// Both title and author must clear the threshold. A record without authors
/// never matches, even at threshold 0.
pub fn is_match(record: &CatalogRecord, query: &MatchQuery) -> bool {
    let title = title_score(record, query);
    let author = author_score(record, query);
    let matched = !record.authors.is_empty()
        && title >= query.similarity_threshold
        && author >= query.similarity_threshold;

    tracing::debug!(
        "Record {} '{}': title={} author={} threshold={} -> {}",
        record.id,
        record.title,
        title,
        author,
        query.similarity_threshold,
        if matched { "match" } else { "reject" }
    );
    matched
}

/// Matching subsequence of `records`, source order preserved
pub fn filter_matches(records: &[CatalogRecord], query: &MatchQuery) -> Vec<CatalogRecord> {
    records
        .iter()
        .filter(|record| is_match(record, query))
        .cloned()
        .collect()
}
