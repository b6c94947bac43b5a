//! Fuzzy matching of catalog records against a (title, author) target

pub mod author;
pub mod similarity;

pub use author::{normalize_author, normalize_authors};
pub use similarity::{author_score, filter_matches, is_match, title_score, token_sort_ratio};
