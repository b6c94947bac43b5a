//! Prompt language detection
//!
//! Picks the language whose stop-word list covers the most tokens of the
//! prompt. Only used to localize the topic expansion prompt and the
//! "Title <separator> Author" token.

use once_cell::sync::Lazy;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
    ];

    /// Word placed between title and author in generated book lists
    pub fn separator(&self) -> &'static str {
        match self {
            Language::English => "by",
            Language::Spanish => "por",
            Language::French => "par",
            Language::German => "von",
            Language::Italian => "da",
        }
    }

    fn stop_words_language(&self) -> stop_words::LANGUAGE {
        match self {
            Language::English => stop_words::LANGUAGE::English,
            Language::Spanish => stop_words::LANGUAGE::Spanish,
            Language::French => stop_words::LANGUAGE::French,
            Language::German => stop_words::LANGUAGE::German,
            Language::Italian => stop_words::LANGUAGE::Italian,
        }
    }
}

static STOP_WORDS: Lazy<Vec<(Language, HashSet<String>)>> = Lazy::new(|| {
    Language::ALL
        .iter()
        .map(|lang| {
            let words: HashSet<String> = stop_words::get(lang.stop_words_language())
                .iter()
                .map(|w| w.to_string().to_lowercase())
                .collect();
            (*lang, words)
        })
        .collect()
});

/// Detect the prompt language; English when nothing stands out
pub fn detect_language(text: &str) -> Language {
    let tokens: Vec<String> = text
        .split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect();

    let mut best = Language::English;
    let mut best_hits = 0;
    for (lang, words) in STOP_WORDS.iter() {
        let hits = tokens.iter().filter(|t| words.contains(t.as_str())).count();
        if hits > best_hits {
            best = *lang;
            best_hits = hits;
        }
    }

    tracing::debug!("Detected prompt language {:?} ({} stop words)", best, best_hits);
    best
}
