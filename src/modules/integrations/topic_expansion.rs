//! Topic to book list expansion through an OpenAI-compatible chat endpoint
//!
//! The model answers with free text, one "Title <separator> Author" per line.
//! Only the parsed (title, author) pairs leave this module.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::language::{Language, detect_language};
use crate::config::Config;
use crate::domain::{AcquisitionError, BookRequest};

/// Anything that turns a prompt into free text
#[async_trait]
pub trait TopicExpander: Send + Sync {
    async fn expand(&self, prompt: &str) -> Result<String, AcquisitionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiExpander {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiExpander {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Build from configuration; fails when no API key is set
    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self, AcquisitionError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or_else(|| AcquisitionError::Config("OPENAI_API_KEY is not set".to_string()))?;
        Ok(Self::new(
            client,
            &config.openai_base_url,
            api_key,
            &config.openai_model,
        ))
    }
}

#[async_trait]
impl TopicExpander for OpenAiExpander {
    async fn expand(&self, prompt: &str) -> Result<String, AcquisitionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AcquisitionError::External(format!("Chat request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AcquisitionError::External(format!(
                "Chat API returned error status: {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AcquisitionError::External(format!("Failed to parse chat response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AcquisitionError::External("Chat response had no content".to_string()))
    }
}

/// Localized request for `count` books about `topic`
pub fn build_prompt(topic: &str, count: usize, language: Language) -> String {
    match language {
        Language::English => format!(
            "List {count} essential books about \"{topic}\". Answer with one book per line in the format: Title by Author. No numbering, no commentary."
        ),
        Language::Spanish => format!(
            "Enumera {count} libros esenciales sobre \"{topic}\". Responde con un libro por línea con el formato: Título por Autor. Sin numeración ni comentarios."
        ),
        Language::French => format!(
            "Liste {count} livres essentiels sur « {topic} ». Réponds avec un livre par ligne au format : Titre par Auteur. Sans numérotation ni commentaire."
        ),
        Language::German => format!(
            "Nenne {count} wichtige Bücher über \"{topic}\". Antworte mit einem Buch pro Zeile im Format: Titel von Autor. Keine Nummerierung, keine Kommentare."
        ),
        Language::Italian => format!(
            "Elenca {count} libri fondamentali su \"{topic}\". Rispondi con un libro per riga nel formato: Titolo da Autore. Senza numerazione né commenti."
        ),
    }
}

static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s*").expect("list marker pattern"));

const WRAPPING: &[char] = &['"', '\'', '*', '_', '“', '”', '«', '»', ' '];

/// Parse "Title <separator> Author" lines, splitting on the last separator.
/// Lines without a separator or with a blank side are dropped.
pub fn parse_book_list(text: &str, separator: &str) -> Vec<BookRequest> {
    let Ok(sep_re) = Regex::new(&format!(r"(?i)\s+{}\s+", regex::escape(separator))) else {
        return Vec::new();
    };

    text.lines()
        .filter_map(|line| {
            let line = LIST_MARKER.replace(line, "");
            let split = sep_re.find_iter(&line).last()?;
            let title = line[..split.start()].trim_matches(WRAPPING);
            let author = line[split.end()..].trim_matches(WRAPPING).trim_end_matches('.');
            let request = BookRequest::new(title, author);
            if request.is_none() {
                tracing::debug!("Discarding malformed book line: {}", line);
            }
            request
        })
        .collect()
}

/// Ask the expander for books on `topic` and parse its answer
pub async fn expand_topic(
    expander: &dyn TopicExpander,
    topic: &str,
    count: usize,
) -> Result<Vec<BookRequest>, AcquisitionError> {
    let language = detect_language(topic);
    let prompt = build_prompt(topic, count, language);
    tracing::info!("Expanding topic '{}' ({:?})", topic, language);

    let text = expander.expand(&prompt).await?;
    let books = parse_book_list(&text, language.separator());
    tracing::info!("Topic '{}' expanded to {} books", topic, books.len());
    Ok(books)
}
