use async_trait::async_trait;

use super::parser::parse_results;
use super::query::build_search_url;
use crate::domain::{AcquisitionError, CatalogRecord};

/// Anything that can answer a title search with parsed catalog records
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Run one search for `title_query`
    async fn search(&self, title_query: &str) -> Result<Vec<CatalogRecord>, AcquisitionError>;
}

/// Catalog search over HTTP against the tabular results page
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// GET a page and return its body, mapping any failure to a transport error
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String, AcquisitionError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AcquisitionError::Transport(format!("Request to {} failed: {}", url, e)))?;

    if !response.status().is_success() {
        return Err(AcquisitionError::Transport(format!(
            "{} returned status: {}",
            url,
            response.status()
        )));
    }

    response
        .text()
        .await
        .map_err(|e| AcquisitionError::Transport(format!("Failed to read response body: {}", e)))
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn search(&self, title_query: &str) -> Result<Vec<CatalogRecord>, AcquisitionError> {
        let url = build_search_url(&self.base_url, title_query);
        tracing::info!("Searching catalog for '{}'", title_query);

        let body = fetch_page(&self.client, &url).await?;
        parse_results(&body)
    }
}
