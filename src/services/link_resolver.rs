use scraper::{Html, Selector};

use crate::domain::{AcquisitionError, CatalogRecord};
use crate::modules::catalog::fetch_page;

/// Text of the anchor that points at the direct file on an intermediate page
pub const DOWNLOAD_ANCHOR_LABEL: &str = "GET";

/// Find the `GET` anchor in an intermediate page and resolve its `href`
/// against `page_url`
pub fn extract_download_link(markup: &str, page_url: &str) -> Result<String, AcquisitionError> {
    let document = Html::parse_document(markup);
    let anchor_sel = Selector::parse("a[href]")
        .map_err(|e| AcquisitionError::MalformedResponse(format!("Bad selector: {:?}", e)))?;

    let href = document
        .select(&anchor_sel)
        .find(|a| a.text().collect::<String>().trim() == DOWNLOAD_ANCHOR_LABEL)
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .ok_or(AcquisitionError::NoDownloadLink)?;

    match url::Url::parse(page_url).and_then(|base| base.join(href)) {
        Ok(resolved) => Ok(resolved.to_string()),
        Err(_) => Ok(href.to_string()),
    }
}

/// Fetch a record's intermediate page and return the direct download URL
pub async fn resolve_download_link(
    client: &reqwest::Client,
    record: &CatalogRecord,
) -> Result<String, AcquisitionError> {
    if !record.has_link() {
        tracing::warn!("Record {} '{}' has no mirror link", record.id, record.title);
        return Err(AcquisitionError::NoDownloadLink);
    }

    tracing::info!("Retrieving download link for '{}'", record.title);
    let body = fetch_page(client, &record.source_link).await?;
    let link = extract_download_link(&body, &record.source_link)?;
    tracing::debug!("Record {} resolves to {}", record.id, link);
    Ok(link)
}
