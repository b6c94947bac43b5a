/// Fixed search options: simple view, phrase search, title column, 100 results per page
const SEARCH_OPTIONS: &str = "&open=0&res=100&view=simple&phrase=1&column=title";

/// Build the catalog search URL for a title.
///
/// Spaces become `+`; nothing else is re-escaped. The same construction is
/// applied to every shortened query so each retry encodes identically.
pub fn build_search_url(base_url: &str, title: &str) -> String {
    let encoded_title = title.replace(' ', "+");
    let url = format!(
        "{}/search.php?req={}{}",
        base_url.trim_end_matches('/'),
        encoded_title,
        SEARCH_OPTIONS
    );
    tracing::debug!("Built search URL: {}", url);
    url
}
