//! Catalog search: URL construction, results-page parsing and the HTTP source

pub mod client;
pub mod parser;
pub mod query;

pub use client::{CatalogSource, HttpCatalog, fetch_page};
pub use parser::parse_results;
pub use query::build_search_url;
