//! Services Layer
//!
//! The acquisition pipeline: retry controller, link resolution, downloading
//! and the orchestrator that strings them together.

pub mod acquisition;
pub mod downloader;
pub mod link_resolver;
pub mod retry_controller;

// Re-export for convenience
pub use acquisition::{AcquisitionService, summarize};
pub use downloader::{
    Downloader, check_integrity, file_name_from_disposition, file_name_from_url, unique_path,
};
pub use link_resolver::{extract_download_link, resolve_download_link};
pub use retry_controller::RetryController;
