pub mod config;
pub mod domain;
pub mod modules;
pub mod services;
pub mod utils;

pub use config::Config;
pub use domain::{AcquisitionError, BookReport, BookRequest, CatalogRecord, DownloadOutcome};
pub use services::AcquisitionService;
