//! Acquisition orchestrator
//!
//! For each (title, author) pair: search with title shortening, resolve every
//! accepted record's intermediate page, download. A failure is recorded in the
//! pair's `BookReport` and the batch moves on.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::downloader::Downloader;
use super::link_resolver::resolve_download_link;
use super::retry_controller::RetryController;
use crate::config::Config;
use crate::domain::{
    AcquisitionError, BookReport, BookRequest, CatalogRecord, DownloadOutcome, Integrity,
    MatchQuery, RecordDownload, RetryOutcome,
};
use crate::modules::catalog::{CatalogSource, HttpCatalog};
use crate::utils::{NoProgress, ProgressReporter, sanitize_dir_name};

pub struct AcquisitionService {
    config: Config,
    client: reqwest::Client,
    catalog: Box<dyn CatalogSource>,
    downloader: Downloader,
    progress: fn() -> Box<dyn ProgressReporter>,
}

fn no_progress() -> Box<dyn ProgressReporter> {
    Box::new(NoProgress)
}

impl AcquisitionService {
    /// Build the service against the configured catalog over HTTP
    pub fn new(config: Config) -> Result<Self, AcquisitionError> {
        let client = config
            .http_client()
            .map_err(|e| AcquisitionError::Config(format!("Failed to create HTTP client: {}", e)))?;
        let catalog = Box::new(HttpCatalog::new(client.clone(), &config.base_url));
        Ok(Self::with_catalog(config, client, catalog))
    }

    pub fn with_catalog(
        config: Config,
        client: reqwest::Client,
        catalog: Box<dyn CatalogSource>,
    ) -> Self {
        Self {
            downloader: Downloader::new(client.clone()),
            config,
            client,
            catalog,
            progress: no_progress,
        }
    }

    /// Report each download through a fresh reporter from `factory`
    pub fn with_progress(mut self, factory: fn() -> Box<dyn ProgressReporter>) -> Self {
        self.progress = factory;
        self
    }

    /// Process one pair, downloading into `directory`
    pub async fn acquire_book(&self, request: &BookRequest, directory: &Path) -> BookReport {
        tracing::info!(
            "Acquiring '{}' by '{}' into {}",
            request.title,
            request.author,
            directory.display()
        );

        let query = MatchQuery::new(
            &request.title,
            &request.author,
            self.config.similarity_threshold,
        );
        let controller = RetryController::new(
            self.catalog.as_ref(),
            self.config.max_attempts,
            self.config.min_query_words,
        );

        let outcome = controller.run(&query).await;
        let mut downloads = Vec::new();

        match &outcome {
            Ok(RetryOutcome::Accepted { records, .. }) => {
                for record in records {
                    let result = self.download_record(record, directory).await;
                    if let Err(e) = &result {
                        tracing::warn!("Record {} '{}' not downloaded: {}", record.id, record.title, e);
                    }
                    downloads.push(RecordDownload {
                        record: record.clone(),
                        result,
                    });
                }
            }
            Ok(RetryOutcome::Exhausted { .. }) => {
                tracing::info!("Skipping '{}': no matching record", request.title);
            }
            Err(e) => {
                tracing::error!("Search for '{}' failed: {}", request.title, e);
            }
        }

        BookReport {
            request: request.clone(),
            outcome,
            downloads,
        }
    }

    async fn download_record(
        &self,
        record: &CatalogRecord,
        directory: &Path,
    ) -> Result<DownloadOutcome, AcquisitionError> {
        let link = resolve_download_link(&self.client, record).await?;
        let mut progress = (self.progress)();
        self.downloader
            .download(&link, directory, progress.as_mut())
            .await
    }

    /// Process every pair in order. Each book gets its own sanitized directory
    /// under `parent` (or under the configured output directory).
    pub async fn acquire_all(
        &self,
        requests: &[BookRequest],
        parent: Option<&Path>,
    ) -> Vec<BookReport> {
        let parent: PathBuf = parent
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.output_dir.clone());

        let mut reports = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            tracing::info!("Book {}/{}", index + 1, requests.len());
            let directory = parent.join(sanitize_dir_name(&request.title));
            reports.push(self.acquire_book(request, &directory).await);
        }
        reports
    }
}

/// Human-readable run summary, one block per book
pub fn summarize(reports: &[BookReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = write!(out, "{} | {} | ", report.request.title, report.request.author);
        match &report.outcome {
            Ok(RetryOutcome::Accepted { records, attempt }) => {
                let _ = writeln!(
                    out,
                    "{} match(es) via '{}', {} downloaded",
                    records.len(),
                    attempt.current_title_query,
                    report.downloaded_count()
                );
            }
            Ok(RetryOutcome::Exhausted { attempt }) => {
                let err = AcquisitionError::NoMatch {
                    last_query: attempt.current_title_query.clone(),
                };
                let _ = writeln!(out, "{}: {}", err.kind(), err);
            }
            Err(e) => {
                let _ = writeln!(out, "{}: {}", e.kind(), e);
            }
        }

        for download in &report.downloads {
            let record = &download.record;
            let _ = write!(
                out,
                "    [{}] {} ({}, {}, {}) -> ",
                record.id, record.title, record.year, record.format, record.size
            );
            let _ = match &download.result {
                Ok(o) => match o.integrity {
                    Integrity::Mismatch { expected, written } => writeln!(
                        out,
                        "{} (IntegrityMismatch: {} of {} bytes)",
                        o.file_path.display(),
                        written,
                        expected
                    ),
                    _ => writeln!(out, "{}", o.file_path.display()),
                },
                Err(e) => writeln!(out, "{}", e.kind()),
            };
        }
    }
    out
}
