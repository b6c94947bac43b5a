//! Domain models for one acquisition run
//!
//! All of these live for a single run only; nothing is persisted.

use std::path::PathBuf;

use super::AcquisitionError;

/// Sentinel stored in `CatalogRecord::source_link` when the row carries no anchor
pub const NO_LINK: &str = "No link";

/// One row of catalog search results
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    pub id: String,
    pub authors: Vec<String>,
    pub title: String,
    pub publisher: String,
    pub year: String,
    pub pages: String,
    pub language: String,
    pub size: String,
    pub format: String,
    pub source_link: String,
}

impl CatalogRecord {
    pub fn has_link(&self) -> bool {
        self.source_link != NO_LINK && !self.source_link.is_empty()
    }
}

/// Target used for similarity scoring
#[derive(Debug, Clone)]
pub struct MatchQuery {
    pub target_title: String,
    pub target_author: String,
    pub similarity_threshold: u8,
}

impl MatchQuery {
    pub fn new(target_title: &str, target_author: &str, similarity_threshold: u8) -> Self {
        Self {
            target_title: target_title.to_string(),
            target_author: target_author.to_string(),
            similarity_threshold: similarity_threshold.min(100),
        }
    }
}

/// State of one retry iteration
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionAttempt {
    pub current_title_query: String,
    pub attempt_index: u32,
    pub max_attempts: u32,
}

impl AcquisitionAttempt {
    pub fn new(title: &str, max_attempts: u32) -> Self {
        Self {
            current_title_query: title.split_whitespace().collect::<Vec<_>>().join(" "),
            attempt_index: 0,
            max_attempts,
        }
    }

    pub fn word_count(&self) -> usize {
        self.current_title_query.split_whitespace().count()
    }

    /// Drop the trailing word and bump the attempt counter
    pub fn shorten(&mut self) {
        let mut words: Vec<&str> = self.current_title_query.split_whitespace().collect();
        words.pop();
        self.current_title_query = words.join(" ");
        self.attempt_index += 1;
    }
}

/// Byte-count verification result of a finished download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    /// Declared length present and matched
    Verified,
    /// No content-length header; success is provisional
    Unverified,
    /// Declared and received byte counts differ; the partial file is kept
    Mismatch { expected: u64, written: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadOutcome {
    pub file_path: PathBuf,
    pub bytes_expected: u64,
    pub bytes_written: u64,
    pub integrity: Integrity,
}

impl DownloadOutcome {
    pub fn is_integrity_mismatch(&self) -> bool {
        matches!(self.integrity, Integrity::Mismatch { .. })
    }
}

/// A (title, author) pair handed to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
}

impl BookRequest {
    /// Returns `None` when either side is blank after trimming
    pub fn new(title: &str, author: &str) -> Option<Self> {
        let title = title.trim();
        let author = author.trim();
        if title.is_empty() || author.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            author: author.to_string(),
        })
    }
}

/// Terminal state of the query shortening retry controller
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome {
    Accepted {
        records: Vec<CatalogRecord>,
        attempt: AcquisitionAttempt,
    },
    Exhausted {
        attempt: AcquisitionAttempt,
    },
}

/// Result of processing one accepted record
#[derive(Debug)]
pub struct RecordDownload {
    pub record: CatalogRecord,
    pub result: Result<DownloadOutcome, AcquisitionError>,
}

/// Everything the orchestrator learned about one book
#[derive(Debug)]
pub struct BookReport {
    pub request: BookRequest,
    pub outcome: Result<RetryOutcome, AcquisitionError>,
    pub downloads: Vec<RecordDownload>,
}

impl BookReport {
    pub fn downloaded_count(&self) -> usize {
        self.downloads.iter().filter(|d| d.result.is_ok()).count()
    }
}
