//! Domain error types
//!
//! Every failure of one acquisition step maps onto one of these variants.
//! None of them is fatal to a batch: the orchestrator logs and moves on.

use std::fmt;

#[derive(Debug)]
pub enum AcquisitionError {
    /// Connection failure, timeout, redirect loop or non-success HTTP status
    Transport(String),
    /// Expected table or anchor structure absent from a page
    MalformedResponse(String),
    /// Intermediate page has no `GET` anchor (or the record had no link at all)
    NoDownloadLink,
    /// No record cleared the similarity threshold after all shortening attempts
    NoMatch { last_query: String },
    /// Local filesystem failure while writing a download
    Io(String),
    /// Invalid or missing configuration value
    Config(String),
    /// Topic expansion collaborator failure
    External(String),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AcquisitionError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            AcquisitionError::NoDownloadLink => write!(f, "No download link found"),
            AcquisitionError::NoMatch { last_query } => {
                write!(f, "No matching record (last query: '{}')", last_query)
            }
            AcquisitionError::Io(msg) => write!(f, "I/O error: {}", msg),
            AcquisitionError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AcquisitionError::External(msg) => write!(f, "External service error: {}", msg),
        }
    }
}

impl std::error::Error for AcquisitionError {}

impl From<reqwest::Error> for AcquisitionError {
    fn from(e: reqwest::Error) -> Self {
        AcquisitionError::Transport(e.to_string())
    }
}

impl From<std::io::Error> for AcquisitionError {
    fn from(e: std::io::Error) -> Self {
        AcquisitionError::Io(e.to_string())
    }
}

impl AcquisitionError {
    /// Short machine-friendly label used in the run summary
    pub fn kind(&self) -> &'static str {
        match self {
            AcquisitionError::Transport(_) => "TransportError",
            AcquisitionError::MalformedResponse(_) => "MalformedResponse",
            AcquisitionError::NoDownloadLink => "NoDownloadLink",
            AcquisitionError::NoMatch { .. } => "NoMatch",
            AcquisitionError::Io(_) => "IoError",
            AcquisitionError::Config(_) => "ConfigError",
            AcquisitionError::External(_) => "ExternalError",
        }
    }
}
