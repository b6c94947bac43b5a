//! Query shortening retry controller
//!
//! Searches the catalog for a title and, when nothing clears the similarity
//! threshold, drops the trailing word of the query and searches again.
//! Transport and parse failures are not retried.

use crate::domain::{AcquisitionAttempt, AcquisitionError, CatalogRecord, MatchQuery, RetryOutcome};
use crate::modules::catalog::CatalogSource;
use crate::modules::matching::filter_matches;

/// States of one controller run
#[derive(Debug)]
enum RetryState {
    Searching,
    Evaluating(Vec<CatalogRecord>),
    Shortening,
    Accepted(Vec<CatalogRecord>),
    Exhausted,
}

pub struct RetryController<'a> {
    source: &'a dyn CatalogSource,
    max_attempts: u32,
    min_query_words: usize,
}

impl<'a> RetryController<'a> {
    pub fn new(source: &'a dyn CatalogSource, max_attempts: u32, min_query_words: usize) -> Self {
        Self {
            source,
            max_attempts,
            min_query_words,
        }
    }

    /// Drive the state machine to `Accepted` or `Exhausted`.
    ///
    /// Records are always scored against the original target title, never the
    /// shortened query. The first search uses the full title whatever its length;
    /// shortened queries below `min_query_words` are never issued.
    pub async fn run(&self, query: &MatchQuery) -> Result<RetryOutcome, AcquisitionError> {
        let mut attempt = AcquisitionAttempt::new(&query.target_title, self.max_attempts);
        let mut state = RetryState::Searching;

        loop {
            state = match state {
                RetryState::Searching => {
                    tracing::debug!(
                        "Attempt {}/{}: searching '{}'",
                        attempt.attempt_index,
                        attempt.max_attempts,
                        attempt.current_title_query
                    );
                    let records = self.source.search(&attempt.current_title_query).await?;
                    RetryState::Evaluating(records)
                }
                RetryState::Evaluating(records) => {
                    let matches = filter_matches(&records, query);
                    tracing::info!(
                        "Query '{}': {} of {} records match",
                        attempt.current_title_query,
                        matches.len(),
                        records.len()
                    );
                    if matches.is_empty() {
                        attempt.shorten();
                        RetryState::Shortening
                    } else {
                        RetryState::Accepted(matches)
                    }
                }
                RetryState::Shortening => {
                    if attempt.word_count() < self.min_query_words
                        || attempt.attempt_index >= attempt.max_attempts
                    {
                        RetryState::Exhausted
                    } else {
                        tracing::info!(
                            "No match, retrying with shortened title '{}'",
                            attempt.current_title_query
                        );
                        RetryState::Searching
                    }
                }
                RetryState::Accepted(records) => {
                    return Ok(RetryOutcome::Accepted { records, attempt });
                }
                RetryState::Exhausted => {
                    tracing::warn!(
                        "No match for '{}' by '{}' after {} shortening(s)",
                        query.target_title,
                        query.target_author,
                        attempt.attempt_index
                    );
                    return Ok(RetryOutcome::Exhausted { attempt });
                }
            };
        }
    }
}
