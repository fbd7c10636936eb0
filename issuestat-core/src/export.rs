//! Pagination and backoff driver
//!
//! Fetches pages in order, writes one row per issue edge, and paces itself:
//! a short pause between pages and a long one whenever the reported
//! rate-limit budget has run out. Runs strictly sequentially.

use std::io::Write;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::page::{FetchOutcome, Page, PageSource, RateLimit};
use crate::record::IssueRecord;
use crate::writer::RowWriter;
use crate::{Error, Result};

/// Courtesy delay between consecutive pages
pub const PAGE_PAUSE: Duration = Duration::from_secs(1);

/// Wait applied after a page reports no remaining rate-limit budget
pub const RATE_LIMIT_PAUSE: Duration = Duration::from_secs(60 * 60);

/// Why the driver stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last page reported no further pages
    Exhausted,
    /// The configured page cap was reached
    PageCap,
    /// A fetch failed; the output may be missing later pages
    FetchFailed,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages successfully processed
    pub pages: u32,
    /// Issue rows written
    pub rows: usize,
    pub stop: StopReason,
}

/// What one processed page tells the loop
struct PageProgress {
    has_next_page: bool,
    rate_limit: RateLimit,
}

/// Drives a [`PageSource`] into a [`RowWriter`]
pub struct Exporter<S, W: Write> {
    source: S,
    writer: RowWriter<W>,
    max_pages: Option<u32>,
    cursor: Option<String>,
}

impl<S: PageSource, W: Write> Exporter<S, W> {
    pub fn new(source: S, writer: RowWriter<W>) -> Self {
        Self {
            source,
            writer,
            max_pages: None,
            cursor: None,
        }
    }

    /// Stop after `max_pages` pages; `None` or 0 means no cap
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages.filter(|n| *n > 0);
        self
    }

    /// Take the source and writer back
    pub fn into_parts(self) -> (S, RowWriter<W>) {
        (self.source, self.writer)
    }

    /// Fetch and write pages until the source runs dry, the page cap is hit,
    /// or a fetch fails
    pub async fn run(&mut self) -> Result<ExportSummary> {
        let mut attempt: u32 = 0;
        let mut processed: u32 = 0;

        let stop = loop {
            attempt += 1;
            debug!(page = attempt, cursor = ?self.cursor, "Fetching data set");

            let response = match self.source.fetch_page(self.cursor.as_deref()).await {
                FetchOutcome::Page(response) => response,
                FetchOutcome::Failed => {
                    // No retry: a failed page ends the run, and later pages are lost.
                    warn!(
                        page = attempt,
                        rows = self.writer.rows(),
                        "Fetch failed, stopping; output may be truncated"
                    );
                    break StopReason::FetchFailed;
                }
            };

            let progress = match self.process_page(&response, attempt) {
                Ok(progress) => progress,
                Err(err) => {
                    // Keep the rows written before the bad edge.
                    if let Err(flush_err) = self.writer.flush() {
                        warn!(error = %flush_err, "Failed to flush rows before aborting");
                    }
                    error!(page = attempt, error = %err, "Aborting export");
                    return Err(err);
                }
            };
            processed += 1;

            info!(
                page = attempt,
                remaining = progress.rate_limit.remaining,
                "Fetch complete ({} queries remain before rate limit hit)",
                progress.rate_limit.remaining
            );

            if progress.rate_limit.is_exhausted() {
                info!(
                    pause_secs = RATE_LIMIT_PAUSE.as_secs(),
                    reset_at = %progress.rate_limit.reset_at,
                    "Rate limit hit, pausing operation for an hour"
                );
                tokio::time::sleep(RATE_LIMIT_PAUSE).await;
            }

            if !progress.has_next_page {
                break StopReason::Exhausted;
            }

            if self.max_pages.is_some_and(|cap| attempt >= cap) {
                info!(pages = attempt, "Page limit reached, stopping operation");
                break StopReason::PageCap;
            }

            tokio::time::sleep(PAGE_PAUSE).await;
        };

        self.writer.flush()?;

        Ok(ExportSummary {
            pages: processed,
            rows: self.writer.rows(),
            stop,
        })
    }

    fn process_page(&mut self, response: &Value, page: u32) -> Result<PageProgress> {
        let decoded = Page::decode(response)?;

        let next_cursor = if decoded.page_info.has_next_page {
            let end = decoded.page_info.end_cursor.clone().ok_or_else(|| {
                Error::data_shape("hasNextPage is true but endCursor is missing", response)
            })?;
            if self.cursor.as_deref() == Some(end.as_str()) {
                return Err(Error::data_shape(
                    format!("endCursor {} did not advance", end),
                    response,
                ));
            }
            Some(end)
        } else {
            None
        };

        for (index, edge) in decoded.edges.iter().enumerate() {
            let node = edge.get("node").ok_or_else(|| {
                Error::data_shape(format!("issue edge {} has no node", index), response)
            })?;
            let record = IssueRecord::from_node(node).map_err(|e| {
                Error::data_shape(format!("issue edge {}: {}", index, e), response)
            })?;
            self.writer.write_issue(&record)?;
        }
        self.writer.flush()?;

        debug!(
            page,
            issues = decoded.edges.len(),
            limit = decoded.rate_limit.limit,
            cost = decoded.rate_limit.cost,
            reset_at = %decoded.rate_limit.reset_at,
            "Processed page"
        );

        if next_cursor.is_some() {
            self.cursor = next_cursor;
        }

        Ok(PageProgress {
            has_next_page: decoded.page_info.has_next_page,
            rate_limit: decoded.rate_limit,
        })
    }
}
