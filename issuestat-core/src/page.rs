//! Raw issue pages and the seam the driver fetches them through

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{Error, Result};

/// Result of asking for one page
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Decoded JSON body of a successful response, not yet validated
    Page(Value),
    /// Transport failure, timeout or non-success status. Treated by the
    /// driver as an empty page with no next page.
    Failed,
}

/// Anything that can produce pages of the issue query
#[async_trait]
pub trait PageSource: Send {
    /// Fetch the page after `cursor` (`None` for the first page)
    async fn fetch_page(&mut self, cursor: Option<&str>) -> FetchOutcome;
}

/// Pagination block of the issue connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// Rate-limit status reported with every page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimit {
    pub limit: i64,
    pub cost: i64,
    pub remaining: i64,
    pub reset_at: DateTime<Utc>,
}

impl RateLimit {
    pub fn is_exhausted(&self) -> bool {
        self.remaining <= 0
    }
}

/// A validated view over one raw page response
#[derive(Debug)]
pub struct Page<'a> {
    pub edges: &'a [Value],
    pub page_info: PageInfo,
    pub rate_limit: RateLimit,
}

impl<'a> Page<'a> {
    /// Pull the pagination, rate-limit and edge blocks out of a response
    pub fn decode(response: &'a Value) -> Result<Self> {
        log_graphql_errors(response);

        let edges = field(response, &["data", "repository", "issues", "edges"])?
            .as_array()
            .ok_or_else(|| Error::data_shape("issues.edges is not a list", response))?;

        let page_info =
            PageInfo::deserialize(field(response, &["data", "repository", "issues", "pageInfo"])?)
                .map_err(|e| Error::data_shape(format!("pageInfo: {}", e), response))?;

        let rate_limit = RateLimit::deserialize(field(response, &["data", "rateLimit"])?)
            .map_err(|e| Error::data_shape(format!("rateLimit: {}", e), response))?;

        Ok(Self {
            edges,
            page_info,
            rate_limit,
        })
    }
}

/// Walk `path` from the root of the response; errors carry the whole response
fn field<'a>(root: &'a Value, path: &[&str]) -> Result<&'a Value> {
    let mut current = root;
    for (depth, key) in path.iter().enumerate() {
        current = current
            .get(key)
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                Error::data_shape(format!("missing field {}", path[..=depth].join(".")), root)
            })?;
    }
    Ok(current)
}

fn log_graphql_errors(response: &Value) {
    if let Some(errors) = response.get("errors").and_then(Value::as_array) {
        for error in errors {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("(no message)");
            warn!(error = message, "GraphQL error in response");
        }
    }
}
