//! GitHub GraphQL client over reqwest

use issuestat_core::{FetchOutcome, GitHubConfig};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::graphql::{GraphQLResponse, TotalCountData, ISSUES_PAGE_QUERY, ISSUES_TOTAL_QUERY};
use crate::{Error, Result};

/// GraphQL client scoped to one repository
pub struct GitHubClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
    owner: String,
    repo: String,
}

impl GitHubClient {
    /// Create a client for `owner/repo`
    ///
    /// The per-request timeout and user agent come from `config`.
    pub fn new(
        config: &GitHubConfig,
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(Error::Auth("GitHub token is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        let client = Self {
            http,
            endpoint: config.endpoint.clone(),
            token,
            owner: owner.into(),
            repo: repo.into(),
        };

        info!(owner = %client.owner, repo = %client.repo, endpoint = %client.endpoint, "Created GitHub client");
        Ok(client)
    }

    /// Total number of issues in the repository
    ///
    /// Advisory only: any failure is logged and reported as zero.
    pub async fn total_issue_count(&self) -> u64 {
        let variables = json!({
            "owner": self.owner,
            "repo": self.repo,
        });

        let body = match self.post(ISSUES_TOTAL_QUERY, &variables).await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "Failed to read GitHub issue count");
                return 0;
            }
        };

        match serde_json::from_value::<GraphQLResponse<TotalCountData>>(body) {
            Ok(response) => response.total_count().unwrap_or_else(|| {
                warn!("Issue count missing from response");
                0
            }),
            Err(err) => {
                warn!(error = %err, "Unexpected issue count response");
                0
            }
        }
    }

    /// Fetch the page of issues after `cursor`
    ///
    /// Transport errors, timeouts, non-success statuses and bodies that are
    /// not JSON all come back as [`FetchOutcome::Failed`]; nothing is retried.
    pub async fn fetch_issue_page(&self, cursor: Option<&str>) -> FetchOutcome {
        let variables = json!({
            "owner": self.owner,
            "repo": self.repo,
            "cursor": cursor,
        });

        match self.post(ISSUES_PAGE_QUERY, &variables).await {
            Ok(body) => FetchOutcome::Page(body),
            Err(err) => {
                warn!(
                    owner = %self.owner,
                    repo = %self.repo,
                    error = %err,
                    "Failed to read GitHub issue data"
                );
                FetchOutcome::Failed
            }
        }
    }

    /// Execute a GraphQL query and return the decoded body
    async fn post(&self, query: &str, variables: &Value) -> Result<Value> {
        debug!(endpoint = %self.endpoint, "Sending GraphQL request");

        let request_body = json!({
            "query": query,
            "variables": variables,
        });

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response".to_string());
            return Err(Error::Status { status, body });
        }

        Ok(response.json::<Value>().await?)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("endpoint", &self.endpoint)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_token_rejected() {
        let result = GitHubClient::new(&GitHubConfig::default(), "  ", "o", "r");
        assert!(matches!(result, Err(Error::Auth(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = GitHubClient::new(&GitHubConfig::default(), "ghp_secret", "o", "r").unwrap();
        let debug = format!("{:?}", client);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("owner"));
    }
}
