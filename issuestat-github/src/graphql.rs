//! GraphQL documents and the small response types decoded directly

use serde::Deserialize;

/// Issues requested per page
pub const PAGE_SIZE: u32 = 100;

/// Labels requested per issue
pub const LABELS_PER_ISSUE: u32 = 10;

/// Total number of issues in a repository
pub const ISSUES_TOTAL_QUERY: &str = r#"query IssuesTotal($owner: String!, $repo: String!) {
  repository(owner: $owner, name: $repo) {
    issues {
      totalCount
    }
  }
}"#;

/// One page of issues plus the caller's rate-limit status
pub const ISSUES_PAGE_QUERY: &str = r#"query GetIssueDates($owner: String!, $repo: String!, $cursor: String) {
  repository(owner: $owner, name: $repo) {
    issues(first: 100, after: $cursor) {
      edges {
        node {
          number
          title
          createdAt
          updatedAt
          closedAt
          state
          stateReason
          labels(first: 10) {
            edges {
              node {
                name
              }
            }
          }
        }
      }
      pageInfo {
        hasNextPage
        endCursor
      }
    }
  }
  rateLimit {
    limit
    cost
    remaining
    resetAt
  }
}"#;

/// GraphQL query response wrapper
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQLResponse<T> {
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TotalCountData {
    pub repository: Option<TotalCountRepository>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TotalCountRepository {
    pub issues: TotalCountIssues,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TotalCountIssues {
    pub total_count: u64,
}

impl GraphQLResponse<TotalCountData> {
    pub fn total_count(&self) -> Option<u64> {
        self.data
            .as_ref()
            .and_then(|d| d.repository.as_ref())
            .map(|r| r.issues.total_count)
    }
}
