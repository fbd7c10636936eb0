//! Page source backed by the GitHub client

use async_trait::async_trait;
use issuestat_core::{FetchOutcome, PageSource};

use crate::GitHubClient;

/// Issue pages of one repository, in API order
#[derive(Debug)]
pub struct RepositoryPages<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepositoryPages<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<'a> PageSource for RepositoryPages<'a> {
    async fn fetch_page(&mut self, cursor: Option<&str>) -> FetchOutcome {
        self.client.fetch_issue_page(cursor).await
    }
}
