//! Issuestat GitHub - GraphQL access for issue statistics
//!
//! Wraps the two queries the export needs: a total-count query and the
//! paginated issue query, exposed to the driver as a
//! [`issuestat_core::PageSource`].

mod client;
mod error;
mod graphql;
mod pages;

pub use client::GitHubClient;
pub use error::{Error, Result};
pub use graphql::{ISSUES_PAGE_QUERY, ISSUES_TOTAL_QUERY, LABELS_PER_ISSUE, PAGE_SIZE};
pub use pages::RepositoryPages;
