//! Issuestat Core - Core library for issue statistics export
//!
//! This crate holds everything that does not talk to the network: the
//! configuration, the issue record model, the CSV row writer and the
//! pagination driver that stitches fetched pages into a single output file.

pub mod config;
pub mod error;
pub mod export;
pub mod page;
pub mod record;
pub mod secrets;
pub mod writer;

pub use config::{parse_repository, Config, ExportConfig, GitHubConfig, Overrides};
pub use error::{Error, Result};
pub use export::{ExportSummary, Exporter, StopReason, PAGE_PAUSE, RATE_LIMIT_PAUSE};
pub use page::{FetchOutcome, Page, PageInfo, PageSource, RateLimit};
pub use record::{flatten_labels, IssueRecord, IssueState, StateReason};
pub use secrets::{GitHubSecrets, Secrets};
pub use writer::{prepare_output, RowWriter, CSV_HEADER};
