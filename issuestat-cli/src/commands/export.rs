//! The export command

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Args;
use dialoguer::Confirm;
use issuestat_core::{
    parse_repository, prepare_output, Config, Error, ExportConfig, ExportSummary, Exporter,
    Overrides, RowWriter, Secrets, StopReason,
};
use issuestat_github::{GitHubClient, RepositoryPages, PAGE_SIZE};
use tracing::warn;

/// Export arguments
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Repository (owner/repo or a GitHub URL)
    #[arg(short, long)]
    pub repo: Option<String>,

    /// Repository owner (organization or user)
    #[arg(long, conflicts_with = "repo")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, conflicts_with = "repo")]
    pub name: Option<String>,

    /// CSV file to write
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Stop after this many pages of 100 issues (0 = no limit)
    #[arg(long, value_name = "N")]
    pub max_pages: Option<u32>,

    /// Start of the date range of interest, YYYY-MM-DD (not applied as a filter)
    #[arg(long, value_name = "DATE")]
    pub since: Option<NaiveDate>,

    /// End of the date range of interest, YYYY-MM-DD (not applied as a filter)
    #[arg(long, value_name = "DATE")]
    pub until: Option<NaiveDate>,

    /// Overwrite an existing output file without asking
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl ExportArgs {
    fn overrides(&self) -> anyhow::Result<Overrides> {
        let (owner, repo) = match &self.repo {
            Some(reference) => {
                let (owner, repo) = parse_repository(reference)?;
                (Some(owner), Some(repo))
            }
            None => (self.owner.clone(), self.name.clone()),
        };

        Ok(Overrides {
            owner,
            repo,
            output: self.output.clone(),
            since: self.since,
            until: self.until,
            max_pages: self.max_pages,
            allow_overwrite: self.yes,
        })
    }

    /// Execute the export command
    pub async fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(config_path, self.overrides()?)?;
        let export = &config.export;

        println!("Getting the GitHub Issue statistics for {}", export.slug());
        println!(
            "This is a long process due to the potential for very large data sets \
             and the presence of rate limiters"
        );

        if export.since.is_some() || export.until.is_some() {
            warn!(
                since = ?export.since,
                until = ?export.until,
                "Date range is recorded but not applied; all issues will be fetched"
            );
        }

        let token = preflight(export, &Secrets::load()?, confirm_overwrite)?;

        let client = GitHubClient::new(&config.github, token, &export.owner, &export.repo)?;
        let writer = RowWriter::create(&export.output)?;

        let total = client.total_issue_count().await;
        println!(
            "There are {} total issues, and they will be fetched in batches of {}.",
            total, PAGE_SIZE
        );

        let mut exporter =
            Exporter::new(RepositoryPages::new(&client), writer).with_max_pages(export.page_cap());

        match exporter.run().await {
            Ok(summary) => {
                report(&summary, total, &export.output);
                Ok(())
            }
            Err(Error::DataShape { message, response }) => {
                eprintln!("{}", response);
                eprintln!("{}", message);
                Err(anyhow::anyhow!(
                    "Unexpected response shape from GitHub: {}",
                    message
                ))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Everything that can fail without the network: settings, token, and the
/// overwrite guard. Returns the token to authenticate with.
fn preflight<F>(
    export: &ExportConfig,
    secrets: &Secrets,
    confirm: F,
) -> issuestat_core::Result<String>
where
    F: FnOnce(&Path) -> issuestat_core::Result<bool>,
{
    export.validate()?;
    let token = secrets.require_token()?;
    prepare_output(&export.output, export.allow_overwrite, confirm)?;
    Ok(token)
}

/// Ask before truncating an existing file. Anything but an explicit yes,
/// including a prompt that cannot be shown, keeps the file.
fn confirm_overwrite(path: &Path) -> issuestat_core::Result<bool> {
    Confirm::new()
        .with_prompt(format!(
            "This will overwrite the existing datafile at {}. Continue?",
            path.display()
        ))
        .default(false)
        .interact()
        .map_err(|e| {
            Error::Config(format!(
                "could not ask for overwrite confirmation ({}); pass --yes to overwrite",
                e
            ))
        })
}

fn report(summary: &ExportSummary, expected: u64, output: &Path) {
    match summary.stop {
        StopReason::Exhausted => {}
        StopReason::PageCap => println!("Page limit reached... stopping operation."),
        StopReason::FetchFailed => eprintln!(
            "Warning: a page request failed and the export stopped early. \
             {} may be missing issues.",
            output.display()
        ),
    }

    println!("All data processed.");
    println!(
        "Wrote {} issues from {} pages to {}",
        summary.rows,
        summary.pages,
        output.display()
    );

    if summary.stop == StopReason::Exhausted && expected > 0 && summary.rows as u64 != expected {
        println!(
            "Note: {} issues were reported at the start; issues may have changed during the run.",
            expected
        );
    }
}
