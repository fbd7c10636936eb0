//! Issuestat CLI - export repository issues to CSV for offline statistics

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{ConfigArgs, ExportArgs};

/// Issuestat: fetch issue metadata from GitHub into a flat CSV file
#[derive(Parser, Debug)]
#[command(name = "issuestat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.config/issuestat/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Fetch every issue of a repository and write it to CSV
    #[command(visible_alias = "x")]
    Export(ExportArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Some(Commands::Version) => {
            println!("issuestat {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Export(args)) => {
            args.execute(cli.config.as_deref()).await?;
        }
        Some(Commands::Config(args)) => {
            args.execute(cli.config.as_deref())?;
        }
        None => {
            println!("Issuestat - export GitHub issue metadata to CSV");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
