//! The config command

use std::path::Path;

use clap::Args;
use issuestat_core::{Config, Overrides, Secrets};

/// Config arguments
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also report whether an access token can be found
    #[arg(long)]
    pub check_token: bool,
}

impl ConfigArgs {
    /// Execute the config command
    pub fn execute(&self, config_path: Option<&Path>) -> anyhow::Result<()> {
        let config = Config::load_with_overrides(config_path, Overrides::default())?;

        println!("Issuestat Configuration");
        println!("=======================");
        println!();
        println!("GitHub:");
        println!("  endpoint: {}", config.github.endpoint);
        println!("  timeout: {:?}", config.github.timeout);
        println!("  user_agent: {}", config.github.user_agent);
        println!();
        println!("Export:");
        println!("  repository: {}", config.export.slug());
        println!("  output: {}", config.export.output.display());
        println!(
            "  since: {}",
            config
                .export
                .since
                .map(|d| d.to_string())
                .unwrap_or_else(|| "(unset)".to_string())
        );
        println!(
            "  until: {}",
            config
                .export
                .until
                .map(|d| d.to_string())
                .unwrap_or_else(|| "(unset)".to_string())
        );
        println!(
            "  max_pages: {}",
            config
                .export
                .page_cap()
                .map(|n| n.to_string())
                .unwrap_or_else(|| "(no limit)".to_string())
        );
        println!("  allow_overwrite: {}", config.export.allow_overwrite);
        println!();

        let file = config_path
            .map(Path::to_path_buf)
            .or_else(Config::default_config_path);
        if let Some(path) = file {
            println!("Config file: {}", path.display());
            if path.exists() {
                println!("  (exists)");
            } else {
                println!("  (not found - using defaults)");
            }
        }

        if self.check_token {
            let found = Secrets::load()?.github_token().is_some();
            println!(
                "Access token: {}",
                if found { "found" } else { "NOT FOUND" }
            );
        }

        Ok(())
    }
}
