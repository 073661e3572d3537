//! Update the primer executable in place.
//!
//! The default run performs the full pipeline: version check, download,
//! validation, backup, swap, cleanup. `--force-update` skips the
//! already-up-to-date short-circuit; `--check` only reports whether an
//! update exists.
//!
//! Exit status: `0` on success or when already up to date; `1` when the
//! update failed and the previous executable was restored; permission
//! failures abort through the fatal error path in `main`.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use crate::config::InstallerConfig;
use crate::fetch::HttpFetcher;
use crate::update::{SelfUpdatePipeline, UpdateOutcome, VersionChecker};

/// Command-line arguments for the self-update command.
#[derive(Args)]
pub struct SelfUpdateCommand {
    /// Skip the already-up-to-date check and always run the full pipeline
    #[arg(short = 'f', long)]
    pub force_update: bool,

    /// Check whether an update is available without installing it
    #[arg(long)]
    pub check: bool,
}

impl SelfUpdateCommand {
    /// Execute the requested mode: check-only or the full update pipeline.
    pub async fn execute(self) -> Result<()> {
        let config = InstallerConfig::from_env()?;
        let fetcher = HttpFetcher::new();

        if self.check {
            return check_for_update(&config, fetcher).await;
        }

        let checker = VersionChecker::new(&config, fetcher.clone());
        let current_version = config.current_version.clone();

        let mut pipeline = SelfUpdatePipeline::new(config, fetcher);
        match pipeline.run(self.force_update).await? {
            UpdateOutcome::UpToDate => {
                println!(
                    "{}",
                    format!("You are on the latest version ({current_version})").green()
                );
            }
            UpdateOutcome::Updated { version } => {
                // The cached answer now describes the binary we replaced
                if let Err(e) = checker.clear_cache().await {
                    debug!("failed to clear version cache: {}", e);
                }

                let installed = version
                    .map_or_else(|| "the latest release".to_string(), |v| format!("version {v}"));
                println!("{}", format!("Successfully updated to {installed}").green());
            }
            UpdateOutcome::RolledBack { reason } => {
                eprintln!(
                    "{}",
                    "Update failed. The previous version was restored.".red()
                );
                bail!("update failed: {reason}");
            }
        }

        Ok(())
    }
}

async fn check_for_update(config: &InstallerConfig, fetcher: HttpFetcher) -> Result<()> {
    println!("{}", "Checking for updates...".cyan());

    let checker = VersionChecker::new(config, fetcher);
    let latest = checker.check_now().await?;

    let info =
        VersionChecker::<HttpFetcher>::format_version_info(&config.current_version, latest.as_ref());
    println!("{info}");

    if latest.is_some() {
        println!("Run {} to install it", "primer self-update".bright_white());
    }

    Ok(())
}
