//! Scaffold a new project from a release archive.
//!
//! `primer new my-app` resolves the latest release (or honors an explicit
//! `--version`), downloads the scaffold archive, and materializes it in the
//! given directory. Environment requirements are probed before anything is
//! downloaded, so a doomed run fails fast with an actionable message.
//!
//! ```bash
//! primer new my-app                 # latest release
//! primer new my-app --version 1.2.0 # pinned release
//! primer new my-app --force         # scaffold into a non-empty directory
//! ```

use anyhow::{Result, anyhow};
use clap::Args;
use colored::Colorize;
use semver::Version;
use std::path::PathBuf;

use crate::config::InstallerConfig;
use crate::fetch::HttpFetcher;
use crate::requirements::RequirementsCheck;
use crate::scaffold::{ScaffoldRequest, Scaffolder};
use crate::update::VersionChecker;

/// Command to create a new project directory from a scaffold archive.
#[derive(Args)]
pub struct NewCommand {
    /// Directory to create the project in; its name becomes the project name
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Scaffold release version to use (defaults to the latest release)
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Scaffold even if the directory already exists and is not empty
    #[arg(short, long)]
    pub force: bool,
}

impl NewCommand {
    /// Execute the command: probe requirements, resolve the version,
    /// download and materialize the scaffold.
    pub async fn execute(self) -> Result<()> {
        let config = InstallerConfig::from_env()?;

        let project_name = self
            .directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("{} is not a usable project directory", self.directory.display()))?;

        RequirementsCheck::for_scaffold(&self.directory, &config.staging_dir).ensure()?;

        let fetcher = HttpFetcher::new();
        let version = match self.version {
            Some(raw) => {
                let trimmed = raw.trim_start_matches('v');
                Version::parse(trimmed).map_err(|_| anyhow!("invalid version string: {raw}"))?
            }
            None => {
                println!("{}", "Resolving latest release...".cyan());
                VersionChecker::new(&config, fetcher.clone()).latest_with_cache().await?
            }
        };

        println!("{}", format!("Creating {project_name} from scaffold v{version}...").cyan());

        let request = ScaffoldRequest {
            project_name: project_name.clone(),
            target_dir: self.directory.clone(),
            version,
            force: self.force,
        };
        Scaffolder::new(config).create(&fetcher, &request).await?;

        println!(
            "{} Created project {} at {}",
            "✓".green(),
            project_name.bright_white(),
            self.directory.display()
        );
        println!("\n{}", "Next steps:".cyan());
        println!("  cd {}", self.directory.display());
        println!("  Review {} and start building", "primer.toml".bright_white());

        Ok(())
    }
}
