//! Command-line interface for Primer.
//!
//! Each command lives in its own module with its own argument struct and an
//! `execute()` entry point; this module owns the root [`Cli`] parser, the
//! global flags, and dispatch.
//!
//! # Available Commands
//!
//! - `new` — scaffold a new project from a versioned release archive
//! - `self-update` (alias `selfupdate`) — replace the running binary with
//!   the latest release, with backup and rollback
//!
//! # Global Options
//!
//! - `--verbose` — debug-level logging to stderr
//! - `--quiet` — errors only
//!
//! # Exit Codes
//!
//! `0` on success (including "already up to date"); `1` when an update was
//! rolled back or any fatal error was reported.

mod new;
mod self_update;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Root CLI parser.
///
/// Global flags are available to every subcommand; `--verbose` and
/// `--quiet` are mutually exclusive and drive the tracing filter.
#[derive(Parser)]
#[command(
    name = "primer",
    about = "Primer - project scaffolding and self-updating installer",
    version,
    author,
    long_about = "Primer scaffolds new projects from versioned release archives and keeps \
                  its own executable up to date with a safe, rollback-protected self-update."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new project from the latest (or a chosen) release.
    New(new::NewCommand),

    /// Update the primer executable in place.
    #[command(alias = "selfupdate")]
    SelfUpdate(self_update::SelfUpdateCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        self.init_tracing();

        match self.command {
            Commands::New(cmd) => cmd.execute().await,
            Commands::SelfUpdate(cmd) => cmd.execute().await,
        }
    }

    /// Install the tracing subscriber according to the verbosity flags.
    ///
    /// An explicit `RUST_LOG` always wins over the flags.
    fn init_tracing(&self) {
        let default_filter = if self.verbose {
            "primer_cli=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}
