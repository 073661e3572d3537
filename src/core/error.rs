//! Error handling for Primer
//!
//! This module provides the error types and user-friendly error reporting for
//! the installer. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Error Classification
//!
//! The self-update pipeline distinguishes three failure classes, and the
//! distinction drives control flow (see [`crate::update::pipeline`]):
//!
//! - [`PrimerError::Transport`] — network/HTTP failure or an empty response
//!   body. Recoverable: the pipeline rolls back and exits non-zero.
//! - [`PrimerError::Validation`] — the downloaded artifact is structurally
//!   invalid. Recoverable: rolls back, exits non-zero.
//! - [`PrimerError::Permission`] — a filesystem path involved is not
//!   writable/readable where required. Fatal and never rolled back: it is
//!   detected either before any mutation or during the backup step before
//!   any destructive write, and the user is told to re-run with elevated
//!   privileges.
//!
//! Every other error is treated conservatively as recoverable and routed
//! through rollback rather than left to propagate destructively: an update
//! must never exit leaving the current executable missing or corrupt.
//!
//! # Examples
//!
//! ```rust,no_run
//! use primer_cli::core::{PrimerError, user_friendly_error};
//!
//! fn fetch_release() -> Result<(), PrimerError> {
//!     Err(PrimerError::Transport {
//!         url: "https://get.primer.dev/latest-version".to_string(),
//!         reason: "connection refused".to_string(),
//!     })
//! }
//!
//! if let Err(e) = fetch_release() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Colored error with a suggestion
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Primer operations.
///
/// Each variant represents a specific failure mode and carries enough context
/// to produce an actionable message. The three variants at the top are the
/// pipeline's classification axes; the rest are ambient failures from
/// scaffolding and configuration.
#[derive(Error, Debug)]
pub enum PrimerError {
    /// Network or HTTP failure while fetching a remote artifact.
    ///
    /// Raised for connection failures, non-2xx responses, and empty response
    /// bodies. A single request attempt is made; there is no retry policy.
    #[error("could not download from {url}: {reason}")]
    Transport {
        /// The URL that failed to download
        url: String,
        /// Transport-level diagnostic (status code, connection error, ...)
        reason: String,
    },

    /// The downloaded candidate failed structural validation.
    ///
    /// Raised when the staged executable does not look like a loadable
    /// binary for the host platform (wrong magic, truncated payload).
    #[error("downloaded artifact at {path} is not a valid executable: {reason}")]
    Validation {
        /// Path of the staged candidate that failed the check
        path: String,
        /// The checker's diagnostic
        reason: String,
    },

    /// Insufficient filesystem permissions for a required operation.
    ///
    /// Fatal to the whole update: never retried and never rolled back,
    /// because it is detected before any destructive write.
    #[error("permission denied while {action}: {path}")]
    Permission {
        /// What the installer was trying to do (e.g. "staging the update")
        action: String,
        /// The path that was not writable/readable
        path: String,
    },

    /// A remote version string could not be parsed as semver.
    #[error("invalid version string from release server: {input}")]
    VersionParse {
        /// The string that failed to parse
        input: String,
    },

    /// The scaffold target directory exists and is not empty.
    #[error("target directory {path} already exists and is not empty")]
    TargetNotEmpty {
        /// The offending directory
        path: String,
    },

    /// The scaffold archive could not be extracted.
    #[error("failed to extract scaffold archive: {reason}")]
    ArchiveExtract {
        /// Diagnostic from the archive reader
        reason: String,
    },

    /// A scaffold template failed to render.
    #[error("failed to render template {name}: {reason}")]
    TemplateRender {
        /// Template file name
        name: String,
        /// Diagnostic from the template engine
        reason: String,
    },

    /// Installer configuration could not be assembled at startup.
    #[error("configuration error: {reason}")]
    Config {
        /// What was missing or invalid
        reason: String,
    },

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Semantic version parsing error from the `semver` crate
    #[error("Version parsing error: {0}")]
    Semver(#[from] semver::Error),
}

impl PrimerError {
    /// Whether this error is fatal to the update (no rollback attempted).
    ///
    /// Only permission failures qualify: they are detected before any
    /// destructive write, so the current executable is still intact and
    /// restoring a backup would be meaningless.
    #[must_use]
    pub const fn is_permission_failure(&self) -> bool {
        matches!(self, Self::Permission { .. })
    }
}

/// Wrapper that pairs an error with a user-facing suggestion.
///
/// `ErrorContext` is what `main` ultimately renders: the error message in
/// red, an optional suggestion in yellow, and optional details in dimmed
/// text. Build one via [`user_friendly_error`] or manually with the
/// builder methods.
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Actionable suggestion shown to the user
    pub suggestion: Option<String>,
    /// Additional background shown below the suggestion
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion attached yet.
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach an actionable suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach background details.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);

        if let Some(ref details) = self.details {
            eprintln!("\n{}", details.dimmed());
        }

        if let Some(ref suggestion) = self.suggestion {
            eprintln!("\n{} {}", "Suggestion:".yellow().bold(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(ref details) = self.details {
            write!(f, "\n{details}")?;
        }
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a class-appropriate
/// suggestion.
///
/// Downcasts to [`PrimerError`] where possible; unknown error types pass
/// through with no suggestion attached.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let suggestion = match error.downcast_ref::<PrimerError>() {
        Some(PrimerError::Transport { .. }) => Some(
            "Check your network connection and that the release server is reachable, then try again.",
        ),
        Some(PrimerError::Validation { .. }) => {
            Some("The downloaded release may be corrupted. Re-run the update to download it again.")
        }
        Some(PrimerError::Permission { .. }) => Some(
            "Re-run the command with elevated privileges (e.g. `sudo primer self-update`), or install primer to a directory you can write to.",
        ),
        Some(PrimerError::TargetNotEmpty { .. }) => {
            Some("Choose a different directory name, or pass --force to scaffold into it anyway.")
        }
        Some(PrimerError::VersionParse { .. }) => {
            Some("The release server returned an unexpected version string. Try again later.")
        }
        _ => None,
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    ctx
}
