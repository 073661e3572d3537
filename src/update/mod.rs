//! Self-update for the Primer binary.
//!
//! This module implements in-place replacement of the running executable
//! with the latest release, built so that any failure at any step leaves the
//! system exactly as it started: the original executable intact and
//! runnable.
//!
//! # Architecture Overview
//!
//! Four components cooperate, leaf to root:
//!
//! - **Fetcher** ([`crate::fetch`]): one HTTP GET, the payload or a
//!   transport error. No retries, no policy.
//! - **[`validity::ExecutableValidator`]**: structural check of the
//!   downloaded candidate before anything destructive happens.
//! - **[`backup::BackupManager`]**: the copy/replace/remove primitives over
//!   the current/new/backup file slots, with permission preservation.
//! - **[`pipeline::SelfUpdatePipeline`]**: the orchestrator that sequences
//!   fetch → validate → backup → swap → cleanup and triggers rollback on
//!   failure.
//!
//! # Update Process Flow
//!
//! ```text
//! 1. Pre-check
//!    └── Executable path and staging directory must be writable
//!
//! 2. Version Check (skipped with --force-update)
//!    └── GET latest version, semver compare, exit 0 if current
//!
//! 3. Download & Validate
//!    ├── Stage the artifact with the current executable's permissions
//!    └── Verify it is a loadable binary for this platform
//!
//! 4. Backup & Swap
//!    ├── Copy current → backup, then mark restore-safe
//!    └── Copy new → current, preserving permission bits
//!
//! 5. Cleanup (or Rollback)
//!    ├── Success: remove staged download and backup
//!    └── Failure: remove staged download, restore backup if safe
//! ```
//!
//! # Error Classes
//!
//! Transport and validation failures are recoverable and roll back; a
//! permission failure is fatal and aborts before anything was written (see
//! [`crate::core::error`]). Everything else is conservatively treated as
//! recoverable.

/// Backup creation, restoration, and slot management.
pub mod backup;
/// The orchestrating state machine.
pub mod pipeline;
/// Structural validation of downloaded executables.
pub mod validity;
/// Remote version resolution and the on-disk check cache.
pub mod version_check;

#[cfg(test)]
mod tests;

pub use backup::BackupManager;
pub use pipeline::{SelfUpdatePipeline, UpdateOutcome};
pub use validity::{ExecutableFormat, ExecutableValidator};
pub use version_check::{VersionChecker, fetch_latest_version};
