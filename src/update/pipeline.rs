//! The self-update orchestrator.
//!
//! [`SelfUpdatePipeline`] sequences the whole update as a strict pipeline —
//! permission pre-check, version skip-check, download, validate, backup,
//! swap, cleanup — and owns the one piece of state that matters for
//! recovery: the restore-safe flag, set only after the backup has been
//! written. The flag is what distinguishes "nothing destructive has happened
//! yet" from "the current executable may already be overwritten".
//!
//! # State Machine
//!
//! ```text
//! Idle → CheckingVersion → Downloading → Validating
//!      → BackingUp → Swapping → CleaningUp → Done
//! ```
//!
//! with an alternate terminal `RolledBack` reachable from any state at or
//! after `BackingUp`, and trivially (nothing to restore) from the earlier
//! states. Error dispatch happens at a single call site in [`run`]:
//!
//! - permission failures propagate as errors — fatal, no rollback, nothing
//!   was written yet;
//! - every other failure, however it was wrapped on the way up, triggers the
//!   one rollback function and resolves to
//!   [`UpdateOutcome::RolledBack`].
//!
//! Rollback itself never raises: restore failures are logged and swallowed,
//! because re-entrant failure handling during recovery risks an infinite
//! loop with the original executable at stake.
//!
//! # Invariants
//!
//! Before the swap completes the current executable is untouched. After the
//! swap, the backup and the staged download are redundant and are removed by
//! cleanup. If the process dies between backup and cleanup, both files may
//! legitimately exist on disk at once — a recoverable intermediate state,
//! not corruption.
//!
//! [`run`]: SelfUpdatePipeline::run

use semver::Version;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::InstallerConfig;
use crate::core::PrimerError;
use crate::fetch::ArtifactFetcher;
use crate::update::backup::BackupManager;
use crate::update::validity::ExecutableValidator;
use crate::update::version_check::fetch_latest_version;
use crate::utils::fs::{is_writable_dir, is_writable_file, write_executable};

/// Terminal result of an update run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The installed version already matches the latest release; nothing was
    /// downloaded or written.
    UpToDate,
    /// The executable was replaced. The version is `None` under
    /// `--force-update`, where no version resolution happens.
    Updated {
        /// The version that was installed, when known.
        version: Option<Version>,
    },
    /// A recoverable failure occurred and the previous executable was left
    /// (or put back) in place.
    RolledBack {
        /// Description of the failure that triggered the rollback.
        reason: String,
    },
}

/// Orchestrates a single self-update attempt.
///
/// Generic over the fetcher so tests can drive every failure mode without a
/// network. One pipeline value represents one attempt; it is not reusable.
pub struct SelfUpdatePipeline<F> {
    config: InstallerConfig,
    fetcher: F,
    validator: ExecutableValidator,
    /// True once the backup is known-good on disk ("backup is safe to
    /// restore"). Rollback only touches the current executable when set.
    pub(crate) restore_safe: bool,
}

impl<F: ArtifactFetcher> SelfUpdatePipeline<F> {
    /// Create a pipeline for the host platform.
    pub fn new(config: InstallerConfig, fetcher: F) -> Self {
        Self {
            config,
            fetcher,
            validator: ExecutableValidator::for_host(),
            restore_safe: false,
        }
    }

    /// Replace the validity checker; used by tests to pin a format.
    #[must_use]
    pub fn with_validator(mut self, validator: ExecutableValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Run the update to completion.
    ///
    /// With `force` set, the already-up-to-date short-circuit (and its
    /// version GET) is skipped and the full pipeline always runs.
    ///
    /// # Errors
    ///
    /// Only permission failures surface as `Err`; they are fatal and nothing
    /// has been written when they are raised. All other failures resolve to
    /// `Ok(UpdateOutcome::RolledBack { .. })` after the rollback has run.
    pub async fn run(&mut self, force: bool) -> Result<UpdateOutcome, PrimerError> {
        // Writability is checked before any network traffic: a user who
        // cannot replace the executable should find out immediately, with
        // nothing downloaded and nothing written.
        self.precheck()?;

        let new_path = self.config.new_executable_path();
        let backup = BackupManager::with_backup_path(
            self.config.current_exe.clone(),
            self.config.backup_path(),
        );

        match self.attempt(force, &new_path, &backup).await {
            Ok(UpdateOutcome::Updated { version }) => {
                debug!("state: CleaningUp");
                backup.cleanup(&new_path).await;
                info!("update complete");
                Ok(UpdateOutcome::Updated { version })
            }
            Ok(outcome) => Ok(outcome),
            Err(e) if e.is_permission_failure() => Err(e),
            Err(e) => {
                self.rollback(&new_path, &backup).await;
                Ok(UpdateOutcome::RolledBack {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// The happy path, one state per step. Any error short-circuits out to
    /// the single dispatch site in [`run`](Self::run).
    async fn attempt(
        &mut self,
        force: bool,
        new_path: &Path,
        backup: &BackupManager,
    ) -> Result<UpdateOutcome, PrimerError> {
        let target_version = if force {
            debug!("force-update set; skipping version check");
            None
        } else {
            debug!("state: CheckingVersion");
            let latest =
                fetch_latest_version(&self.fetcher, &self.config.latest_version_url()).await?;
            let current = Version::parse(&self.config.current_version).map_err(|_| {
                PrimerError::VersionParse {
                    input: self.config.current_version.clone(),
                }
            })?;

            if latest <= current {
                info!("already on the latest version ({current})");
                return Ok(UpdateOutcome::UpToDate);
            }
            info!("update available: {current} -> {latest}");
            Some(latest)
        };

        debug!("state: Downloading");
        let payload = self.fetcher.fetch(&self.config.installer_artifact_url()).await?;
        write_executable(new_path, &payload, Some(&self.config.current_exe)).await?;

        debug!("state: Validating");
        self.validator.validate(new_path)?;

        debug!("state: BackingUp");
        backup.create_backup().await?;
        self.restore_safe = true;

        debug!("state: Swapping");
        backup.swap_in(new_path).await?;

        Ok(UpdateOutcome::Updated {
            version: target_version,
        })
    }

    /// Verify every path the update will touch is writable.
    ///
    /// The executable itself is judged from metadata only, so a permission
    /// failure here provably wrote nothing; the directory probes then
    /// confirm that the backup and staging writes can succeed.
    fn precheck(&self) -> Result<(), PrimerError> {
        let exe = &self.config.current_exe;

        if !is_writable_file(exe) {
            return Err(PrimerError::Permission {
                action: "preparing to replace the executable".to_string(),
                path: exe.display().to_string(),
            });
        }

        if let Some(parent) = exe.parent() {
            if !is_writable_dir(parent) {
                return Err(PrimerError::Permission {
                    action: "preparing to write the backup".to_string(),
                    path: parent.display().to_string(),
                });
            }
        }

        if !is_writable_dir(&self.config.staging_dir) {
            return Err(PrimerError::Permission {
                action: "staging the download".to_string(),
                path: self.config.staging_dir.display().to_string(),
            });
        }

        Ok(())
    }

    /// Undo a failed attempt.
    ///
    /// Removes the staged download if present and, when the restore-safe
    /// flag is set, copies the backup over the current executable's path.
    /// Never raises: failures during recovery are logged and swallowed,
    /// since re-entering error handling from here could loop forever.
    pub(crate) async fn rollback(&self, new_path: &Path, backup: &BackupManager) {
        warn!("update failed; rolling back");

        if new_path.exists() {
            if let Err(e) = tokio::fs::remove_file(new_path).await {
                warn!("could not remove staged download {:?}: {}", new_path, e);
            }
        }

        if self.restore_safe {
            match backup.restore_backup().await {
                Ok(()) => info!("previous executable restored"),
                Err(e) => warn!(
                    "could not restore the backup ({}); it remains at {:?}",
                    e,
                    backup.backup_path()
                ),
            }
        } else {
            debug!("no backup was taken; current executable is untouched");
        }
    }
}
