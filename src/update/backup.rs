//! Backup and slot management for binary self-update.
//!
//! `BackupManager` owns the three file slots involved in an update — the
//! current executable, the staged new executable, and the backup — and
//! provides the copy/replace/remove primitives the orchestrator sequences.
//! Each primitive preserves permission bits and has defined ordering: the
//! permission bits of the current executable are always read *before* the
//! mutation that could change them.
//!
//! # Failure Semantics
//!
//! Creating the backup is the last step before destructive writes, so any
//! failure there is classified as a fatal [`PrimerError::Permission`]: it is
//! not retried and not rolled back, and the user is told to re-run with
//! elevated privileges. Swap and restore return plain I/O errors and leave
//! classification to the orchestrator, which treats them as recoverable.
//!
//! # Platform Notes
//!
//! Replacing a running binary relies on the OS keeping the original inode
//! mapped while its path is unlinked and rewritten, which holds on Unix.
//! Windows locks the file instead, so restore retries a few times with a
//! delay, the same approach the platform's installers use.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::core::PrimerError;

const RESTORE_ATTEMPTS: u32 = 3;

/// Manages the current/new/backup file slots during an update.
pub struct BackupManager {
    /// Path to the live binary being updated.
    original_path: PathBuf,
    /// Path where the backup copy is stored.
    backup_path: PathBuf,
}

impl BackupManager {
    /// Create a manager for the given executable, with the backup stored as
    /// a `.backup` sibling in the same directory.
    ///
    /// Keeping the backup next to the original means it lands on the same
    /// filesystem and inherits the same permission context, so restore is a
    /// plain copy.
    #[must_use]
    pub fn new(executable_path: PathBuf) -> Self {
        let mut backup_path = executable_path.clone();
        backup_path.set_file_name(format!(
            "{}.backup",
            executable_path.file_name().unwrap_or_default().to_string_lossy()
        ));

        Self {
            original_path: executable_path,
            backup_path,
        }
    }

    /// Create a manager with an explicit backup location.
    #[must_use]
    pub const fn with_backup_path(executable_path: PathBuf, backup_path: PathBuf) -> Self {
        Self {
            original_path: executable_path,
            backup_path,
        }
    }

    /// Copy the current binary to the backup slot.
    ///
    /// Overwrites any pre-existing backup and preserves permission bits.
    /// Must only be called once per update attempt; after it returns
    /// successfully the caller records that rollback is meaningful.
    ///
    /// # Errors
    ///
    /// Any failure is a [`PrimerError::Permission`]: nothing destructive has
    /// happened yet, so the whole update aborts without rollback.
    pub async fn create_backup(&self) -> Result<(), PrimerError> {
        let permission = |action: &str| PrimerError::Permission {
            action: action.to_string(),
            path: self.backup_path.display().to_string(),
        };

        if !self.original_path.exists() {
            return Err(PrimerError::Permission {
                action: "reading the current executable".to_string(),
                path: self.original_path.display().to_string(),
            });
        }

        if self.backup_path.exists() {
            debug!("removing old backup at {:?}", self.backup_path);
            fs::remove_file(&self.backup_path)
                .await
                .map_err(|_| permission("removing the stale backup"))?;
        }

        info!("creating backup at {:?}", self.backup_path);
        fs::copy(&self.original_path, &self.backup_path)
            .await
            .map_err(|_| permission("writing the backup copy"))?;

        #[cfg(unix)]
        {
            let metadata =
                fs::metadata(&self.original_path).await.map_err(|_| PrimerError::Permission {
                    action: "reading executable metadata".to_string(),
                    path: self.original_path.display().to_string(),
                })?;
            fs::set_permissions(&self.backup_path, metadata.permissions())
                .await
                .map_err(|_| permission("setting backup permissions"))?;
        }

        Ok(())
    }

    /// Copy the staged new executable over the current binary's path.
    ///
    /// The current file's permission bits are read before any mutation and
    /// restored on the replacement, since the copy would otherwise carry the
    /// staging file's bits.
    ///
    /// # Errors
    ///
    /// Plain I/O errors; the orchestrator classifies them as recoverable and
    /// rolls back.
    pub async fn swap_in(&self, new_path: &Path) -> Result<(), PrimerError> {
        let original_permissions = fs::metadata(&self.original_path).await.ok().map(|m| m.permissions());

        // Unlink-then-copy so the running image keeps its old inode while
        // the path points at the new one.
        if self.original_path.exists() {
            fs::remove_file(&self.original_path).await?;
        }
        fs::copy(new_path, &self.original_path).await?;

        if let Some(permissions) = original_permissions {
            fs::set_permissions(&self.original_path, permissions).await?;
        }

        info!("installed new executable at {:?}", self.original_path);
        Ok(())
    }

    /// Remove the staged executable and the backup.
    ///
    /// Best-effort: files already absent are fine, and removal failures are
    /// logged rather than raised, since the update itself has already
    /// succeeded by the time cleanup runs.
    pub async fn cleanup(&self, new_path: &Path) {
        for path in [new_path, self.backup_path.as_path()] {
            if path.exists() {
                match fs::remove_file(path).await {
                    Ok(()) => debug!("removed {:?}", path),
                    Err(e) => warn!("could not remove {:?}: {}", path, e),
                }
            }
        }
    }

    /// Restore the original binary from the backup slot.
    ///
    /// Only meaningful after [`create_backup`](Self::create_backup) has
    /// succeeded; the orchestrator guards this with its restore-safe flag.
    /// Retries on Windows-style file locking.
    pub async fn restore_backup(&self) -> Result<(), PrimerError> {
        if !self.backup_path.exists() {
            return Err(PrimerError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no backup found at {}", self.backup_path.display()),
            )));
        }

        warn!("restoring previous executable from {:?}", self.backup_path);

        let mut attempts = 0;
        loop {
            match self.attempt_restore().await {
                Ok(()) => {
                    info!("restored previous executable");
                    return Ok(());
                }
                Err(e) if attempts < RESTORE_ATTEMPTS - 1 => {
                    warn!("restore attempt {} failed: {}; retrying", attempts + 1, e);
                    tokio::time::sleep(tokio::time::Duration::from_secs(1)).await;
                    attempts += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt_restore(&self) -> Result<(), PrimerError> {
        if self.original_path.exists() {
            fs::remove_file(&self.original_path).await?;
        }

        fs::copy(&self.backup_path, &self.original_path).await?;

        #[cfg(unix)]
        {
            let metadata = fs::metadata(&self.backup_path).await?;
            fs::set_permissions(&self.original_path, metadata.permissions()).await?;
        }

        Ok(())
    }

    /// Whether a backup currently exists on disk.
    #[must_use]
    pub fn backup_exists(&self) -> bool {
        self.backup_path.exists()
    }

    /// Location of the backup slot.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}
