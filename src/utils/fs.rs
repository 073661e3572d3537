//! File system utilities with permission awareness
//!
//! The self-update protocol lives and dies by two filesystem properties:
//! whether a path can actually be written before anything destructive
//! happens, and whether permission bits survive the copy operations that
//! move executables between slots. This module provides those primitives.
//!
//! # Cross-Platform Behavior
//!
//! - **Unix**: permission bits are read and restored explicitly; writability
//!   of a file is judged from its mode bits
//! - **Windows**: the readonly attribute stands in for mode bits; directory
//!   writability is probed by creating a real temporary file

use std::io;
use std::path::Path;
use tracing::debug;

/// Probe whether a directory accepts new files.
///
/// Creates (and immediately discards) an anonymous temporary file inside
/// `dir`. This is deliberately a real write rather than a metadata check:
/// mode bits do not capture read-only mounts, ACLs, or quota limits, and a
/// failed probe here is exactly the failure the update would hit later.
#[must_use]
pub fn is_writable_dir(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    match tempfile::tempfile_in(dir) {
        Ok(_) => true,
        Err(e) => {
            debug!("writability probe failed for {:?}: {}", dir, e);
            false
        }
    }
}

/// Check whether an existing file can be overwritten in place.
///
/// For a missing file, falls back to probing the parent directory, since
/// creating the file is then the operation that matters.
#[must_use]
pub fn is_writable_file(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(metadata) => !metadata.permissions().readonly(),
        Err(_) => path.parent().is_some_and(is_writable_dir),
    }
}

/// Copy `src` to `dst`, overwriting `dst`, and restore `src`'s permission
/// bits on the destination.
///
/// `std::fs::copy` already carries permissions over on most platforms, but
/// the explicit `set_permissions` keeps the executable bit intact even when
/// the destination pre-existed with different bits.
pub async fn copy_preserving_permissions(src: &Path, dst: &Path) -> io::Result<()> {
    tokio::fs::copy(src, dst).await?;

    let metadata = tokio::fs::metadata(src).await?;
    tokio::fs::set_permissions(dst, metadata.permissions()).await?;

    Ok(())
}

/// Write `bytes` to `path` and mark the result executable.
///
/// Permission bits are taken from `mode_from` when that file is readable;
/// otherwise a default executable mask (`0o755` on Unix) is applied. The
/// reference file is read before the write so a failure to stat it never
/// leaves a half-written artifact behind.
pub async fn write_executable(path: &Path, bytes: &[u8], mode_from: Option<&Path>) -> io::Result<()> {
    let reference_permissions = match mode_from {
        Some(reference) => tokio::fs::metadata(reference).await.map(|m| m.permissions()).ok(),
        None => None,
    };

    tokio::fs::write(path, bytes).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = reference_permissions
            .unwrap_or_else(|| std::fs::Permissions::from_mode(0o755));
        tokio::fs::set_permissions(path, permissions).await?;
    }

    #[cfg(not(unix))]
    {
        if let Some(permissions) = reference_permissions {
            tokio::fs::set_permissions(path, permissions).await?;
        }
    }

    Ok(())
}
