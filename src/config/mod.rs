//! Installer configuration.
//!
//! All process-level facts the installer needs — where the running executable
//! lives, where updates are staged, which release server to talk to — are
//! collected into [`InstallerConfig`] exactly once at startup and passed down
//! explicitly. Nothing below the CLI layer reads `std::env` on its own; this
//! keeps the update pipeline deterministic and trivially testable against
//! temporary directories.
//!
//! # Environment Overrides
//!
//! - `PRIMER_RELEASE_BASE_URL` — base URL of the release server
//! - `PRIMER_CACHE_DIR` — directory for the version-check cache
//!
//! # File Slots
//!
//! The three file slots of the self-update protocol are all derived here:
//!
//! | Slot | Path |
//! |------|------|
//! | current | `current_exe` (the running binary) |
//! | new | `<staging_dir>/<bin_name>.update` |
//! | backup | `<current_exe>.backup` |

use std::path::PathBuf;

use crate::core::PrimerError;

/// Default release server queried for versions, installer binaries, and
/// scaffold archives.
pub const DEFAULT_RELEASE_BASE_URL: &str = "https://get.primer.dev";

/// Process-wide installer configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct InstallerConfig {
    /// Absolute path of the currently running executable.
    pub current_exe: PathBuf,
    /// Directory where the downloaded candidate is staged.
    pub staging_dir: PathBuf,
    /// Directory holding the version-check cache.
    pub cache_dir: PathBuf,
    /// Base URL of the release server.
    pub release_base_url: String,
    /// Name of the installed binary (e.g. "primer").
    pub bin_name: String,
    /// Version of the running binary, from build metadata.
    pub current_version: String,
}

impl InstallerConfig {
    /// Assemble the configuration from the process environment.
    ///
    /// Reads the running executable's path exactly once; every later
    /// consumer receives it through this struct.
    pub fn from_env() -> Result<Self, PrimerError> {
        let current_exe = std::env::current_exe().map_err(|e| PrimerError::Config {
            reason: format!("could not determine the running executable's path: {e}"),
        })?;

        let cache_dir = match std::env::var_os("PRIMER_CACHE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or_else(|| PrimerError::Config {
                    reason: "could not determine home directory".to_string(),
                })?
                .join(".primer"),
        };

        let release_base_url = std::env::var("PRIMER_RELEASE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_RELEASE_BASE_URL.to_string());

        Ok(Self {
            current_exe,
            staging_dir: std::env::temp_dir(),
            cache_dir,
            release_base_url,
            bin_name: "primer".to_string(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// URL of the plain-text latest-version endpoint.
    #[must_use]
    pub fn latest_version_url(&self) -> String {
        format!("{}/latest-version", self.release_base_url)
    }

    /// URL of the latest installer artifact for the host platform.
    ///
    /// The endpoint is version-less; the server always serves the newest
    /// release, so the artifact GET needs no prior version resolution.
    #[must_use]
    pub fn installer_artifact_url(&self) -> String {
        format!(
            "{}/download/latest/{}-{}",
            self.release_base_url,
            self.bin_name,
            Self::target_triple()
        )
    }

    /// URL of the project scaffold archive for a given release version.
    #[must_use]
    pub fn scaffold_archive_url(&self, version: &semver::Version) -> String {
        format!("{}/scaffold/v{}/project.zip", self.release_base_url, version)
    }

    /// Path of the NewExecutable slot inside the staging directory.
    #[must_use]
    pub fn new_executable_path(&self) -> PathBuf {
        self.staging_dir.join(format!("{}.update", self.bin_name))
    }

    /// Path of the BackupExecutable slot, a `.backup` sibling of the
    /// running binary.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut backup = self.current_exe.clone();
        backup.set_file_name(format!(
            "{}.backup",
            self.current_exe.file_name().unwrap_or_default().to_string_lossy()
        ));
        backup
    }

    /// Rust target triple of the host, used to pick the release artifact.
    #[must_use]
    pub fn target_triple() -> &'static str {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("macos", "aarch64") => "aarch64-apple-darwin",
            ("macos", _) => "x86_64-apple-darwin",
            ("windows", "aarch64") => "aarch64-pc-windows-msvc",
            ("windows", _) => "x86_64-pc-windows-msvc",
            ("linux", "aarch64") => "aarch64-unknown-linux-gnu",
            (_, _) => "x86_64-unknown-linux-gnu",
        }
    }
}
