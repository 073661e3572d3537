//! Remote version resolution and caching.
//!
//! Two layers live here. [`fetch_latest_version`] is the pure resolution
//! primitive: one GET against the latest-version endpoint, one semver parse,
//! no side effects — this is what the update pipeline's skip-check uses, so
//! an up-to-date run truly performs zero filesystem writes.
//!
//! [`VersionChecker`] wraps the primitive with a JSON cache on disk
//! (`.version_cache` under the cache directory) so that repeated `--check`
//! invocations and scaffold version resolution do not hammer the release
//! server. The cache is cleared after a successful self-update, since the
//! recorded "current" version is stale the moment the binary is replaced.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tracing::debug;

use crate::config::InstallerConfig;
use crate::core::PrimerError;
use crate::fetch::{ArtifactFetcher, fetch_string};

/// How long a cached answer is trusted, in seconds.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 86_400;

/// Resolve the latest released version from the release server.
///
/// The endpoint returns a bare version string (optionally `v`-prefixed) as
/// plain text. Performs no caching and writes nothing to disk.
pub async fn fetch_latest_version<F: ArtifactFetcher>(
    fetcher: &F,
    url: &str,
) -> Result<Version, PrimerError> {
    let body = fetch_string(fetcher, url).await?;
    let raw = body.trim().trim_start_matches('v');

    Version::parse(raw).map_err(|_| PrimerError::VersionParse {
        input: raw.to_string(),
    })
}

/// Cached result of a version check.
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionCheckCache {
    /// The latest version string reported by the release server.
    pub latest_version: String,
    /// The version that was running when this cache was written.
    pub current_version: String,
    /// UTC timestamp of the check.
    pub checked_at: DateTime<Utc>,
    /// Whether an update was available at check time.
    pub update_available: bool,
}

impl VersionCheckCache {
    /// Build a cache entry, deriving availability from a semver comparison.
    #[must_use]
    pub fn new(current_version: String, latest_version: String) -> Self {
        let update_available = {
            let current = Version::parse(&current_version).ok();
            let latest = Version::parse(&latest_version).ok();
            match (current, latest) {
                (Some(c), Some(l)) => l > c,
                _ => false,
            }
        };

        Self {
            latest_version,
            current_version,
            checked_at: Utc::now(),
            update_available,
        }
    }

    /// Whether the entry is younger than `interval_seconds`.
    #[must_use]
    pub fn is_valid(&self, interval_seconds: u64) -> bool {
        let age = Utc::now() - self.checked_at;
        age.num_seconds() < interval_seconds as i64
    }
}

/// Version checking with a disk cache.
pub struct VersionChecker<F> {
    cache_path: PathBuf,
    latest_version_url: String,
    current_version: String,
    fetcher: F,
}

impl<F: ArtifactFetcher> VersionChecker<F> {
    /// Create a checker from the installer configuration.
    pub fn new(config: &InstallerConfig, fetcher: F) -> Self {
        Self {
            cache_path: config.cache_dir.join(".version_cache"),
            latest_version_url: config.latest_version_url(),
            current_version: config.current_version.clone(),
            fetcher,
        }
    }

    /// Perform an explicit check against the release server, bypassing the
    /// cache, and record the result.
    ///
    /// Returns `Some(latest)` when a newer version exists, `None` when the
    /// running binary is current.
    pub async fn check_now(&self) -> Result<Option<Version>, PrimerError> {
        let latest = fetch_latest_version(&self.fetcher, &self.latest_version_url).await?;
        let current = Version::parse(&self.current_version)
            .map_err(|_| PrimerError::VersionParse {
                input: self.current_version.clone(),
            })?;

        let cache = VersionCheckCache::new(self.current_version.clone(), latest.to_string());
        self.save_cache(&cache).await?;

        if latest > current {
            Ok(Some(latest))
        } else {
            Ok(None)
        }
    }

    /// Resolve the latest version, trusting a recent cache entry first.
    ///
    /// Used by scaffolding, where a day-old answer is acceptable and saves a
    /// round-trip.
    pub async fn latest_with_cache(&self) -> Result<Version, PrimerError> {
        if let Some(cache) = self.load_cache().await? {
            if cache.is_valid(DEFAULT_CACHE_TTL_SECS) {
                if let Ok(version) = Version::parse(&cache.latest_version) {
                    debug!("using cached latest version {}", version);
                    return Ok(version);
                }
            }
        }

        let latest = fetch_latest_version(&self.fetcher, &self.latest_version_url).await?;
        let cache = VersionCheckCache::new(self.current_version.clone(), latest.to_string());
        self.save_cache(&cache).await?;
        Ok(latest)
    }

    async fn load_cache(&self) -> Result<Option<VersionCheckCache>, PrimerError> {
        if !self.cache_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.cache_path).await?;
        match serde_json::from_str(&content) {
            Ok(cache) => Ok(Some(cache)),
            Err(e) => {
                // A corrupt cache is not worth failing a command over
                debug!("discarding unreadable version cache: {}", e);
                Ok(None)
            }
        }
    }

    async fn save_cache(&self, cache: &VersionCheckCache) -> Result<(), PrimerError> {
        let content = serde_json::to_string_pretty(cache).map_err(|e| PrimerError::Config {
            reason: format!("could not serialize version cache: {e}"),
        })?;

        if let Some(parent) = self.cache_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.cache_path, content).await?;

        debug!("saved version check to {:?}", self.cache_path);
        Ok(())
    }

    /// Remove the cache file, forcing the next check to hit the network.
    pub async fn clear_cache(&self) -> Result<(), PrimerError> {
        if self.cache_path.exists() {
            fs::remove_file(&self.cache_path).await?;
            debug!("cleared version cache");
        }
        Ok(())
    }

    /// Human-readable current/latest summary for `--check` output.
    #[must_use]
    pub fn format_version_info(current: &str, latest: Option<&Version>) -> String {
        match latest {
            Some(v) if v.to_string() != current => {
                format!("Current version: {current}\nLatest version:  {v} (update available)")
            }
            _ => format!("Current version: {current} (up to date)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct StaticFetcher {
        body: &'static [u8],
    }

    impl ArtifactFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<Vec<u8>, PrimerError> {
            Ok(self.body.to_vec())
        }
    }

    fn checker_in(dir: &TempDir, body: &'static [u8]) -> VersionChecker<StaticFetcher> {
        let config = InstallerConfig {
            current_exe: dir.path().join("primer"),
            staging_dir: dir.path().to_path_buf(),
            cache_dir: dir.path().join("cache"),
            release_base_url: "https://releases.example.com".to_string(),
            bin_name: "primer".to_string(),
            current_version: "0.6.2".to_string(),
        };
        VersionChecker::new(&config, StaticFetcher { body })
    }

    #[tokio::test]
    async fn test_fetch_latest_version_accepts_v_prefix() {
        let fetcher = StaticFetcher { body: b"v1.4.0\n" };
        let version = fetch_latest_version(&fetcher, "https://example.com").await.unwrap();
        assert_eq!(version, Version::new(1, 4, 0));
    }

    #[tokio::test]
    async fn test_fetch_latest_version_rejects_garbage() {
        let fetcher = StaticFetcher { body: b"not-a-version" };
        let err = fetch_latest_version(&fetcher, "https://example.com").await.unwrap_err();
        assert!(matches!(err, PrimerError::VersionParse { .. }));
    }

    #[test]
    fn test_cache_validity_window() {
        let cache = VersionCheckCache::new("1.0.0".to_string(), "1.1.0".to_string());
        assert!(cache.is_valid(3600));
        assert!(!cache.is_valid(0));
    }

    #[test]
    fn test_cache_detects_update_availability() {
        let cache = VersionCheckCache::new("1.0.0".to_string(), "1.1.0".to_string());
        assert!(cache.update_available);

        let cache = VersionCheckCache::new("1.1.0".to_string(), "1.1.0".to_string());
        assert!(!cache.update_available);
    }

    #[tokio::test]
    async fn test_check_now_reports_newer_version_and_writes_cache() {
        let dir = TempDir::new().unwrap();
        let checker = checker_in(&dir, b"9.9.9");

        let latest = checker.check_now().await.unwrap();
        assert_eq!(latest, Some(Version::new(9, 9, 9)));
        assert!(dir.path().join("cache").join(".version_cache").exists());
    }

    #[tokio::test]
    async fn test_check_now_when_current() {
        let dir = TempDir::new().unwrap();
        let checker = checker_in(&dir, b"0.6.2");

        let latest = checker.check_now().await.unwrap();
        assert_eq!(latest, None);
    }

    #[tokio::test]
    async fn test_clear_cache_removes_file() {
        let dir = TempDir::new().unwrap();
        let checker = checker_in(&dir, b"9.9.9");

        checker.check_now().await.unwrap();
        let cache_file = dir.path().join("cache").join(".version_cache");
        assert!(cache_file.exists());

        checker.clear_cache().await.unwrap();
        assert!(!cache_file.exists());
    }

    #[tokio::test]
    async fn test_latest_with_cache_prefers_fresh_cache() {
        let dir = TempDir::new().unwrap();
        let checker = checker_in(&dir, b"2.0.0");
        checker.check_now().await.unwrap();

        // A different server answer would be ignored while the cache is fresh
        let checker = checker_in(&dir, b"3.0.0");
        let latest = checker.latest_with_cache().await.unwrap();
        assert_eq!(latest, Version::new(2, 0, 0));
    }

    #[test]
    fn test_format_version_info() {
        let up_to_date = VersionChecker::<StaticFetcher>::format_version_info("1.0.0", None);
        assert_eq!(up_to_date, "Current version: 1.0.0 (up to date)");

        let newer = Version::new(1, 1, 0);
        let info = VersionChecker::<StaticFetcher>::format_version_info("1.0.0", Some(&newer));
        assert!(info.contains("update available"));
    }
}
