#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::config::InstallerConfig;
    use crate::core::PrimerError;
    use crate::fetch::ArtifactFetcher;
    use semver::Version;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Serves canned responses for the two release endpoints and counts
    /// every request, so the tests can assert that a run performed (or did
    /// not perform) network traffic.
    #[derive(Clone)]
    struct StubFetcher {
        version_response: Option<&'static str>,
        artifact_response: Option<Vec<u8>>,
        calls: Arc<AtomicUsize>,
    }

    impl StubFetcher {
        fn new(version: Option<&'static str>, artifact: Option<Vec<u8>>) -> Self {
            Self {
                version_response: version,
                artifact_response: artifact,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn request_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ArtifactFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, PrimerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let payload = if url.ends_with("/latest-version") {
                self.version_response.map(|v| v.as_bytes().to_vec())
            } else {
                self.artifact_response.clone()
            };

            payload.ok_or_else(|| PrimerError::Transport {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        }
    }

    /// 2048 bytes that pass the ELF structural check.
    fn valid_artifact() -> Vec<u8> {
        let mut bytes = vec![0u8; 2048];
        bytes[..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        bytes
    }

    /// 2048 bytes with no recognizable executable header.
    fn corrupt_artifact() -> Vec<u8> {
        vec![0x42u8; 2048]
    }

    /// An installed executable of 1024 bytes with mode 0755, plus writable
    /// staging and cache directories.
    fn fixture() -> (TempDir, InstallerConfig) {
        let temp = TempDir::new().unwrap();
        let bin_dir = temp.path().join("bin");
        let staging_dir = temp.path().join("staging");
        std::fs::create_dir_all(&bin_dir).unwrap();
        std::fs::create_dir_all(&staging_dir).unwrap();

        let current_exe = bin_dir.join("primer");
        std::fs::write(&current_exe, vec![0xAAu8; 1024]).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&current_exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        }

        let config = InstallerConfig {
            current_exe,
            staging_dir,
            cache_dir: temp.path().join("cache"),
            release_base_url: "https://releases.example.com".to_string(),
            bin_name: "primer".to_string(),
            current_version: "1.0.0".to_string(),
        };

        (temp, config)
    }

    fn pipeline_with(
        config: &InstallerConfig,
        fetcher: StubFetcher,
    ) -> SelfUpdatePipeline<StubFetcher> {
        SelfUpdatePipeline::new(config.clone(), fetcher)
            .with_validator(ExecutableValidator::with_format(ExecutableFormat::Elf))
    }

    #[cfg(unix)]
    fn mode_of(path: &std::path::Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    // An up-to-date run writes nothing and reports success.
    #[tokio::test]
    async fn test_up_to_date_run_writes_nothing() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(Some("1.0.0"), Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher.clone());

        let outcome = pipeline.run(false).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::UpToDate);

        assert_eq!(std::fs::read(&config.current_exe).unwrap(), vec![0xAAu8; 1024]);
        #[cfg(unix)]
        assert_eq!(mode_of(&config.current_exe), 0o755);
        assert!(!config.new_executable_path().exists());
        assert!(!config.backup_path().exists());
        // Only the version endpoint was hit
        assert_eq!(fetcher.request_count(), 1);
    }

    // A transport failure during download leaves bytes and permissions
    // exactly as they were.
    #[tokio::test]
    async fn test_download_failure_leaves_executable_untouched() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(Some("2.0.0"), None);
        let mut pipeline = pipeline_with(&config, fetcher);

        let outcome = pipeline.run(false).await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::RolledBack { .. }));

        assert_eq!(std::fs::read(&config.current_exe).unwrap(), vec![0xAAu8; 1024]);
        #[cfg(unix)]
        assert_eq!(mode_of(&config.current_exe), 0o755);
        assert!(!config.new_executable_path().exists());
        assert!(!config.backup_path().exists());
        assert!(!pipeline.restore_safe);
    }

    // A validation failure leaves the executable unchanged and removes the
    // staged download.
    #[tokio::test]
    async fn test_validation_failure_rolls_back_and_removes_staged_file() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(Some("2.0.0"), Some(corrupt_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher);

        let outcome = pipeline.run(false).await.unwrap();
        match outcome {
            UpdateOutcome::RolledBack { reason } => {
                assert!(reason.contains("not a valid executable"));
            }
            other => panic!("expected rollback, got {other:?}"),
        }

        assert_eq!(std::fs::read(&config.current_exe).unwrap(), vec![0xAAu8; 1024]);
        #[cfg(unix)]
        assert_eq!(mode_of(&config.current_exe), 0o755);
        assert!(!config.new_executable_path().exists());
        assert!(!config.backup_path().exists());
    }

    // After a failed swap the rollback restores the exact backed-up bytes
    // and the pre-update permission bits.
    #[tokio::test]
    async fn test_rollback_restores_exact_bytes_and_mode() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(Some("2.0.0"), Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher);

        let backup = BackupManager::with_backup_path(
            config.current_exe.clone(),
            config.backup_path(),
        );
        backup.create_backup().await.unwrap();
        pipeline.restore_safe = true;

        // Simulate a swap that died halfway: current is garbage with the
        // wrong mode, and the staged download is still on disk.
        let new_path = config.new_executable_path();
        std::fs::write(&new_path, valid_artifact()).unwrap();
        std::fs::write(&config.current_exe, b"half-written junk").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&config.current_exe, std::fs::Permissions::from_mode(0o644))
                .unwrap();
        }

        pipeline.rollback(&new_path, &backup).await;

        assert_eq!(std::fs::read(&config.current_exe).unwrap(), vec![0xAAu8; 1024]);
        #[cfg(unix)]
        assert_eq!(mode_of(&config.current_exe), 0o755);
        assert!(!new_path.exists());
    }

    // A fully successful run installs the fetched bytes, keeps the
    // permission bits, and leaves no backup or staged files behind.
    #[tokio::test]
    async fn test_successful_update_installs_and_cleans_up() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(Some("2.0.0"), Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher);

        let outcome = pipeline.run(false).await.unwrap();
        assert_eq!(
            outcome,
            UpdateOutcome::Updated {
                version: Some(Version::new(2, 0, 0))
            }
        );

        let installed = std::fs::read(&config.current_exe).unwrap();
        assert_eq!(installed, valid_artifact());
        assert_eq!(installed.len(), 2048);
        #[cfg(unix)]
        assert_eq!(mode_of(&config.current_exe), 0o755);
        assert!(!config.new_executable_path().exists());
        assert!(!config.backup_path().exists());
    }

    // An unwritable executable aborts with a permission failure before any
    // network request or file write.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_unwritable_executable_aborts_before_any_fetch() {
        use std::os::unix::fs::PermissionsExt;

        let (_temp, config) = fixture();
        std::fs::set_permissions(&config.current_exe, std::fs::Permissions::from_mode(0o444))
            .unwrap();

        let fetcher = StubFetcher::new(Some("2.0.0"), Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher.clone());

        let err = pipeline.run(false).await.unwrap_err();
        assert!(err.is_permission_failure());
        assert_eq!(fetcher.request_count(), 0);

        assert_eq!(std::fs::read(&config.current_exe).unwrap(), vec![0xAAu8; 1024]);
        assert!(!config.new_executable_path().exists());
        assert!(!config.backup_path().exists());

        std::fs::set_permissions(&config.current_exe, std::fs::Permissions::from_mode(0o755))
            .unwrap();
    }

    // --force-update skips the version GET entirely and still succeeds.
    #[tokio::test]
    async fn test_force_update_skips_version_check() {
        let (_temp, config) = fixture();
        // The version endpoint is broken, but force mode never asks it
        let fetcher = StubFetcher::new(None, Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher.clone());

        let outcome = pipeline.run(true).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated { version: None });
        assert_eq!(fetcher.request_count(), 1);
        assert_eq!(std::fs::read(&config.current_exe).unwrap(), valid_artifact());
    }

    // A failure on the version endpoint itself is recoverable: the rollback
    // is trivial because nothing was staged yet.
    #[tokio::test]
    async fn test_version_endpoint_failure_is_trivial_rollback() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(None, Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher);

        let outcome = pipeline.run(false).await.unwrap();
        assert!(matches!(outcome, UpdateOutcome::RolledBack { .. }));
        assert_eq!(std::fs::read(&config.current_exe).unwrap(), vec![0xAAu8; 1024]);
        assert!(!config.backup_path().exists());
    }

    // A downgrade offer from the server is treated as up to date.
    #[tokio::test]
    async fn test_older_remote_version_is_up_to_date() {
        let (_temp, config) = fixture();
        let fetcher = StubFetcher::new(Some("0.9.0"), Some(valid_artifact()));
        let mut pipeline = pipeline_with(&config, fetcher);

        let outcome = pipeline.run(false).await.unwrap();
        assert_eq!(outcome, UpdateOutcome::UpToDate);
    }
}
