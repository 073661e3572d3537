//! Pre-flight environment checks.
//!
//! Before a command downloads anything, the environment it is about to write
//! into is probed: scaffolding needs a usable target directory and a
//! writable staging area. Each probe carries a user-facing hint so a failed
//! check reads as an instruction, not a stack trace.

use std::path::{Path, PathBuf};

use crate::core::PrimerError;
use crate::utils::fs::is_writable_dir;

/// One environment probe and its outcome.
#[derive(Debug)]
pub struct Requirement {
    /// Short label shown in diagnostics.
    pub name: &'static str,
    /// Whether the probe passed.
    pub satisfied: bool,
    /// What the user should do when it did not.
    pub hint: String,
}

/// A batch of probes evaluated together.
#[derive(Debug)]
pub struct RequirementsCheck {
    requirements: Vec<Requirement>,
}

impl RequirementsCheck {
    /// Probes required before scaffolding into `target_dir`.
    #[must_use]
    pub fn for_scaffold(target_dir: &Path, staging_dir: &Path) -> Self {
        let parent = target_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        let requirements = vec![
            Requirement {
                name: "target parent writable",
                satisfied: is_writable_dir(&parent),
                hint: format!(
                    "the project would be created under {}, which is not writable",
                    parent.display()
                ),
            },
            Requirement {
                name: "staging directory writable",
                satisfied: is_writable_dir(staging_dir),
                hint: format!(
                    "downloads are staged in {}, which is not writable",
                    staging_dir.display()
                ),
            },
        ];

        Self { requirements }
    }

    /// The probes that failed, if any.
    #[must_use]
    pub fn failures(&self) -> Vec<&Requirement> {
        self.requirements.iter().filter(|r| !r.satisfied).collect()
    }

    /// Error out with the first failure's hint, or pass.
    pub fn ensure(&self) -> Result<(), PrimerError> {
        match self.failures().first() {
            None => Ok(()),
            Some(failure) => Err(PrimerError::Permission {
                action: format!("checking requirement \"{}\"", failure.name),
                path: failure.hint.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_requirements_pass_in_writable_dirs() {
        let temp = TempDir::new().unwrap();
        let check =
            RequirementsCheck::for_scaffold(&temp.path().join("new-project"), temp.path());
        assert!(check.failures().is_empty());
        check.ensure().unwrap();
    }

    #[test]
    fn test_missing_staging_dir_fails() {
        let temp = TempDir::new().unwrap();
        let check = RequirementsCheck::for_scaffold(
            &temp.path().join("new-project"),
            &temp.path().join("no-such-staging"),
        );
        let failures = check.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "staging directory writable");
        assert!(check.ensure().is_err());
    }

    #[test]
    fn test_bare_project_name_uses_current_dir_as_parent() {
        let temp = TempDir::new().unwrap();
        // A bare name like "myapp" has an empty parent; the probe must fall
        // back to "." rather than rejecting it.
        let check = RequirementsCheck::for_scaffold(Path::new("myapp"), temp.path());
        assert!(check.failures().iter().all(|f| f.name != "target parent writable"));
    }
}
