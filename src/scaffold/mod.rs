//! Project scaffolding.
//!
//! `primer new` downloads the scaffold archive for a release, extracts it
//! into the target directory, renders any `*.tera` templates it contains,
//! and generates the standard files (README, project config) the archive did
//! not ship. All of it is plumbing around the fetcher and the filesystem;
//! the only rules worth stating are the safety ones:
//!
//! - archive entries are extracted through `enclosed_name()`, so a hostile
//!   archive cannot write outside the target directory;
//! - Unix permission bits recorded in the archive are preserved, so shipped
//!   scripts stay executable;
//! - an existing, non-empty target is refused unless `--force` is given.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::InstallerConfig;
use crate::core::PrimerError;
use crate::fetch::ArtifactFetcher;

/// Everything needed to materialize one project.
#[derive(Debug)]
pub struct ScaffoldRequest {
    /// Name substituted into templates, usually the directory name.
    pub project_name: String,
    /// Directory the project is created in.
    pub target_dir: PathBuf,
    /// Release version of the scaffold archive.
    pub version: semver::Version,
    /// Scaffold into a non-empty directory anyway.
    pub force: bool,
}

const README_TEMPLATE: &str = "\
# {{ project_name }}

Generated by primer from the v{{ version }} project scaffold.

## Getting started

Project configuration lives in `primer.toml`. Edit it, then build and run
your project as usual.
";

const PROJECT_CONFIG_TEMPLATE: &str = "\
# {{ project_name }} project configuration
# Generated by primer; edit freely.

[project]
name = \"{{ project_name }}\"
scaffold_version = \"{{ version }}\"
";

/// Downloads and materializes project scaffolds.
pub struct Scaffolder {
    config: InstallerConfig,
}

impl Scaffolder {
    /// Create a scaffolder bound to the installer configuration.
    #[must_use]
    pub const fn new(config: InstallerConfig) -> Self {
        Self { config }
    }

    /// Create the project described by `request`.
    ///
    /// Steps: refuse an unusable target, download the versioned archive,
    /// extract, render templates, generate missing standard files.
    pub async fn create<F: ArtifactFetcher>(
        &self,
        fetcher: &F,
        request: &ScaffoldRequest,
    ) -> Result<(), PrimerError> {
        ensure_target_usable(&request.target_dir, request.force)?;

        let url = self.config.scaffold_archive_url(&request.version);
        info!("downloading scaffold v{} for {}", request.version, request.project_name);
        let archive = fetcher.fetch(&url).await?;

        extract_archive(&archive, &request.target_dir)?;
        render_templates(request)?;
        generate_missing_files(request)?;

        info!("created project at {}", request.target_dir.display());
        Ok(())
    }
}

/// Refuse an existing, non-empty target unless forced.
fn ensure_target_usable(target_dir: &Path, force: bool) -> Result<(), PrimerError> {
    if !target_dir.exists() || force {
        return Ok(());
    }

    let mut entries = std::fs::read_dir(target_dir)?;
    if entries.next().is_some() {
        return Err(PrimerError::TargetNotEmpty {
            path: target_dir.display().to_string(),
        });
    }
    Ok(())
}

/// Extract a zip payload into `destination`.
///
/// Entries whose names escape the destination are skipped rather than
/// extracted; Unix modes recorded in the archive are applied.
fn extract_archive(bytes: &[u8], destination: &Path) -> Result<(), PrimerError> {
    std::fs::create_dir_all(destination)?;

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| PrimerError::ArchiveExtract {
            reason: e.to_string(),
        })?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| PrimerError::ArchiveExtract {
            reason: e.to_string(),
        })?;

        let Some(relative) = entry.enclosed_name() else {
            debug!("skipping archive entry with unsafe name: {}", entry.name());
            continue;
        };
        let outpath = destination.join(relative);

        if entry.name().ends_with('/') {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut outfile = std::fs::File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

fn template_context(request: &ScaffoldRequest) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("project_name", &request.project_name);
    context.insert("version", &request.version.to_string());
    context.insert("bin_name", &request.project_name);
    context
}

/// Render every `*.tera` file in the tree in place, dropping the suffix.
fn render_templates(request: &ScaffoldRequest) -> Result<(), PrimerError> {
    let context = template_context(request);
    let templates = collect_template_files(&request.target_dir)?;

    for template_path in templates {
        let name = template_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let source = std::fs::read_to_string(&template_path)?;
        let rendered = tera::Tera::one_off(&source, &context, false).map_err(|e| {
            PrimerError::TemplateRender {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;

        let rendered_path = template_path.with_extension("");
        std::fs::write(&rendered_path, rendered)?;
        std::fs::remove_file(&template_path)?;
        debug!("rendered {} -> {}", name, rendered_path.display());
    }

    Ok(())
}

/// Recursively collect `*.tera` files under `dir`.
fn collect_template_files(dir: &Path) -> Result<Vec<PathBuf>, PrimerError> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];

    while let Some(current) = stack.pop() {
        for entry in std::fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "tera") {
                found.push(path);
            }
        }
    }

    Ok(found)
}

/// Generate README.md and primer.toml when the archive did not provide them.
fn generate_missing_files(request: &ScaffoldRequest) -> Result<(), PrimerError> {
    let context = template_context(request);

    let generated = [
        ("README.md", README_TEMPLATE),
        ("primer.toml", PROJECT_CONFIG_TEMPLATE),
    ];

    for (file_name, template) in generated {
        let path = request.target_dir.join(file_name);
        if path.exists() {
            continue;
        }

        let rendered = tera::Tera::one_off(template, &context, false).map_err(|e| {
            PrimerError::TemplateRender {
                name: file_name.to_string(),
                reason: e.to_string(),
            }
        })?;
        std::fs::write(&path, rendered)?;
        debug!("generated {}", file_name);
    }

    Ok(())
}
