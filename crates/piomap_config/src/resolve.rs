//! Path resolution: anchoring project-relative paths to absolute ones.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// A project description with every path made absolute.
///
/// The generated project script references HDL sources from inside the
/// output directory, so relative paths would break there.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    /// Absolute project directory.
    pub project_dir: PathBuf,
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// Absolute HDL source paths, in declaration order.
    pub hdl_files: Vec<PathBuf>,
}

/// Resolves the project's paths against `project_dir`.
///
/// HDL files that do not exist are kept but reported with a warning; the
/// vendor toolchain gives the definitive error when it reads them.
pub fn resolve_project(
    config: &ProjectConfig,
    project_dir: &Path,
) -> Result<ResolvedProject, ConfigError> {
    let project_dir = absolutize(project_dir)?;

    let hdl_files: Vec<PathBuf> = config
        .project
        .hdl_files
        .iter()
        .map(|f| anchor(&project_dir, f))
        .collect();
    for path in &hdl_files {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "HDL source not found");
        }
    }

    Ok(ResolvedProject {
        output_dir: anchor(&project_dir, &config.project.output),
        project_dir,
        hdl_files,
    })
}

/// Joins `path` onto `base` unless it is already absolute.
fn anchor(base: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn absolutize(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .map_err(ConfigError::WorkingDir)?
            .join(path))
    }
}
