//! Shared pipeline steps for CLI commands.
//!
//! Project root resolution, config loading, register allocation, output
//! directory scaffolding and artifact writing. `generate` runs all of them;
//! `map` stops after allocation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use piomap_alloc::{allocate, extract_signals, AllocError, Allocation, RawSignal};
use piomap_codegen::{
    Artifacts, CodegenError, DesignInfo, GenerateOptions, ManifestFormat, ScriptKind,
    ToolchainPaths,
};
use piomap_config::{ConfigError, ProjectConfig, ResolvedProject, CONFIG_FILE};

use crate::GlobalArgs;

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No `piomap.toml` was found walking up from the start directory.
    #[error("could not find piomap.toml in {} or any parent directory", start.display())]
    ProjectNotFound {
        /// Directory the search started from.
        start: PathBuf,
    },

    /// The project description could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A port could not be parsed or placed.
    #[error(transparent)]
    Alloc(#[from] AllocError),

    /// An artifact could not be rendered.
    #[error(transparent)]
    Codegen(#[from] CodegenError),

    /// The output directory (or a subdirectory of it) could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A generated file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteArtifact {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// A loaded project with its paths resolved.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    /// The parsed project description.
    pub config: ProjectConfig,
    /// Absolute paths derived from it.
    pub resolved: ResolvedProject,
}

/// The result of allocating a project's ports.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Identity of the design, including its detected clock port.
    pub design: DesignInfo,
    /// Registers and connections for every non-clock port.
    pub allocation: Allocation,
}

/// Walks up from `start` looking for the nearest directory containing
/// `piomap.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, PipelineError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(PipelineError::ProjectNotFound {
                start: start.to_path_buf(),
            });
        }
    }
}

/// Resolves the project directory and config file from global CLI args.
///
/// `--config` may name the file itself or its directory. Without it the
/// search walks up from the current directory.
pub fn resolve_config_location(global: &GlobalArgs) -> Result<(PathBuf, PathBuf), PipelineError> {
    match &global.config {
        Some(config_path) => {
            let p = PathBuf::from(config_path);
            if p.is_dir() {
                let file = p.join(CONFIG_FILE);
                Ok((p, file))
            } else {
                let dir = p
                    .parent()
                    .filter(|d| !d.as_os_str().is_empty())
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                Ok((dir, p))
            }
        }
        None => {
            let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
            let root = find_project_root(&cwd)?;
            let file = root.join(CONFIG_FILE);
            Ok((root, file))
        }
    }
}

/// Loads and resolves the project selected by the global CLI args.
pub fn load_project(global: &GlobalArgs) -> Result<LoadedProject, PipelineError> {
    let (project_dir, config_file) = resolve_config_location(global)?;
    tracing::debug!(path = %config_file.display(), "loading project description");
    let config = piomap_config::load_config_file(&config_file)?;
    let resolved = piomap_config::resolve_project(&config, &project_dir)?;
    Ok(LoadedProject { config, resolved })
}

/// Extracts the project's ports and packs them into registers.
pub fn plan(config: &ProjectConfig) -> Result<Plan, PipelineError> {
    let decls = config.ports.iter().map(|p| RawSignal {
        name: &p.name,
        direction: &p.mode,
        type_expr: &p.type_expr,
        description: &p.description,
    });
    let extracted = extract_signals(decls, &config.project.clock)?;
    let allocation = allocate(extracted.signals)?;
    tracing::info!(
        ports = allocation.connections().len(),
        registers = allocation.registers().len(),
        "allocated registers"
    );

    Ok(Plan {
        design: DesignInfo {
            name: config.project.name.clone(),
            clock: extracted.clock,
            testbench: config.project.testbench.clone(),
        },
        allocation,
    })
}

/// Maps the project description onto generator options.
pub fn generate_options(config: &ProjectConfig, resolved: &ResolvedProject) -> GenerateOptions {
    let tc = &config.toolchain;
    GenerateOptions {
        hdl_files: resolved.hdl_files.clone(),
        toolchain: ToolchainPaths {
            quartus_sh: tc.quartus_sh.clone(),
            qsys_script: tc.qsys_script.clone(),
            qsys_generate: tc.qsys_generate.clone(),
            quartus_cpf: tc.quartus_cpf.clone(),
        },
        script: match tc.script {
            piomap_config::ScriptKind::Bat => ScriptKind::Bat,
            piomap_config::ScriptKind::Sh => ScriptKind::Sh,
        },
        manifest_format: match config.manifest.format {
            piomap_config::ManifestFormat::Xml => ManifestFormat::Xml,
            piomap_config::ManifestFormat::Json => ManifestFormat::Json,
        },
    }
}

/// Creates `dir` and any missing parents.
pub fn scaffold_output(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir).map_err(|source| PipelineError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })
}

/// Writes every artifact below `output_dir`, returning the written paths.
///
/// Stops at the first failure. Files already written stay in place.
pub fn write_artifacts(
    output_dir: &Path,
    artifacts: &Artifacts,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts.files() {
        let path = output_dir.join(&artifact.path);
        if let Some(parent) = path.parent() {
            scaffold_output(parent)?;
        }
        fs::write(&path, &artifact.contents).map_err(|source| PipelineError::WriteArtifact {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "wrote artifact");
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use piomap_codegen::ArtifactKind;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[project]
name = "adder"
testbench = "1 + 2 = 3"

[[ports]]
name = "clk"
mode = "in"
type = "single bit"

[[ports]]
name = "a"
mode = "in"
type = "bus(31 downto 0)"

[[ports]]
name = "b"
mode = "in"
type = "bus(31 downto 0)"

[[ports]]
name = "sum"
mode = "out"
type = "bus(32 downto 0)"
"#;

    fn global(config: Option<&Path>) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: config.map(|p| p.to_string_lossy().into_owned()),
        }
    }

    // -- project root --

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), PROJECT).unwrap();
        let sub = tmp.path().join("src");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).unwrap(), tmp.path());
    }

    #[test]
    fn find_project_root_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = find_project_root(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("could not find piomap.toml"));
    }

    #[test]
    fn config_flag_accepts_file_or_dir() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join(CONFIG_FILE);
        fs::write(&file, PROJECT).unwrap();

        let (dir, cfg) = resolve_config_location(&global(Some(&file))).unwrap();
        assert_eq!(dir, tmp.path());
        assert_eq!(cfg, file);

        let (dir, cfg) = resolve_config_location(&global(Some(tmp.path()))).unwrap();
        assert_eq!(dir, tmp.path());
        assert_eq!(cfg, file);
    }

    #[test]
    fn config_flag_with_custom_file_name() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("board_a.toml");
        fs::write(&file, PROJECT).unwrap();
        let project = load_project(&global(Some(&file))).unwrap();
        assert_eq!(project.config.project.name, "adder");
        assert_eq!(project.resolved.output_dir, tmp.path().join("build"));
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_project(&global(Some(&tmp.path().join("nope.toml")))).unwrap_err();
        assert!(matches!(err, PipelineError::Config(ConfigError::Read { .. })));
    }

    // -- plan --

    #[test]
    fn plan_drops_clock_and_allocates() {
        let config = piomap_config::load_config_from_str(PROJECT).unwrap();
        let plan = plan(&config).unwrap();
        assert_eq!(plan.design.clock.as_deref(), Some("clk"));
        assert_eq!(plan.design.testbench, "1 + 2 = 3");
        assert_eq!(plan.allocation.registers().len(), 2);
        assert_eq!(plan.allocation.connections().len(), 3);
    }

    #[test]
    fn plan_rejects_bad_port() {
        let toml = r#"
[project]
name = "bad"

[[ports]]
name = "x"
mode = "in"
type = "bus(3 downto 5)"
"#;
        let config = piomap_config::load_config_from_str(toml).unwrap();
        let err = plan(&config).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Alloc(AllocError::InvalidBitRange { high: 3, low: 5, .. })
        ));
    }

    #[test]
    fn options_follow_config_enums() {
        let toml = format!("{PROJECT}\n[toolchain]\nscript = \"bat\"\n\n[manifest]\nformat = \"json\"\n");
        let config = piomap_config::load_config_from_str(&toml).unwrap();
        let resolved = piomap_config::resolve_project(&config, Path::new("/proj")).unwrap();
        let opts = generate_options(&config, &resolved);
        assert_eq!(opts.script, ScriptKind::Bat);
        assert_eq!(opts.manifest_format, ManifestFormat::Json);
        assert_eq!(opts.toolchain, ToolchainPaths::default());
    }

    // -- writing --

    #[test]
    fn write_artifacts_creates_subdirectories() {
        let tmp = TempDir::new().unwrap();
        let config = piomap_config::load_config_from_str(PROJECT).unwrap();
        let resolved = piomap_config::resolve_project(&config, tmp.path()).unwrap();
        let plan = plan(&config).unwrap();
        let artifacts = piomap_codegen::generate_artifacts(
            &plan.allocation,
            &plan.design,
            &generate_options(&config, &resolved),
        )
        .unwrap();

        let out = tmp.path().join("out");
        scaffold_output(&out).unwrap();
        let written = write_artifacts(&out, &artifacts).unwrap();
        assert_eq!(written.len(), artifacts.len());
        assert!(out.join("ip").join("pio64").join("pio64_out.sv").is_file());

        let manifest = artifacts.get(ArtifactKind::Manifest).unwrap();
        let on_disk = fs::read_to_string(out.join(&manifest.path)).unwrap();
        assert_eq!(on_disk, manifest.contents);
    }

    #[test]
    fn scaffold_output_reports_directory_creation_failure() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();
        let err = scaffold_output(&blocker.join("out")).unwrap_err();
        match err {
            PipelineError::DirectoryCreation { path, .. } => {
                assert_eq!(path, blocker.join("out"))
            }
            other => panic!("expected DirectoryCreation, got {other:?}"),
        }
    }
}
