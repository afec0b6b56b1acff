//! Artifact generation for memory-mapped PIO bridges.
//!
//! Every generator in this crate is a pure function of one
//! [`Allocation`](piomap_alloc::Allocation). The bus-system script, the
//! interconnect module and the address manifest never compute addresses or
//! bit slices themselves; they read them from the allocation, so the three
//! files always agree.
//!
//! [`generate_artifacts`] renders the complete output set: the three core
//! artifacts plus the project script, the automation script and the PIO
//! component sources the bus system instantiates.

#![warn(missing_docs)]

pub mod error;
pub mod ip;
pub mod manifest;
pub mod project;
pub mod qsys;
pub mod script;
pub mod top;

use std::path::{Path, PathBuf};

use piomap_alloc::{Allocation, Direction};

pub use error::CodegenError;
pub use manifest::{Manifest, ManifestEntry, ManifestFormat};
pub use script::{ScriptKind, ToolchainPaths, ToolchainStep};

/// Name of the generated vendor project and of its top-level module.
pub const PROJECT_NAME: &str = "DE10_NANO_SoC_GHRD";

/// Device family of the target board.
pub const DEVICE_FAMILY: &str = "Cyclone V";

/// Part number of the target board's FPGA.
pub const DEVICE: &str = "5CSEBA6U23I7";

/// Bus-system script file name.
pub const BUS_SYSTEM_FILE: &str = "soc_system.tcl";

/// Bus-system file produced by running the bus-system script.
pub const BUS_SYSTEM_QSYS_FILE: &str = "soc_system.qsys";

/// Interconnect module file name.
pub const INTERCONNECT_FILE: &str = "DE10_NANO_SoC_GHRD.v";

/// Project creation script file name.
pub const PROJECT_SCRIPT_FILE: &str = "DE10_NANO_SoC_GHRD.tcl";

/// Identity of the user design being bridged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignInfo {
    /// Entity/module name of the user design.
    pub name: String,
    /// Name of the design's global clock port, if it has one.
    pub clock: Option<String>,
    /// Testbench note, copied opaquely into the manifest.
    pub testbench: String,
}

/// Everything besides the allocation that the generators need.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Absolute HDL sources of the user design.
    pub hdl_files: Vec<PathBuf>,
    /// Vendor executables for the automation script.
    pub toolchain: ToolchainPaths,
    /// Automation script flavor.
    pub script: ScriptKind,
    /// Manifest serialization.
    pub manifest_format: ManifestFormat,
}

/// What a generated file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Bus-system script.
    BusSystem,
    /// Top-level interconnect module.
    Interconnect,
    /// Address manifest for the on-device runtime.
    Manifest,
    /// Vendor project creation script.
    ProjectScript,
    /// Script running the toolchain steps in order.
    AutomationScript,
    /// PIO component description (`_hw.tcl`).
    IpComponent,
    /// PIO component HDL source.
    IpSource,
}

/// One rendered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// What the file is.
    pub kind: ArtifactKind,
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// Full file contents.
    pub contents: String,
}

/// The full, ordered set of generated files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    files: Vec<Artifact>,
}

impl Artifacts {
    /// All files in generation order.
    pub fn files(&self) -> &[Artifact] {
        &self.files
    }

    /// The first file of the given kind.
    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.files.iter().find(|a| a.kind == kind)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing was generated.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn push(&mut self, kind: ArtifactKind, path: impl AsRef<Path>, contents: String) {
        self.files.push(Artifact {
            kind,
            path: path.as_ref().to_path_buf(),
            contents,
        });
    }
}

/// Renders every artifact for one allocation.
///
/// The three core artifacts are rendered concurrently; they only read the
/// allocation. Output order is fixed regardless of which finishes first.
pub fn generate_artifacts(
    allocation: &Allocation,
    design: &DesignInfo,
    options: &GenerateOptions,
) -> Result<Artifacts, CodegenError> {
    let (bus_system, (interconnect, manifest)) = rayon::join(
        || qsys::render_bus_system(allocation),
        || {
            rayon::join(
                || top::render_interconnect(allocation, design),
                || manifest::render_manifest(allocation, design, options.manifest_format),
            )
        },
    );
    let manifest = manifest?;

    let mut artifacts = Artifacts::default();
    artifacts.push(ArtifactKind::BusSystem, BUS_SYSTEM_FILE, bus_system);
    artifacts.push(ArtifactKind::Interconnect, INTERCONNECT_FILE, interconnect);
    artifacts.push(
        ArtifactKind::Manifest,
        options.manifest_format.file_name(),
        manifest,
    );
    artifacts.push(
        ArtifactKind::ProjectScript,
        PROJECT_SCRIPT_FILE,
        project::render_project_script(&design.name, &options.hdl_files),
    );

    let steps = script::toolchain_steps(&options.toolchain, &design.name);
    artifacts.push(
        ArtifactKind::AutomationScript,
        options.script.file_name(),
        script::render_script(options.script, &steps),
    );

    for direction in [Direction::In, Direction::Out] {
        artifacts.push(
            ArtifactKind::IpComponent,
            ip::component_file(direction),
            ip::render_component(direction),
        );
        artifacts.push(
            ArtifactKind::IpSource,
            ip::source_file(direction),
            ip::render_source(direction),
        );
    }

    tracing::info!(files = artifacts.len(), "rendered artifacts");
    Ok(artifacts)
}

/// Renders a path with forward slashes, as the vendor Tcl shells expect.
pub(crate) fn tcl_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    if s.chars().any(char::is_whitespace) {
        format!("{{{s}}}")
    } else {
        s
    }
}
