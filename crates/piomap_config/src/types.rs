//! Configuration types deserialized from `piomap.toml`.

use serde::Deserialize;

/// The top-level project description parsed from `piomap.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Design metadata (name, testbench note, sources).
    pub project: ProjectMeta,
    /// Port declarations of the top-level design, in declaration order.
    #[serde(default)]
    pub ports: Vec<PortDecl>,
    /// Vendor toolchain executables and automation script flavor.
    #[serde(default)]
    pub toolchain: ToolchainConfig,
    /// Address manifest settings.
    #[serde(default)]
    pub manifest: ManifestConfig,
}

/// Design metadata required in every `piomap.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// Name of the top-level design entity; also used for generated names.
    pub name: String,
    /// Testbench note copied verbatim into the address manifest.
    #[serde(default)]
    pub testbench: String,
    /// Name of the global clock port. It is wired straight to the board
    /// clock instead of through a register.
    #[serde(default = "default_clock")]
    pub clock: String,
    /// Output directory for the generated project, relative to the project
    /// directory unless absolute.
    #[serde(default = "default_output")]
    pub output: String,
    /// HDL sources of the design, relative to the project directory unless
    /// absolute.
    #[serde(default)]
    pub hdl_files: Vec<String>,
}

fn default_clock() -> String {
    "clk".to_string()
}

fn default_output() -> String {
    "build".to_string()
}

/// One port of the top-level design, exactly as declared.
///
/// The strings are not interpreted here; direction and type are parsed by
/// the allocator so that malformed ports are reported with its error kinds.
#[derive(Debug, Clone, Deserialize)]
pub struct PortDecl {
    /// Port name.
    pub name: String,
    /// `"in"` or `"out"`.
    pub mode: String,
    /// `"single bit"` or `"bus(H downto L)"`.
    #[serde(rename = "type")]
    pub type_expr: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Paths of the vendor executables driven by the automation script.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainConfig {
    /// Project shell (`quartus_sh`).
    #[serde(default = "default_quartus_sh")]
    pub quartus_sh: String,
    /// Bus-system scripting tool (`qsys-script`).
    #[serde(default = "default_qsys_script")]
    pub qsys_script: String,
    /// Bus-system HDL generator (`qsys-generate`).
    #[serde(default = "default_qsys_generate")]
    pub qsys_generate: String,
    /// Programming-file converter (`quartus_cpf`).
    #[serde(default = "default_quartus_cpf")]
    pub quartus_cpf: String,
    /// Flavor of the generated automation script.
    #[serde(default)]
    pub script: ScriptKind,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            quartus_sh: default_quartus_sh(),
            qsys_script: default_qsys_script(),
            qsys_generate: default_qsys_generate(),
            quartus_cpf: default_quartus_cpf(),
            script: ScriptKind::default(),
        }
    }
}

fn default_quartus_sh() -> String {
    "quartus_sh".to_string()
}

fn default_qsys_script() -> String {
    "qsys-script".to_string()
}

fn default_qsys_generate() -> String {
    "qsys-generate".to_string()
}

fn default_quartus_cpf() -> String {
    "quartus_cpf".to_string()
}

/// Automation script flavor.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Windows batch file.
    Bat,
    /// POSIX shell script (default).
    #[default]
    Sh,
}

/// Address manifest configuration.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ManifestConfig {
    /// Serialization format of the manifest.
    #[serde(default)]
    pub format: ManifestFormat,
}

/// Serialization format of the address manifest.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    /// XML, as read by the on-device runtime (default).
    #[default]
    Xml,
    /// JSON.
    Json,
}
