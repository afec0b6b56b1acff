//! Configuration file loading and validation.

use piomap_alloc::is_hdl_identifier;

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name of the project description inside a project directory.
pub const CONFIG_FILE: &str = "piomap.toml";

/// Loads and validates `piomap.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE))
}

/// Loads and validates a project description from an explicit file path.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_config_from_str(&content)
}

/// Parses and validates a project description from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::Syntax(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates required fields and the identifiers that end up in generated HDL.
///
/// Port names are checked later, during signal extraction, together with
/// their direction and type.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    let project = &config.project;
    require_identifier("project.name", &project.name)?;
    require_identifier("project.clock", &project.clock)?;
    if project.output.is_empty() {
        return Err(ConfigError::EmptyField("project.output"));
    }
    Ok(())
}

fn require_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::EmptyField(field));
    }
    if !is_hdl_identifier(value) {
        return Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
