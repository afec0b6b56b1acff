//! Parsing and validation of `piomap.toml` project description files.
//!
//! This crate reads the project description and produces a strongly-typed
//! [`ProjectConfig`]: the design name, its ordered port declarations, the
//! HDL sources and the vendor toolchain paths. [`resolve_project`] then
//! turns relative paths into the absolute form the generators need.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE};
pub use resolve::{resolve_project, ResolvedProject};
pub use types::*;
