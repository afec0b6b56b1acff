//! Error types for project description loading and validation.

use std::path::PathBuf;

/// Errors raised while reading or validating a project description.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The project description file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Relative paths could not be anchored because the working directory
    /// is unavailable.
    #[error("cannot determine the working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    /// The file is not valid TOML or does not match the `piomap.toml` schema.
    #[error("malformed project description: {0}")]
    Syntax(String),

    /// A required setting is empty.
    #[error("project description setting `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A name that ends up unquoted in generated HDL or Tcl.
    #[error("project description setting `{field}` = '{value}' is not a valid HDL identifier")]
    InvalidIdentifier {
        /// Dotted key of the setting.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn read_error_names_the_file() {
        let err = ConfigError::Read {
            path: PathBuf::from("/proj/piomap.toml"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(format!("{err}"), "cannot read /proj/piomap.toml: no such file");
    }

    #[test]
    fn display_empty_field() {
        let err = ConfigError::EmptyField("project.name");
        assert_eq!(
            format!("{err}"),
            "project description setting `project.name` must not be empty"
        );
    }

    #[test]
    fn display_invalid_identifier() {
        let err = ConfigError::InvalidIdentifier {
            field: "project.clock",
            value: "sys clk".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "project description setting `project.clock` = 'sys clk' is not a valid HDL identifier"
        );
    }

    #[test]
    fn working_dir_keeps_source() {
        use std::error::Error;
        let err = ConfigError::WorkingDir(io::Error::other("gone"));
        assert!(err.source().is_some());
    }
}
