//! Toolchain steps and the automation script that runs them.
//!
//! [`toolchain_steps`] is the single source of the step list. The rendered
//! script and the in-process runner both consume it, so they cannot drift.

use std::fmt;
use std::path::Path;

use crate::{BUS_SYSTEM_FILE, BUS_SYSTEM_QSYS_FILE, PROJECT_NAME, PROJECT_SCRIPT_FILE};

/// Vendor executables invoked by the toolchain steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPaths {
    /// Project shell and compiler (`quartus_sh`).
    pub quartus_sh: String,
    /// Bus-system script runner (`qsys-script`).
    pub qsys_script: String,
    /// Bus-system HDL generator (`qsys-generate`).
    pub qsys_generate: String,
    /// Bitstream converter (`quartus_cpf`).
    pub quartus_cpf: String,
}

impl Default for ToolchainPaths {
    fn default() -> Self {
        Self {
            quartus_sh: "quartus_sh".to_string(),
            qsys_script: "qsys-script".to_string(),
            qsys_generate: "qsys-generate".to_string(),
            quartus_cpf: "quartus_cpf".to_string(),
        }
    }
}

/// One external command, run from the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainStep {
    /// What the step does, used in logs and failure messages.
    pub description: String,
    /// Executable to run.
    pub program: String,
    /// Arguments, unquoted.
    pub args: Vec<String>,
}

impl fmt::Display for ToolchainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// The ordered steps that turn the generated files into a bitstream.
pub fn toolchain_steps(paths: &ToolchainPaths, design_name: &str) -> Vec<ToolchainStep> {
    let step = |description: &str, program: &str, args: &[&str]| ToolchainStep {
        description: description.to_string(),
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    };
    let script_arg = format!("--script={BUS_SYSTEM_FILE}");
    let project_file = format!("{PROJECT_NAME}.qpf");
    let sof = format!("output_files/{PROJECT_NAME}.sof");
    let rbf = format!("{design_name}.rbf");

    vec![
        step(
            "create project",
            &paths.quartus_sh,
            &["-t", PROJECT_SCRIPT_FILE],
        ),
        step(
            "generate bus system",
            &paths.qsys_script,
            &[script_arg.as_str()],
        ),
        step(
            "generate bus system HDL",
            &paths.qsys_generate,
            &["--synthesis=VHDL", BUS_SYSTEM_QSYS_FILE],
        ),
        step(
            "compile project",
            &paths.quartus_sh,
            &["--flow", "compile", project_file.as_str()],
        ),
        step(
            "convert bitstream",
            &paths.quartus_cpf,
            &["-c", sof.as_str(), rbf.as_str()],
        ),
    ]
}

/// Automation script flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptKind {
    /// Windows batch file.
    Bat,
    /// POSIX shell script.
    #[default]
    Sh,
}

impl ScriptKind {
    /// Output file name for this flavor.
    pub fn file_name(self) -> &'static Path {
        match self {
            ScriptKind::Bat => Path::new("generate_and_program.bat"),
            ScriptKind::Sh => Path::new("generate_and_program.sh"),
        }
    }
}

/// Renders `steps` as a script of the given flavor.
///
/// Each step reports its own failure and the script carries on, matching
/// the in-process runner.
pub fn render_script(kind: ScriptKind, steps: &[ToolchainStep]) -> String {
    match kind {
        ScriptKind::Sh => render_sh(steps),
        ScriptKind::Bat => render_bat(steps),
    }
}

fn render_sh(steps: &[ToolchainStep]) -> String {
    let mut out = String::from("#!/bin/sh\ncd \"$(dirname \"$0\")\"\n");
    for step in steps {
        out.push_str(&format!("\n# {}\n", step.description));
        out.push_str(&sh_quote(&step.program));
        for arg in &step.args {
            out.push(' ');
            out.push_str(&sh_quote(arg));
        }
        out.push_str(&format!(
            " || echo \"step failed: {}\" >&2\n",
            step.description
        ));
    }
    out
}

fn render_bat(steps: &[ToolchainStep]) -> String {
    let mut out = String::from("@echo off\r\ncd /d \"%~dp0\"\r\n");
    for step in steps {
        out.push_str(&format!("\r\nrem {}\r\n", step.description));
        out.push_str(&format!("\"{}\"", step.program));
        for arg in &step.args {
            out.push(' ');
            out.push_str(&arg.replace('/', "\\"));
        }
        out.push_str(&format!(
            "\r\nif errorlevel 1 echo step failed: {}\r\n",
            step.description
        ));
    }
    out.push_str("\r\npause\r\n");
    out
}

fn sh_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\\''"))
    }
}
