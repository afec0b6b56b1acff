//! `piomap init`: project scaffolding command.
//!
//! Creates a project directory with a `piomap.toml` describing a small
//! counter design and a matching VHDL source in `src/`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use piomap_config::CONFIG_FILE;

use crate::GlobalArgs;

/// Runs the `piomap init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
/// Returns exit code 0 on success.
pub fn run(name: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            dir
        }
        None => std::env::current_dir()?,
    };

    let design_name = project_dir
        .file_name()
        .and_then(|n| n.to_str())
        .map(design_name_from)
        .unwrap_or_else(|| "my_design".to_string());

    if project_dir.join(CONFIG_FILE).exists() {
        return Err(format!("{} already exists", project_dir.join(CONFIG_FILE).display()).into());
    }

    if !global.quiet {
        eprintln!("  Creating new piomap project `{design_name}`");
    }

    fs::create_dir_all(project_dir.join("src"))?;
    write_config(&project_dir, &design_name)?;
    write_design(&project_dir, &design_name)?;

    if !global.quiet {
        eprintln!("     Created {}", project_dir.join(CONFIG_FILE).display());
        eprintln!(
            "     Created {}",
            project_dir
                .join("src")
                .join(format!("{design_name}.vhd"))
                .display()
        );
    }
    Ok(0)
}

/// Turns a directory name into a usable HDL identifier.
fn design_name_from(dir_name: &str) -> String {
    let mut name: String = dir_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name.insert_str(0, "d_");
    }
    name
}

/// Writes the `piomap.toml` project description.
fn write_config(root: &Path, name: &str) -> io::Result<()> {
    let content = format!(
        r#"[project]
name = "{name}"
testbench = ""
clock = "clk"
output = "build"
hdl_files = ["src/{name}.vhd"]

# One entry per port, in declaration order. The clock port is routed
# directly and never occupies a register.
[[ports]]
name = "clk"
mode = "in"
type = "single bit"

[[ports]]
name = "rst"
mode = "in"
type = "single bit"
description = "synchronous reset"

[[ports]]
name = "count"
mode = "out"
type = "bus(7 downto 0)"
description = "counter value"

[toolchain]
quartus_sh = "quartus_sh"
qsys_script = "qsys-script"
qsys_generate = "qsys-generate"
quartus_cpf = "quartus_cpf"
script = "sh"

[manifest]
format = "xml"
"#
    );
    fs::write(root.join(CONFIG_FILE), content)
}

/// Writes a counter entity matching the template ports.
fn write_design(root: &Path, name: &str) -> io::Result<()> {
    let content = format!(
        r#"library ieee;
use ieee.std_logic_1164.all;
use ieee.numeric_std.all;

entity {name} is
    port (
        clk   : in  std_logic;
        rst   : in  std_logic;
        count : out std_logic_vector(7 downto 0)
    );
end entity {name};

architecture rtl of {name} is
    signal value : unsigned(7 downto 0) := (others => '0');
begin
    process (clk)
    begin
        if rising_edge(clk) then
            if rst = '1' then
                value <= (others => '0');
            else
                value <= value + 1;
            end if;
        end if;
    end process;

    count <= std_logic_vector(value);
end architecture rtl;
"#
    );
    fs::write(root.join("src").join(format!("{name}.vhd")), content)
}
