//! Vendor project creation script.
//!
//! The script creates the project for the target device, adds the generated
//! bus system and interconnect module, and assigns every user HDL source
//! with the file-type keyword matching its extension.

use std::path::{Path, PathBuf};

use crate::top::BOARD_CLOCK;
use crate::{tcl_path, DEVICE, DEVICE_FAMILY, INTERCONNECT_FILE, PROJECT_NAME};

/// Pin carrying the 50 MHz board oscillator.
const BOARD_CLOCK_PIN: &str = "PIN_V11";

/// Maps an HDL source to its project assignment keyword.
pub fn file_assignment(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("vhd" | "vhdl") => "VHDL_FILE",
        Some("v") => "VERILOG_FILE",
        Some("sv") => "SYSTEMVERILOG_FILE",
        _ => {
            tracing::warn!(path = %path.display(), "unrecognized HDL extension, adding as SOURCE_FILE");
            "SOURCE_FILE"
        }
    }
}

/// Renders the project creation script.
///
/// `hdl_files` are added in order after the generated interconnect module.
pub fn render_project_script(design_name: &str, hdl_files: &[PathBuf]) -> String {
    let mut lines = vec![
        "load_package flow".to_string(),
        String::new(),
        format!("project_new {PROJECT_NAME} -overwrite"),
        String::new(),
        format!("set_global_assignment -name FAMILY \"{DEVICE_FAMILY}\""),
        format!("set_global_assignment -name DEVICE {DEVICE}"),
        format!("set_global_assignment -name TOP_LEVEL_ENTITY {PROJECT_NAME}"),
        "set_global_assignment -name PROJECT_OUTPUT_DIRECTORY output_files".to_string(),
        String::new(),
        "set_global_assignment -name QIP_FILE soc_system/synthesis/soc_system.qip".to_string(),
        format!("set_global_assignment -name VERILOG_FILE {INTERCONNECT_FILE}"),
        String::new(),
        format!("# sources of {design_name}"),
    ];
    for file in hdl_files {
        lines.push(format!(
            "set_global_assignment -name {} {}",
            file_assignment(file),
            tcl_path(file)
        ));
    }
    lines.push(String::new());
    lines.push(format!(
        "set_location_assignment {BOARD_CLOCK_PIN} -to {BOARD_CLOCK}"
    ));
    lines.push(format!(
        "set_instance_assignment -name IO_STANDARD \"3.3-V LVTTL\" -to {BOARD_CLOCK}"
    ));
    lines.push(String::new());
    lines.push("project_close".to_string());
    lines.push(String::new());
    lines.join("\n")
}
