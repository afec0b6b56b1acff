//! Interconnect module generation.
//!
//! The generated top level declares one 64-bit wire per register, binds each
//! port of the user design to its bit slice of that wire, and connects the
//! wires to the exported conduits of the bus system. The clock port bypasses
//! the registers and is tied to the board oscillator.

use piomap_alloc::{Allocation, REGISTER_WIDTH};

use crate::{DesignInfo, PROJECT_NAME};

/// Board oscillator driving both the bus system and the user design clock.
pub const BOARD_CLOCK: &str = "FPGA_CLK1_50";

/// Top-level ports of the board, fixed by its pinout.
const BOARD_PORTS: &[&str] = &[
    "input  wire        FPGA_CLK1_50",
    "output wire [14:0] HPS_DDR3_ADDR",
    "output wire [2:0]  HPS_DDR3_BA",
    "output wire        HPS_DDR3_CAS_N",
    "output wire        HPS_DDR3_CKE",
    "output wire        HPS_DDR3_CK_N",
    "output wire        HPS_DDR3_CK_P",
    "output wire        HPS_DDR3_CS_N",
    "output wire [3:0]  HPS_DDR3_DM",
    "inout  wire [31:0] HPS_DDR3_DQ",
    "inout  wire [3:0]  HPS_DDR3_DQS_N",
    "inout  wire [3:0]  HPS_DDR3_DQS_P",
    "output wire        HPS_DDR3_ODT",
    "output wire        HPS_DDR3_RAS_N",
    "output wire        HPS_DDR3_RESET_N",
    "input  wire        HPS_DDR3_RZQ",
    "output wire        HPS_DDR3_WE_N",
];

/// Bus-system ports that do not depend on the allocation.
const SOC_FIXED_BINDINGS: &[&str] = &[
    ".clk_clk                 (FPGA_CLK1_50)",
    ".reset_reset_n           (1'b1)",
    ".memory_mem_a            (HPS_DDR3_ADDR)",
    ".memory_mem_ba           (HPS_DDR3_BA)",
    ".memory_mem_ck           (HPS_DDR3_CK_P)",
    ".memory_mem_ck_n         (HPS_DDR3_CK_N)",
    ".memory_mem_cke          (HPS_DDR3_CKE)",
    ".memory_mem_cs_n         (HPS_DDR3_CS_N)",
    ".memory_mem_ras_n        (HPS_DDR3_RAS_N)",
    ".memory_mem_cas_n        (HPS_DDR3_CAS_N)",
    ".memory_mem_we_n         (HPS_DDR3_WE_N)",
    ".memory_mem_reset_n      (HPS_DDR3_RESET_N)",
    ".memory_mem_dq           (HPS_DDR3_DQ)",
    ".memory_mem_dqs          (HPS_DDR3_DQS_P)",
    ".memory_mem_dqs_n        (HPS_DDR3_DQS_N)",
    ".memory_mem_odt          (HPS_DDR3_ODT)",
    ".memory_mem_dm           (HPS_DDR3_DM)",
    ".memory_oct_rzqin        (HPS_DDR3_RZQ)",
    ".hps_0_h2f_reset_reset_n ()",
];

/// Renders the interconnect module for `allocation`.
pub fn render_interconnect(allocation: &Allocation, design: &DesignInfo) -> String {
    let mut lines = Vec::new();

    lines.push(format!("module {PROJECT_NAME} ("));
    push_comma_list(&mut lines, "    ", BOARD_PORTS.iter().map(|p| p.to_string()));
    lines.push(");".to_string());
    lines.push(String::new());

    for reg in allocation.registers() {
        lines.push(format!(
            "wire [{}:0] {};",
            REGISTER_WIDTH - 1,
            reg.export_name()
        ));
    }
    if !allocation.registers().is_empty() {
        lines.push(String::new());
    }

    let mut bindings = Vec::new();
    if let Some(clock) = &design.clock {
        bindings.push(format!(".{clock}({BOARD_CLOCK})"));
    }
    for b in allocation.bindings() {
        bindings.push(format!(
            ".{}({}[{}:{}])",
            b.signal.name(),
            b.register.export_name(),
            b.bit_high,
            b.bit_low
        ));
    }
    lines.push(format!("{name} my_{name} (", name = design.name));
    push_comma_list(&mut lines, "    ", bindings.into_iter());
    lines.push(");".to_string());
    lines.push(String::new());

    let soc_bindings = SOC_FIXED_BINDINGS
        .iter()
        .map(|b| b.to_string())
        .chain(allocation.registers().iter().map(|reg| {
            format!(".{export}_export({export})", export = reg.export_name())
        }));
    lines.push("soc_system u0 (".to_string());
    push_comma_list(&mut lines, "    ", soc_bindings);
    lines.push(");".to_string());
    lines.push(String::new());
    lines.push("endmodule".to_string());
    lines.push(String::new());
    lines.join("\n")
}

/// Pushes `items` one per line, comma-separated with no trailing comma.
fn push_comma_list(lines: &mut Vec<String>, indent: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    let last = items.len().saturating_sub(1);
    for (i, item) in items.into_iter().enumerate() {
        let sep = if i == last { "" } else { "," };
        lines.push(format!("{indent}{item}{sep}"));
    }
}
