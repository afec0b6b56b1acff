//! The 64-bit PIO register component instantiated by the bus system.
//!
//! Two flavors exist, named by register direction: `pio64_in` is read by
//! the bus master and samples its conduit, `pio64_out` is written by the
//! bus master and drives its conduit. Their text does not depend on the
//! allocation.

use std::path::PathBuf;

use piomap_alloc::{Direction, REGISTER_WIDTH};

/// Component type name for a register direction.
pub fn component_name(direction: Direction) -> String {
    format!("pio64_{direction}")
}

/// Path of the component description, relative to the output directory.
pub fn component_file(direction: Direction) -> PathBuf {
    PathBuf::from(format!("{}_hw.tcl", component_name(direction)))
}

/// Path of the component HDL source, relative to the output directory.
pub fn source_file(direction: Direction) -> PathBuf {
    PathBuf::from(format!("ip/pio64/{}.sv", component_name(direction)))
}

/// Renders the component description loaded by the bus-system tool.
pub fn render_component(direction: Direction) -> String {
    let name = component_name(direction);
    let width = REGISTER_WIDTH;
    let source = source_file(direction).to_string_lossy().replace('\\', "/");
    let (conduit_dir, display) = match direction {
        Direction::In => ("input", "64-bit input PIO"),
        Direction::Out => ("output", "64-bit output PIO"),
    };

    let mut lines = vec![
        "package require -exact qsys 16.1".to_string(),
        String::new(),
        format!("set_module_property NAME {name}"),
        "set_module_property VERSION 1.0".to_string(),
        format!("set_module_property DISPLAY_NAME \"{display}\""),
        format!("set_module_property TOP_LEVEL_HDL_FILE {source}"),
        format!("set_module_property TOP_LEVEL_HDL_MODULE {name}"),
        "set_module_property INSTANTIATE_IN_SYSTEM_MODULE true".to_string(),
        "set_module_property EDITABLE false".to_string(),
        String::new(),
        "add_fileset QUARTUS_SYNTH QUARTUS_SYNTH \"\" \"\"".to_string(),
        format!("set_fileset_property QUARTUS_SYNTH TOP_LEVEL {name}"),
        format!("add_fileset_file {name}.sv SYSTEM_VERILOG PATH {source} TOP_LEVEL_FILE"),
        String::new(),
        "add_interface clock clock end".to_string(),
        "set_interface_property clock clockRate 0".to_string(),
        "add_interface_port clock clk clk Input 1".to_string(),
        String::new(),
        "add_interface reset reset end".to_string(),
        "set_interface_property reset associatedClock clock".to_string(),
        "set_interface_property reset synchronousEdges DEASSERT".to_string(),
        "add_interface_port reset reset reset Input 1".to_string(),
        String::new(),
        "add_interface s0 avalon end".to_string(),
        "set_interface_property s0 addressUnits WORDS".to_string(),
        "set_interface_property s0 associatedClock clock".to_string(),
        "set_interface_property s0 associatedReset reset".to_string(),
        "set_interface_property s0 readLatency 0".to_string(),
        "set_interface_property s0 readWaitTime 1".to_string(),
        "set_interface_property s0 writeWaitTime 0".to_string(),
    ];
    match direction {
        Direction::In => {
            lines.push("add_interface_port s0 avs_s0_read read Input 1".to_string());
            lines.push(format!(
                "add_interface_port s0 avs_s0_readdata readdata Output {width}"
            ));
        }
        Direction::Out => {
            lines.push("add_interface_port s0 avs_s0_write write Input 1".to_string());
            lines.push(format!(
                "add_interface_port s0 avs_s0_writedata writedata Input {width}"
            ));
            lines.push(format!(
                "add_interface_port s0 avs_s0_byteenable byteenable Input {}",
                width / 8
            ));
        }
    }
    lines.push(String::new());
    lines.push(format!("add_interface {name} conduit end"));
    lines.push(format!("set_interface_property {name} associatedClock clock"));
    lines.push(format!(
        "add_interface_port {name} coe_export export {} {width}",
        capitalize(conduit_dir)
    ));
    lines.push(String::new());
    lines.join("\n")
}

/// Renders the component HDL source.
pub fn render_source(direction: Direction) -> String {
    let name = component_name(direction);
    let msb = REGISTER_WIDTH - 1;
    let bytes = REGISTER_WIDTH / 8;
    match direction {
        Direction::In => format!(
            "module {name} (
    input  wire        clk,
    input  wire        reset,
    input  wire        avs_s0_read,
    output wire [{msb}:0] avs_s0_readdata,
    input  wire [{msb}:0] coe_export
);

    assign avs_s0_readdata = coe_export;

endmodule
"
        ),
        Direction::Out => format!(
            "module {name} (
    input  wire        clk,
    input  wire        reset,
    input  wire        avs_s0_write,
    input  wire [{msb}:0] avs_s0_writedata,
    input  wire [{bmsb}:0]  avs_s0_byteenable,
    output reg  [{msb}:0] coe_export
);

    integer i;

    always @(posedge clk) begin
        if (reset) begin
            coe_export <= {REGISTER_WIDTH}'d0;
        end else if (avs_s0_write) begin
            for (i = 0; i < {bytes}; i = i + 1) begin
                if (avs_s0_byteenable[i])
                    coe_export[i*8 +: 8] <= avs_s0_writedata[i*8 +: 8];
            end
        end
    end

endmodule
",
            bmsb = bytes - 1
        ),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
