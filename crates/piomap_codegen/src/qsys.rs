//! Bus-system script generation.
//!
//! Emits a line-oriented Platform Designer script: fixed infrastructure
//! (clock source, HPS, memory-mapped bridge), then one block per register
//! in creation order. Each block instantiates the PIO component, exports its
//! conduit, wires clock and reset, and maps it behind the bridge at the
//! register's address.

use piomap_alloc::{Allocation, Register, ADDRESS_STRIDE};

use crate::{BUS_SYSTEM_QSYS_FILE, DEVICE, DEVICE_FAMILY};

/// Renders the bus-system script for `allocation`.
pub fn render_bus_system(allocation: &Allocation) -> String {
    let registers = allocation.registers();
    let mut lines = Vec::new();

    lines.push("package require -exact qsys 16.1".to_string());
    lines.push(String::new());
    lines.push("create_system {soc_system}".to_string());
    lines.push(format!("set_project_property DEVICE_FAMILY {{{DEVICE_FAMILY}}}"));
    lines.push(format!("set_project_property DEVICE {{{DEVICE}}}"));
    lines.push(String::new());
    push_infrastructure(&mut lines, bridge_address_width(registers.len()));

    for reg in registers {
        lines.push(String::new());
        lines.push(format!(
            "# {} @ {}",
            reg.name(),
            base_address_literal(reg.address())
        ));
        for b in allocation.bindings_for(reg.index()) {
            lines.push(format!(
                "# port {} -> {}[{}:{}]",
                b.signal.name(),
                reg.export_name(),
                b.bit_high,
                b.bit_low
            ));
        }
        push_register(&mut lines, reg);
    }

    lines.push(String::new());
    lines.push("set_interconnect_requirement {$system} {qsys_mm.clockCrossingAdapter} {HANDSHAKE}".to_string());
    lines.push("set_interconnect_requirement {$system} {qsys_mm.maxAdditionalLatency} {1}".to_string());
    lines.push(String::new());
    lines.push(format!("save_system {{{BUS_SYSTEM_QSYS_FILE}}}"));
    lines.push(String::new());
    lines.join("\n")
}

/// Renders a register address as the script's base address literal,
/// e.g. `0x0008`.
pub fn base_address_literal(address: u64) -> String {
    format!("0x{address:04x}")
}

/// Address bits the bridge needs to span every register.
fn bridge_address_width(register_count: usize) -> u32 {
    let span = ADDRESS_STRIDE * register_count.max(1) as u64;
    (u64::BITS - (span - 1).leading_zeros()).max(3)
}

fn push_infrastructure(lines: &mut Vec<String>, address_width: u32) {
    let fixed = [
        "add_instance clk_0 clock_source",
        "set_instance_parameter_value clk_0 {clockFrequency} {50000000.0}",
        "set_instance_parameter_value clk_0 {clockFrequencyKnown} {1}",
        "set_instance_parameter_value clk_0 {resetSynchronousEdges} {NONE}",
        "",
        "add_instance hps_0 altera_hps",
        "set_instance_parameter_value hps_0 {F2S_Width} {0}",
        "set_instance_parameter_value hps_0 {S2F_Width} {3}",
        "set_instance_parameter_value hps_0 {LWH2F_Enable} {false}",
        "",
        "add_instance mm_bridge_0 altera_avalon_mm_bridge",
        "set_instance_parameter_value mm_bridge_0 {DATA_WIDTH} {64}",
        "set_instance_parameter_value mm_bridge_0 {ADDRESS_UNITS} {SYMBOLS}",
    ];
    lines.extend(fixed.iter().map(|s| s.to_string()));
    lines.push(format!(
        "set_instance_parameter_value mm_bridge_0 {{ADDRESS_WIDTH}} {{{address_width}}}"
    ));

    let wiring = [
        "",
        "add_interface clk clock sink",
        "set_interface_property clk EXPORT_OF clk_0.clk_in",
        "add_interface reset reset sink",
        "set_interface_property reset EXPORT_OF clk_0.clk_in_reset",
        "add_interface hps_0_h2f_reset reset source",
        "set_interface_property hps_0_h2f_reset EXPORT_OF hps_0.h2f_reset",
        "add_interface memory conduit end",
        "set_interface_property memory EXPORT_OF hps_0.memory",
        "",
        "add_connection clk_0.clk hps_0.h2f_axi_clock",
        "add_connection clk_0.clk mm_bridge_0.clk",
        "add_connection clk_0.clk_reset mm_bridge_0.reset",
        "add_connection hps_0.h2f_axi_master mm_bridge_0.s0",
        "set_connection_parameter_value hps_0.h2f_axi_master/mm_bridge_0.s0 arbitrationPriority {1}",
        "set_connection_parameter_value hps_0.h2f_axi_master/mm_bridge_0.s0 baseAddress {0x0000}",
        "set_connection_parameter_value hps_0.h2f_axi_master/mm_bridge_0.s0 defaultConnection {0}",
    ];
    lines.extend(wiring.iter().map(|s| s.to_string()));
}

fn push_register(lines: &mut Vec<String>, reg: &Register) {
    let name = reg.name();
    let export = reg.export_name();
    let component = reg.component();
    let slave = format!("mm_bridge_0.m0/{name}.s0");

    lines.push(format!("add_instance {name} {component} 1.0"));
    lines.push(format!("add_interface {export} conduit end"));
    lines.push(format!(
        "set_interface_property {export} EXPORT_OF {name}.{component}"
    ));
    lines.push(format!("add_connection clk_0.clk {name}.clock"));
    lines.push(format!("add_connection clk_0.clk_reset {name}.reset"));
    lines.push(format!("add_connection mm_bridge_0.m0 {name}.s0"));
    lines.push(format!(
        "set_connection_parameter_value {slave} arbitrationPriority {{1}}"
    ));
    lines.push(format!(
        "set_connection_parameter_value {slave} baseAddress {{{}}}",
        base_address_literal(reg.address())
    ));
    lines.push(format!(
        "set_connection_parameter_value {slave} defaultConnection {{0}}"
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use piomap_alloc::{allocate, SignalDescriptor};

    fn alloc(ports: &[(&str, &str, &str)]) -> Allocation {
        allocate(
            ports
                .iter()
                .map(|(n, d, t)| SignalDescriptor::parse(n, d, t, "").unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn base_address_literal_is_zero_padded_hex() {
        assert_eq!(base_address_literal(0), "0x0000");
        assert_eq!(base_address_literal(8), "0x0008");
        assert_eq!(base_address_literal(0x1f8), "0x01f8");
        assert_eq!(base_address_literal(0x12340), "0x12340");
    }

    #[test]
    fn bridge_width_covers_all_registers() {
        assert_eq!(bridge_address_width(0), 3);
        assert_eq!(bridge_address_width(1), 3);
        assert_eq!(bridge_address_width(2), 4);
        assert_eq!(bridge_address_width(3), 5);
        assert_eq!(bridge_address_width(4), 5);
        assert_eq!(bridge_address_width(128), 10);
    }

    #[test]
    fn one_block_per_register_with_base_address() {
        let a = alloc(&[("a", "in", "single bit"), ("b", "out", "single bit")]);
        let script = render_bus_system(&a);
        assert!(script.contains("add_instance pio_out_0 pio64_out 1.0"));
        assert!(script.contains("add_instance pio_in_1 pio64_in 1.0"));
        assert!(script.contains(
            "set_connection_parameter_value mm_bridge_0.m0/pio_out_0.s0 baseAddress {0x0000}"
        ));
        assert!(script.contains(
            "set_connection_parameter_value mm_bridge_0.m0/pio_in_1.s0 baseAddress {0x0008}"
        ));
        assert!(script.contains("set_interface_property pio_in_1_export EXPORT_OF pio_in_1.pio64_in"));
        assert!(script.contains("add_connection clk_0.clk_reset pio_out_0.reset"));
    }

    #[test]
    fn registers_emitted_in_creation_order() {
        let a = alloc(&[
            ("a", "in", "single bit"),
            ("b", "out", "single bit"),
            ("c", "in", "single bit"),
        ]);
        let script = render_bus_system(&a);
        let p0 = script.find("add_instance pio_out_0").unwrap();
        let p1 = script.find("add_instance pio_in_1").unwrap();
        let p2 = script.find("add_instance pio_out_2").unwrap();
        assert!(p0 < p1 && p1 < p2);
    }

    #[test]
    fn port_comments_follow_connection_order() {
        let a = alloc(&[
            ("first", "in", "bus(7 downto 0)"),
            ("second", "in", "bus(3 downto 0)"),
        ]);
        let script = render_bus_system(&a);
        let first = script.find("# port first -> pio_out_0_export[63:56]").unwrap();
        let second = script.find("# port second -> pio_out_0_export[55:52]").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_allocation_still_saves_system() {
        let script = render_bus_system(&Allocation::default());
        assert!(!script.contains("pio64_"));
        assert!(script.trim_end().ends_with("save_system {soc_system.qsys}"));
    }
}
