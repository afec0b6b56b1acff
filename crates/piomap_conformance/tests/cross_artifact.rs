//! The bus-system script, interconnect module and manifest must agree on the
//! address and bit slice of every port. Each artifact is parsed back from
//! its rendered text and compared against the others.

use std::collections::BTreeMap;

use piomap_codegen::{ArtifactKind, Manifest, ManifestFormat};
use piomap_conformance::{
    bus_system_base_addresses, bus_system_port_slices, full_pipeline, full_pipeline_ports,
    interconnect_port_slices, make_config_toml, manifest_xml_locations, register_of_export,
    PipelineResult, PortLocation,
};

const MIXED: &[(&str, &str, &str)] = &[
    ("clk", "in", "single bit"),
    ("rst", "in", "single bit"),
    ("wr_en", "in", "single bit"),
    ("wr_data", "in", "bus(31 downto 0)"),
    ("rd_en", "in", "single bit"),
    ("rd_data", "out", "bus(31 downto 0)"),
    ("full", "out", "single bit"),
    ("empty", "out", "single bit"),
    ("level", "out", "bus(4 downto 0)"),
    ("big", "in", "bus(47 downto 0)"),
    ("big2", "in", "bus(47 downto 0)"),
];

/// Locations derived from the bus-system script: port comments give the
/// slice, `baseAddress` of the owning register gives the address.
fn bus_system_locations(result: &PipelineResult) -> BTreeMap<String, PortLocation> {
    let script = result.text(ArtifactKind::BusSystem);
    let bases = bus_system_base_addresses(script);
    bus_system_port_slices(script)
        .into_iter()
        .map(|(name, (export, high, low))| {
            let address = bases[register_of_export(&export)];
            (
                name,
                PortLocation {
                    address,
                    bit_high: high,
                    bit_low: low,
                },
            )
        })
        .collect()
}

/// Locations derived from the interconnect module, with addresses taken
/// from the bus-system script for the bound wire.
fn interconnect_locations(result: &PipelineResult) -> BTreeMap<String, PortLocation> {
    let bases = bus_system_base_addresses(result.text(ArtifactKind::BusSystem));
    interconnect_port_slices(result.text(ArtifactKind::Interconnect))
        .into_iter()
        .map(|(name, (export, high, low))| {
            let address = bases[register_of_export(&export)];
            (
                name,
                PortLocation {
                    address,
                    bit_high: high,
                    bit_low: low,
                },
            )
        })
        .collect()
}

#[test]
fn manifest_bus_system_and_interconnect_agree() {
    let result = full_pipeline_ports("fifo", MIXED);

    let manifest = manifest_xml_locations(result.text(ArtifactKind::Manifest));
    let qsys = bus_system_locations(&result);
    let top = interconnect_locations(&result);

    assert_eq!(manifest.len(), MIXED.len() - 1);
    assert_eq!(manifest, qsys);
    assert_eq!(manifest, top);
}

#[test]
fn artifacts_agree_with_allocation() {
    let result = full_pipeline_ports("fifo", MIXED);
    let manifest = manifest_xml_locations(result.text(ArtifactKind::Manifest));
    for b in result.allocation.bindings() {
        assert_eq!(
            manifest[b.signal.name()],
            PortLocation {
                address: b.address(),
                bit_high: b.bit_high,
                bit_low: b.bit_low,
            },
            "port {}",
            b.signal.name()
        );
    }
}

#[test]
fn every_register_has_a_base_address_and_wire() {
    let result = full_pipeline_ports("fifo", MIXED);
    let bases = bus_system_base_addresses(result.text(ArtifactKind::BusSystem));
    let top = result.text(ArtifactKind::Interconnect);

    assert_eq!(bases.len(), result.allocation.registers().len());
    for reg in result.allocation.registers() {
        assert_eq!(bases[&reg.name()], reg.address());
        assert!(top.contains(&format!("wire [63:0] {};", reg.export_name())));
        assert!(top.contains(&format!(
            ".{e}_export({e})",
            e = reg.export_name()
        )));
    }
}

#[test]
fn manifest_mode_matches_register_component() {
    let result = full_pipeline_ports("fifo", MIXED);
    let qsys = result.text(ArtifactKind::BusSystem);
    let xml = result.text(ArtifactKind::Manifest);
    for reg in result.allocation.registers() {
        assert!(qsys.contains(&format!(
            "add_instance {} pio64_{} 1.0",
            reg.name(),
            reg.direction()
        )));
    }
    // Ports declared `in` are written by the bus master.
    assert!(xml.contains("<port_name>wr_en</port_name>"));
    let wr_en_block = xml.split("<port>").find(|b| b.contains(">wr_en<")).unwrap();
    assert!(wr_en_block.contains("<pio_mode>out</pio_mode>"));
}

#[test]
fn json_manifest_agrees_with_xml() {
    let config =
        piomap_config::load_config_from_str(&make_config_toml("fifo", MIXED)).unwrap();
    let xml = full_pipeline(&config, ManifestFormat::Xml);
    let json = full_pipeline(&config, ManifestFormat::Json);

    let xml_map = manifest_xml_locations(xml.text(ArtifactKind::Manifest));
    let manifest: Manifest =
        serde_json::from_str(json.text(ArtifactKind::Manifest)).unwrap();
    assert_eq!(manifest.design, "fifo");
    assert_eq!(manifest.testbench, "conformance");

    let json_map: BTreeMap<String, PortLocation> = manifest
        .ports
        .iter()
        .map(|e| {
            (
                e.signal_name.clone(),
                PortLocation {
                    address: e.address,
                    bit_high: e.bit_high,
                    bit_low: e.bit_low,
                },
            )
        })
        .collect();
    assert_eq!(json_map, xml_map);
}
