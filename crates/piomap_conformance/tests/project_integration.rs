//! Project descriptions loaded from disk through `piomap_config`, then run
//! through allocation and generation.

use std::fs;

use piomap_codegen::{ArtifactKind, ManifestFormat};
use piomap_conformance::{full_pipeline, manifest_xml_locations};
use tempfile::TempDir;

const FIFO: &str = r#"
[project]
name = "FIFOTopModule"
testbench = "write 4 words, read them back"
clock = "clk"
output = "intelPrj"
hdl_files = ["VHDL/model/FIFOTopModule.vhd", "Package/MainPackage.vhd"]

[[ports]]
name = "clk"
mode = "in"
type = "single bit"
description = "system clock"

[[ports]]
name = "rst"
mode = "in"
type = "single bit"

[[ports]]
name = "din"
mode = "in"
type = "bus(15 downto 0)"

[[ports]]
name = "dout"
mode = "out"
type = "bus(15 downto 0)"

[[ports]]
name = "full"
mode = "out"
type = "single bit"

[manifest]
format = "json"
"#;

#[test]
fn project_from_disk_generates_consistent_map() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("piomap.toml"), FIFO).unwrap();

    let config = piomap_config::load_config(tmp.path()).unwrap();
    assert_eq!(config.manifest.format, piomap_config::ManifestFormat::Json);
    let resolved = piomap_config::resolve_project(&config, tmp.path()).unwrap();
    assert_eq!(resolved.output_dir, tmp.path().join("intelPrj"));
    assert_eq!(resolved.hdl_files.len(), 2);

    let result = full_pipeline(&config, ManifestFormat::Xml);
    let map = manifest_xml_locations(result.text(ArtifactKind::Manifest));
    let names: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(names, ["din", "dout", "full", "rst"]);

    assert_eq!((map["rst"].address, map["rst"].bit_high), (0, 63));
    assert_eq!((map["din"].address, map["din"].bit_high, map["din"].bit_low), (0, 62, 47));
    assert_eq!((map["dout"].address, map["dout"].bit_high), (8, 63));
    assert_eq!((map["full"].address, map["full"].bit_high, map["full"].bit_low), (8, 47, 47));
}

#[test]
fn json_manifest_lists_ports_in_declaration_order() {
    let config = piomap_config::load_config_from_str(FIFO).unwrap();
    let result = full_pipeline(&config, ManifestFormat::Json);
    let manifest = result.artifacts.get(ArtifactKind::Manifest).unwrap();
    assert_eq!(manifest.path.to_string_lossy(), "soc_system.json");

    let value: serde_json::Value = serde_json::from_str(&manifest.contents).unwrap();
    let order: Vec<&str> = value["ports"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["signal_name"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["rst", "din", "dout", "full"]);
    assert_eq!(value["testbench"], "write 4 words, read them back");
}

#[test]
fn design_name_flows_into_every_artifact() {
    let config = piomap_config::load_config_from_str(FIFO).unwrap();
    let result = full_pipeline(&config, ManifestFormat::Xml);
    assert!(result
        .text(ArtifactKind::Interconnect)
        .contains("FIFOTopModule my_FIFOTopModule ("));
    assert!(result
        .text(ArtifactKind::AutomationScript)
        .contains("FIFOTopModule.rbf"));
    assert!(result
        .text(ArtifactKind::ProjectScript)
        .contains("# sources of FIFOTopModule"));
}
