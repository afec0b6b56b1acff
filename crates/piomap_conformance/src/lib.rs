//! Conformance test helpers for piomap.
//!
//! Runs port lists through the full extract → allocate → generate pipeline
//! and reads addresses and bit slices back out of the rendered text, so the
//! integration tests can check that the artifacts agree with each other
//! without trusting any single generator.

#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use piomap_alloc::{allocate, extract_signals, AllocError, Allocation, RawSignal};
use piomap_codegen::{
    generate_artifacts, ArtifactKind, Artifacts, DesignInfo, GenerateOptions, ManifestFormat,
    ScriptKind, ToolchainPaths,
};
use piomap_config::ProjectConfig;

/// Result of running the full pipeline on one project description.
pub struct PipelineResult {
    /// Design identity passed to the generators.
    pub design: DesignInfo,
    /// The allocation all artifacts were rendered from.
    pub allocation: Allocation,
    /// Every rendered file.
    pub artifacts: Artifacts,
}

impl PipelineResult {
    /// Contents of the first artifact of `kind`.
    ///
    /// # Panics
    ///
    /// Panics if no such artifact was generated.
    pub fn text(&self, kind: ArtifactKind) -> &str {
        match self.artifacts.get(kind) {
            Some(a) => &a.contents,
            None => panic!("no {kind:?} artifact generated"),
        }
    }
}

/// Location of one port as read back from an artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PortLocation {
    /// Byte address of the register holding the port.
    pub address: u64,
    /// Highest bit of the slice.
    pub bit_high: u32,
    /// Lowest bit of the slice.
    pub bit_low: u32,
}

/// Builds a `piomap.toml` body for `name` with the given `(name, mode, type)`
/// ports.
pub fn make_config_toml(name: &str, ports: &[(&str, &str, &str)]) -> String {
    let mut toml = format!("[project]\nname = \"{name}\"\ntestbench = \"conformance\"\n");
    for (port, mode, ty) in ports {
        toml.push_str(&format!(
            "\n[[ports]]\nname = \"{port}\"\nmode = \"{mode}\"\ntype = \"{ty}\"\n"
        ));
    }
    toml
}

/// Parses and allocates ports directly, without a project description.
/// The clock is `clk`.
pub fn allocate_ports(ports: &[(&str, &str, &str)]) -> Result<Allocation, AllocError> {
    let extracted = extract_signals(
        ports.iter().map(|&(name, direction, type_expr)| RawSignal {
            name,
            direction,
            type_expr,
            description: "",
        }),
        "clk",
    )?;
    allocate(extracted.signals)
}

/// Runs extraction, allocation and generation for a loaded config.
///
/// # Panics
///
/// Panics if any stage fails; conformance inputs are expected to be valid.
pub fn full_pipeline(config: &ProjectConfig, manifest_format: ManifestFormat) -> PipelineResult {
    let decls = config.ports.iter().map(|p| RawSignal {
        name: &p.name,
        direction: &p.mode,
        type_expr: &p.type_expr,
        description: &p.description,
    });
    let extracted = match extract_signals(decls, &config.project.clock) {
        Ok(e) => e,
        Err(e) => panic!("extraction failed: {e}"),
    };
    let allocation = match allocate(extracted.signals) {
        Ok(a) => a,
        Err(e) => panic!("allocation failed: {e}"),
    };
    let design = DesignInfo {
        name: config.project.name.clone(),
        clock: extracted.clock,
        testbench: config.project.testbench.clone(),
    };
    let options = GenerateOptions {
        hdl_files: vec![PathBuf::from("/design/src").join(format!("{}.vhd", design.name))],
        toolchain: ToolchainPaths::default(),
        script: ScriptKind::Sh,
        manifest_format,
    };
    let artifacts = match generate_artifacts(&allocation, &design, &options) {
        Ok(a) => a,
        Err(e) => panic!("generation failed: {e}"),
    };
    PipelineResult {
        design,
        allocation,
        artifacts,
    }
}

/// Runs the pipeline on a port list, rendering an XML manifest.
///
/// # Panics
///
/// Panics if the config or any pipeline stage is invalid.
pub fn full_pipeline_ports(name: &str, ports: &[(&str, &str, &str)]) -> PipelineResult {
    let config = match piomap_config::load_config_from_str(&make_config_toml(name, ports)) {
        Ok(c) => c,
        Err(e) => panic!("invalid conformance config: {e}"),
    };
    full_pipeline(&config, ManifestFormat::Xml)
}

/// Reads `port name -> location` from an XML manifest.
pub fn manifest_xml_locations(xml: &str) -> BTreeMap<String, PortLocation> {
    let mut out = BTreeMap::new();
    for block in xml.split("<port>").skip(1) {
        let Some(block) = block.split("</port>").next() else {
            continue;
        };
        let (Some(name), Some(address), Some(high), Some(low)) = (
            element(block, "port_name"),
            element(block, "address").and_then(|s| s.parse::<u64>().ok()),
            element(block, "start_bit").and_then(|s| s.parse::<u32>().ok()),
            element(block, "end_bit").and_then(|s| s.parse::<u32>().ok()),
        ) else {
            continue;
        };
        out.insert(
            name.to_string(),
            PortLocation {
                address,
                bit_high: high,
                bit_low: low,
            },
        );
    }
    out
}

/// Reads `register name -> base address` from a bus-system script.
pub fn bus_system_base_addresses(script: &str) -> BTreeMap<String, u64> {
    let mut out = BTreeMap::new();
    for line in script.lines() {
        let Some(rest) = line.strip_prefix("set_connection_parameter_value mm_bridge_0.m0/") else {
            continue;
        };
        let Some((slave, value)) = rest.split_once(" baseAddress ") else {
            continue;
        };
        let register = slave.trim_end_matches(".s0");
        let hex = value.trim_matches(&['{', '}'][..]);
        if let Some(addr) = hex
            .strip_prefix("0x")
            .and_then(|h| u64::from_str_radix(h, 16).ok())
        {
            out.insert(register.to_string(), addr);
        }
    }
    out
}

/// Reads `port name -> (export wire, high, low)` from the bus-system port
/// comments.
pub fn bus_system_port_slices(script: &str) -> BTreeMap<String, (String, u32, u32)> {
    script
        .lines()
        .filter_map(|line| line.strip_prefix("# port "))
        .filter_map(|rest| {
            let (name, target) = rest.split_once(" -> ")?;
            Some((name.to_string(), parse_slice(target)?))
        })
        .collect()
}

/// Reads `port name -> (export wire, high, low)` from the user design
/// instantiation in the interconnect module.
pub fn interconnect_port_slices(verilog: &str) -> BTreeMap<String, (String, u32, u32)> {
    verilog
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let rest = line.strip_prefix('.')?;
            let (name, arg) = rest.split_once('(')?;
            let arg = arg.trim_end_matches(',').strip_suffix(')')?;
            Some((name.to_string(), parse_slice(arg)?))
        })
        .collect()
}

/// Strips the `_export` suffix from a wire name, giving the register name.
pub fn register_of_export(export: &str) -> &str {
    export.strip_suffix("_export").unwrap_or(export)
}

fn element<'a>(block: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = block.find(&open)? + open.len();
    let end = block[start..].find(&close)? + start;
    Some(&block[start..end])
}

/// Parses `wire[high:low]`.
fn parse_slice(s: &str) -> Option<(String, u32, u32)> {
    let (wire, range) = s.split_once('[')?;
    let (high, low) = range.strip_suffix(']')?.split_once(':')?;
    Some((wire.to_string(), high.parse().ok()?, low.parse().ok()?))
}
