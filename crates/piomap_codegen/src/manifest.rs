//! Address manifest generation.
//!
//! The manifest tells the software running on the board which address and
//! bit range carries each port. The XML layout is the one the on-device
//! reader parses:
//!
//! ```text
//! <soc_system>
//!     <design>
//!         <port>
//!             <port_name>a</port_name>
//!             <address>0</address>
//!             <start_bit>63</start_bit>   (highest bit)
//!             <end_bit>56</end_bit>       (lowest bit)
//!             <pio_mode>out</pio_mode>    (register direction)
//!         </port>
//!     </design>
//!     <testbench>...</testbench>
//! </soc_system>
//! ```

use std::path::Path;

use piomap_alloc::{Allocation, Direction};
use serde::{Deserialize, Serialize};

use crate::error::CodegenError;
use crate::DesignInfo;

/// Serialization format of the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    /// XML for the on-device reader.
    #[default]
    Xml,
    /// Pretty-printed JSON.
    Json,
}

impl ManifestFormat {
    /// Output file name for this format.
    pub fn file_name(self) -> &'static Path {
        match self {
            ManifestFormat::Xml => Path::new("soc_system.xml"),
            ManifestFormat::Json => Path::new("soc_system.json"),
        }
    }
}

/// Location of one port on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Port name.
    pub signal_name: String,
    /// Byte address of the owning register.
    pub address: u64,
    /// Lowest bit of the port within the register.
    pub bit_low: u32,
    /// Highest bit of the port within the register.
    pub bit_high: u32,
    /// Direction of the owning register, seen from the bus master.
    pub register_direction: Direction,
}

/// The full address map of one design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Design name.
    pub design: String,
    /// One entry per port, in declaration order.
    pub ports: Vec<ManifestEntry>,
    /// Testbench note, copied opaquely.
    pub testbench: String,
}

impl Manifest {
    /// Builds the manifest from an allocation.
    pub fn from_allocation(allocation: &Allocation, design: &DesignInfo) -> Self {
        let ports = allocation
            .bindings()
            .map(|b| ManifestEntry {
                signal_name: b.signal.name().to_string(),
                address: b.address(),
                bit_low: b.bit_low,
                bit_high: b.bit_high,
                register_direction: b.register.direction(),
            })
            .collect();
        Self {
            design: design.name.clone(),
            ports,
            testbench: design.testbench.clone(),
        }
    }

    /// Renders the manifest as tab-indented XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" ?>\n<soc_system>\n");
        if self.ports.is_empty() {
            out.push_str("\t<design/>\n");
        } else {
            out.push_str("\t<design>\n");
            for entry in &self.ports {
                out.push_str("\t\t<port>\n");
                push_element(&mut out, 3, "port_name", &entry.signal_name);
                push_element(&mut out, 3, "address", &entry.address.to_string());
                push_element(&mut out, 3, "start_bit", &entry.bit_high.to_string());
                push_element(&mut out, 3, "end_bit", &entry.bit_low.to_string());
                push_element(
                    &mut out,
                    3,
                    "pio_mode",
                    entry.register_direction.as_str(),
                );
                out.push_str("\t\t</port>\n");
            }
            out.push_str("\t</design>\n");
        }
        push_element(&mut out, 1, "testbench", &self.testbench);
        out.push_str("</soc_system>\n");
        out
    }

    /// Renders the manifest as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CodegenError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Builds and renders the manifest in one step.
pub fn render_manifest(
    allocation: &Allocation,
    design: &DesignInfo,
    format: ManifestFormat,
) -> Result<String, CodegenError> {
    let manifest = Manifest::from_allocation(allocation, design);
    match format {
        ManifestFormat::Xml => Ok(manifest.to_xml()),
        ManifestFormat::Json => manifest.to_json(),
    }
}

fn push_element(out: &mut String, depth: usize, tag: &str, text: &str) {
    out.extend(std::iter::repeat('\t').take(depth));
    if text.is_empty() {
        out.push_str(&format!("<{tag}/>\n"));
    } else {
        out.push_str(&format!("<{tag}>{}</{tag}>\n", escape_xml(text)));
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
