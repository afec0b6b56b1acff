//! `piomap map`: prints the address map without writing files.

use piomap_alloc::Allocation;
use piomap_codegen::qsys::base_address_literal;
use piomap_codegen::Manifest;

use crate::pipeline;
use crate::{GlobalArgs, MapArgs, MapFormat};

/// Runs the `piomap map` command. The map goes to stdout.
pub fn run(args: &MapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = pipeline::load_project(global)?;
    let plan = pipeline::plan(&project.config)?;

    match args.format {
        MapFormat::Text => {
            if !global.quiet {
                eprintln!(
                    "    Mapping {} ({} port(s), {} register(s))",
                    plan.design.name,
                    plan.allocation.connections().len(),
                    plan.allocation.registers().len()
                );
            }
            print!("{}", render_text(&plan.allocation));
        }
        MapFormat::Json => {
            let manifest = Manifest::from_allocation(&plan.allocation, &plan.design);
            print!("{}", manifest.to_json()?);
        }
    }
    Ok(0)
}

/// One line per port: name, address, bit slice, register.
fn render_text(allocation: &Allocation) -> String {
    let name_width = allocation
        .signals()
        .iter()
        .map(|s| s.name().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for b in allocation.bindings() {
        let slice = format!("[{}:{}]", b.bit_high, b.bit_low);
        out.push_str(&format!(
            "{:<name_width$}  {}  {:<7}  {} ({})\n",
            b.signal.name(),
            base_address_literal(b.address()),
            slice,
            b.register.name(),
            b.register.direction(),
        ));
    }
    out
}
