//! piomap CLI: bridges an FPGA design to the HPS over memory-mapped PIO
//! registers.
//!
//! Provides `piomap init` for project scaffolding, `piomap generate` for the
//! full artifact pipeline (optionally running the vendor toolchain), and
//! `piomap map` for printing the address map without writing files.

#![warn(missing_docs)]

mod generate;
mod init;
mod map;
mod pipeline;
mod toolchain;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// piomap: packs design ports into 64-bit bus registers and generates the
/// files that connect them.
#[derive(Parser, Debug)]
#[command(name = "piomap", version, about = "PIO register bridge generator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `piomap.toml` file or its directory.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new piomap project.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Allocate registers and write every generated file.
    Generate(GenerateArgs),
    /// Print the address map without writing files.
    Map(MapArgs),
}

/// Arguments for the `piomap generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Output directory, overriding `project.output`.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Run the toolchain steps after writing the files.
    #[arg(long)]
    pub run: bool,
}

/// Arguments for the `piomap map` subcommand.
#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Output format for the address map.
    #[arg(short, long, value_enum, default_value_t = MapFormat::Text)]
    pub format: MapFormat,
}

/// Address map output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MapFormat {
    /// One aligned line per port.
    Text,
    /// The manifest as JSON.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

impl GlobalArgs {
    /// Log filter used when `RUST_LOG` is not set.
    fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Init { name } => init::run(name, &global),
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Map(ref args) => map::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the flags.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
