//! `piomap generate`: the full pipeline.
//!
//! 1. Find the project root and load `piomap.toml`
//! 2. Extract ports and allocate registers
//! 3. Create the output directory
//! 4. Render every artifact
//! 5. Write the files
//! 6. Optionally run the toolchain steps in the output directory

use std::path::{Path, PathBuf};

use piomap_codegen::script::toolchain_steps;

use crate::pipeline::{self, LoadedProject, PipelineError};
use crate::toolchain::{run_steps, ProcessRunner, RunReport, ToolchainRunner};
use crate::{GenerateArgs, GlobalArgs};

/// Files written by one pipeline run.
#[derive(Debug)]
pub struct GenerateOutput {
    /// Absolute output directory.
    pub output_dir: PathBuf,
    /// Every file written, in generation order.
    pub written: Vec<PathBuf>,
}

/// Runs the `piomap generate` command.
///
/// Returns exit code 0 on success, 1 if `--run` was given and any toolchain
/// step failed.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut project = pipeline::load_project(global)?;
    if let Some(output) = &args.output {
        project.resolved.output_dir = absolute(Path::new(output))?;
    }

    if !global.quiet {
        eprintln!("   Generating {}", project.config.project.name);
    }
    let output = generate(&project)?;
    if !global.quiet {
        eprintln!(
            "      Wrote {} files to {}",
            output.written.len(),
            output.output_dir.display()
        );
    }

    if !args.run {
        return Ok(0);
    }
    let report = run_toolchain(&project, &output.output_dir, &mut ProcessRunner);
    Ok(report_exit_code(&report, global))
}

/// Runs steps 2 through 5 for an already loaded project.
pub fn generate(project: &LoadedProject) -> Result<GenerateOutput, PipelineError> {
    let plan = pipeline::plan(&project.config)?;
    let output_dir = &project.resolved.output_dir;
    pipeline::scaffold_output(output_dir)?;

    let options = pipeline::generate_options(&project.config, &project.resolved);
    let artifacts = piomap_codegen::generate_artifacts(&plan.allocation, &plan.design, &options)?;
    let written = pipeline::write_artifacts(output_dir, &artifacts)?;
    tracing::info!(dir = %output_dir.display(), files = written.len(), "artifacts written");

    Ok(GenerateOutput {
        output_dir: output_dir.clone(),
        written,
    })
}

/// Runs the project's toolchain steps with `runner` from `output_dir`.
pub fn run_toolchain<R: ToolchainRunner + ?Sized>(
    project: &LoadedProject,
    output_dir: &Path,
    runner: &mut R,
) -> RunReport {
    let options = pipeline::generate_options(&project.config, &project.resolved);
    let steps = toolchain_steps(&options.toolchain, &project.config.project.name);
    run_steps(runner, &steps, output_dir)
}

fn report_exit_code(report: &RunReport, global: &GlobalArgs) -> i32 {
    let failed = report.failures().count();
    if !global.quiet {
        eprintln!(
            "   Toolchain: {} step(s) succeeded, {} failed",
            report.steps.len() - failed,
            failed
        );
    }
    if report.all_succeeded() {
        0
    } else {
        1
    }
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::StepOutcome;
    use piomap_codegen::ToolchainStep;
    use std::fs;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
[project]
name = "blinky"
output = "intelPrj"
hdl_files = ["src/blinky.vhd"]

[[ports]]
name = "clk"
mode = "in"
type = "single bit"

[[ports]]
name = "enable"
mode = "in"
type = "single bit"

[[ports]]
name = "led"
mode = "out"
type = "bus(7 downto 0)"
"#;

    fn setup() -> (TempDir, GlobalArgs) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("piomap.toml"), PROJECT).unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/blinky.vhd"), "entity blinky is end;").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().to_string_lossy().into_owned()),
        };
        (tmp, global)
    }

    struct AlwaysFails;

    impl ToolchainRunner for AlwaysFails {
        fn run_step(&mut self, step: &ToolchainStep, _dir: &Path) -> Result<(), String> {
            Err(format!("{} not installed", step.program))
        }
    }

    #[test]
    fn generate_writes_all_files() {
        let (tmp, global) = setup();
        let code = run(
            &GenerateArgs {
                output: None,
                run: false,
            },
            &global,
        )
        .unwrap();
        assert_eq!(code, 0);

        let out = tmp.path().join("intelPrj");
        for file in [
            "soc_system.tcl",
            "DE10_NANO_SoC_GHRD.v",
            "soc_system.xml",
            "DE10_NANO_SoC_GHRD.tcl",
            "generate_and_program.sh",
            "pio64_in_hw.tcl",
            "pio64_out_hw.tcl",
        ] {
            assert!(out.join(file).is_file(), "missing {file}");
        }

        let top = fs::read_to_string(out.join("DE10_NANO_SoC_GHRD.v")).unwrap();
        assert!(top.contains(".clk(FPGA_CLK1_50)"));
        assert!(top.contains(".enable(pio_out_0_export[63:63])"));
        assert!(top.contains(".led(pio_in_1_export[63:56])"));

        let project_tcl = fs::read_to_string(out.join("DE10_NANO_SoC_GHRD.tcl")).unwrap();
        let hdl = tmp.path().join("src/blinky.vhd");
        let hdl = hdl.to_string_lossy().replace('\\', "/");
        assert!(project_tcl.contains(&hdl));
    }

    #[test]
    fn output_flag_overrides_config() {
        let (tmp, global) = setup();
        let custom = tmp.path().join("elsewhere");
        run(
            &GenerateArgs {
                output: Some(custom.to_string_lossy().into_owned()),
                run: false,
            },
            &global,
        )
        .unwrap();
        assert!(custom.join("soc_system.tcl").is_file());
        assert!(!tmp.path().join("intelPrj").exists());
    }

    #[test]
    fn bad_port_aborts_before_writing() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("piomap.toml"),
            "[project]\nname = \"bad\"\n\n[[ports]]\nname = \"x\"\nmode = \"inout\"\ntype = \"single bit\"\n",
        )
        .unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(tmp.path().to_string_lossy().into_owned()),
        };
        let err = run(
            &GenerateArgs {
                output: None,
                run: false,
            },
            &global,
        )
        .unwrap_err();
        assert!(err.to_string().contains("inout"));
        assert!(!tmp.path().join("build").exists());
    }

    #[test]
    fn regeneration_is_byte_identical() {
        let (_tmp, global) = setup();
        let project = pipeline::load_project(&global).unwrap();
        let first = generate(&project).unwrap();
        let before: Vec<String> = first
            .written
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        let second = generate(&project).unwrap();
        let after: Vec<String> = second
            .written
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(first.written, second.written);
        assert_eq!(before, after);
    }

    #[test]
    fn toolchain_failures_give_exit_code_one() {
        let (_tmp, global) = setup();
        let project = pipeline::load_project(&global).unwrap();
        let output = generate(&project).unwrap();
        let report = run_toolchain(&project, &output.output_dir, &mut AlwaysFails);
        assert_eq!(report.steps.len(), 5);
        assert_eq!(
            report.steps[4].outcome,
            StepOutcome::Failed("quartus_cpf not installed".to_string())
        );
        assert_eq!(report_exit_code(&report, &global), 1);
    }

    #[test]
    fn successful_toolchain_gives_exit_code_zero() {
        let report = RunReport::default();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
        };
        assert_eq!(report_exit_code(&report, &global), 0);
    }
}
