//! Runs the vendor toolchain steps in the output directory.
//!
//! A failed step is logged and the next step still runs. The caller gets a
//! [`RunReport`] and decides the exit code from it.

use std::path::Path;
use std::process::Command;

use piomap_codegen::ToolchainStep;

/// Executes a single toolchain step.
pub trait ToolchainRunner {
    /// Runs `step` with `dir` as working directory. On failure, returns a
    /// description of what went wrong.
    fn run_step(&mut self, step: &ToolchainStep, dir: &Path) -> Result<(), String>;
}

/// Runs steps as child processes, inheriting stdout and stderr.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ToolchainRunner for ProcessRunner {
    fn run_step(&mut self, step: &ToolchainStep, dir: &Path) -> Result<(), String> {
        let status = Command::new(&step.program)
            .args(&step.args)
            .current_dir(dir)
            .status()
            .map_err(|e| format!("failed to start {}: {e}", step.program))?;
        if status.success() {
            Ok(())
        } else {
            Err(format!("{} exited with {status}", step.program))
        }
    }
}

/// How a step ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed successfully.
    Succeeded,
    /// The step failed; the description says why.
    Failed(String),
}

/// Outcome of one step, labelled with its description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    /// The step's description.
    pub description: String,
    /// How it ended.
    pub outcome: StepOutcome,
}

/// Outcomes of every step, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Per-step outcomes.
    pub steps: Vec<StepReport>,
}

impl RunReport {
    /// Returns `true` if no step failed.
    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }

    /// Steps that failed.
    pub fn failures(&self) -> impl Iterator<Item = &StepReport> {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Failed(_)))
    }
}

/// Runs every step in order, continuing past failures.
pub fn run_steps<R: ToolchainRunner + ?Sized>(
    runner: &mut R,
    steps: &[ToolchainStep],
    dir: &Path,
) -> RunReport {
    let mut report = RunReport::default();
    for step in steps {
        tracing::info!(step = %step.description, command = %step, "running toolchain step");
        let outcome = match runner.run_step(step, dir) {
            Ok(()) => StepOutcome::Succeeded,
            Err(reason) => {
                tracing::error!(step = %step.description, %reason, "toolchain step failed");
                StepOutcome::Failed(reason)
            }
        };
        report.steps.push(StepReport {
            description: step.description.clone(),
            outcome,
        });
    }
    report
}
