//! Plan execution: preview or run through the interpreter.

use burrow_shell::{CommandOutput, CommandRegistry, Environment};
use burrow_types::error::Result;

use crate::plan::{Plan, render_line};

const DRY_RUN_MARKER: &str = "(dry run -- no changes made)";

/// The rendered plan plus whatever running it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRun {
    /// One `$ command` line per step, in order.
    pub description: String,
    /// Dry run: the marker. Live run: echoed steps interleaved with
    /// their output and per-step error lines.
    pub output: String,
}

/// Runs a plan against a command registry.
pub struct PlanExecutor<'a> {
    registry: &'a CommandRegistry,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(registry: &'a CommandRegistry) -> Self {
        Self { registry }
    }

    /// Execute (or preview) a plan.
    ///
    /// A dry run touches nothing. A live run feeds each step through the
    /// interpreter: a failing step is reported as an `error:` line and the
    /// plan continues, a terminating step (`exit`) stops the remainder.
    /// The run itself never fails outward.
    pub fn run(&self, plan: &Plan, env: &mut Environment<'_>, dry_run: bool) -> PlanRun {
        let description = plan.render();
        if dry_run {
            return PlanRun {
                description,
                output: DRY_RUN_MARKER.to_string(),
            };
        }

        let mut lines = Vec::new();
        for cmd in &plan.commands {
            let line = render_line(cmd);
            lines.push(format!("$ {line}"));
            match self.registry.execute(&line, env) {
                Ok(CommandOutput::Text(text)) => {
                    if !text.is_empty() {
                        lines.push(text.trim_end_matches('\n').to_string());
                    }
                },
                Ok(CommandOutput::None) => {},
                Ok(CommandOutput::Terminate) => {
                    lines.push("exit".to_string());
                    break;
                },
                Err(e) => {
                    log::warn!("plan step failed: {line}: {e}");
                    lines.push(format!("error: {e}"));
                },
            }
        }
        PlanRun {
            description,
            output: lines.join("\n"),
        }
    }
}

/// Load a plan from a JSON file and run it.
pub fn run_plan_file(
    registry: &CommandRegistry,
    env: &mut Environment<'_>,
    path: &std::path::Path,
    dry_run: bool,
) -> Result<PlanRun> {
    let text = std::fs::read_to_string(path)?;
    let plan = Plan::from_json(&text)?;
    Ok(PlanExecutor::new(registry).run(&plan, env, dry_run))
}
