//! Scripted command plans.
//!
//! A plan is an ordered list of pre-tokenized commands, typically loaded
//! from a JSON file. The executor either previews the plan (dry run) or
//! feeds each command through the normal interpreter, reporting per-step
//! failures without halting the batch.

mod executor;
mod plan;

pub use executor::{PlanExecutor, PlanRun, run_plan_file};
pub use plan::Plan;
