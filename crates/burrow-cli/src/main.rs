//! burrow entry point: an interactive REPL over the sandboxed shell, or a
//! one-shot plan runner when `--plan` is given.

mod repl;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use burrow_sandbox::Sandbox;
use burrow_shell::{
    CommandRegistry, ConfirmPolicy, FileHistory, HistorySink, NullHistory, StaticConfirm,
    register_builtins,
};
use burrow_types::config::{ConfirmDefault, ShellConfig};

#[derive(Debug, Parser)]
#[command(name = "burrow", version, about = "A sandboxed command shell")]
struct Cli {
    /// Directory all filesystem operations are confined to.
    #[arg(long)]
    root: Option<PathBuf>,

    /// TOML configuration file. CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append each executed command to this file.
    #[arg(long)]
    history_file: Option<PathBuf>,

    /// Pre-approve destructive operations (no prompt).
    #[arg(long, conflicts_with = "assume_no")]
    assume_yes: bool,

    /// Pre-decline destructive operations (no prompt).
    #[arg(long)]
    assume_no: bool,

    /// Run a JSON plan file instead of starting the REPL.
    #[arg(long)]
    plan: Option<PathBuf>,

    /// With --plan: preview the plan without executing anything.
    #[arg(long, requires = "plan")]
    dry_run: bool,
}

/// Interactive confirmation via a terminal prompt. Declines on prompt
/// failure (closed tty, ctrl-c) rather than erroring.
struct PromptConfirm;

impl ConfirmPolicy for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        dialoguer::Confirm::new()
            .with_prompt(format!("Proceed with '{prompt}'?"))
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ShellConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ShellConfig::default(),
    };

    let root = cli
        .root
        .clone()
        .or(config.root.clone())
        .unwrap_or_else(|| PathBuf::from("sandbox"));
    let mut sandbox =
        Sandbox::new(&root).with_context(|| format!("opening sandbox root {}", root.display()))?;
    log::info!("sandbox root: {}", sandbox.root().display());

    let mut registry = CommandRegistry::new();
    register_builtins(&mut registry);

    let confirm = confirm_policy(&cli, config.confirm);

    let history: Box<dyn HistorySink> = match cli.history_file.clone().or(config.history_file) {
        Some(path) => Box::new(FileHistory::new(path)),
        None => Box::new(NullHistory),
    };

    match &cli.plan {
        Some(path) => {
            let mut env = burrow_shell::Environment {
                sandbox: &mut sandbox,
                confirm: confirm.as_ref(),
            };
            let run = burrow_plan::run_plan_file(&registry, &mut env, path, cli.dry_run)
                .with_context(|| format!("running plan {}", path.display()))?;
            if cli.dry_run {
                println!("{}", run.description);
            }
            println!("{}", run.output);
            Ok(())
        },
        None => repl::run(&registry, &mut sandbox, confirm.as_ref(), history.as_ref()),
    }
}

/// Pick the confirmation policy: explicit flags win, then an interactive
/// prompt when stdin is a terminal, then the configured default.
fn confirm_policy(cli: &Cli, default: ConfirmDefault) -> Box<dyn ConfirmPolicy> {
    if cli.assume_yes {
        return Box::new(StaticConfirm(true));
    }
    if cli.assume_no {
        return Box::new(StaticConfirm(false));
    }
    match default {
        ConfirmDefault::Always => Box::new(StaticConfirm(true)),
        ConfirmDefault::Never => Box::new(StaticConfirm(false)),
        ConfirmDefault::Prompt => {
            if std::io::stdin().is_terminal() {
                Box::new(PromptConfirm)
            } else {
                // No terminal to ask: fall back to deny.
                Box::new(StaticConfirm(false))
            }
        },
    }
}
