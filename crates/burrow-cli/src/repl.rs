//! The interactive read-eval-print loop.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use burrow_sandbox::Sandbox;
use burrow_shell::{CommandOutput, CommandRegistry, ConfirmPolicy, Environment, HistorySink};

const BANNER: &str = concat!(
    "burrow v",
    env!("CARGO_PKG_VERSION"),
    " -- sandboxed shell. Type 'help' for commands."
);

/// Run the REPL until `exit`/`quit` or EOF.
///
/// Every outcome of a line is rendered and the loop continues; only a
/// `Terminate` output (or EOF) ends the session.
pub fn run(
    registry: &CommandRegistry,
    sandbox: &mut Sandbox,
    confirm: &dyn ConfirmPolicy,
    history: &dyn HistorySink,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    println!("{BANNER}");
    loop {
        write!(stdout, "burrow:{}$ ", sandbox.rel_display())?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF behaves like exit.
            println!("exit");
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        history.append(trimmed);

        let mut env = Environment {
            sandbox: &mut *sandbox,
            confirm,
        };
        match registry.execute(trimmed, &mut env) {
            Ok(CommandOutput::Text(text)) => print_block(&text),
            Ok(CommandOutput::None) => {},
            Ok(CommandOutput::Terminate) => {
                println!("exit");
                return Ok(());
            },
            Err(e) => println!("error: {e}"),
        }
    }
}

/// Print command output verbatim, ensuring the prompt starts on a fresh
/// line without doubling a trailing newline the output already has.
fn print_block(text: &str) {
    if text.is_empty() {
        return;
    }
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}
