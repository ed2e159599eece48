//! Command trait, registry, and dispatch logic.
//!
//! Supports quoted arguments and an in-memory session history. The shell
//! deliberately has no pipes, redirection, chaining, or glob expansion:
//! one line is one command.

use std::cell::RefCell;
use std::collections::HashMap;

use burrow_sandbox::Sandbox;
use burrow_types::error::{Result, ShellError};

use crate::confirm::ConfirmPolicy;

/// Outcome of a command.
///
/// `Terminate` is a control signal, not an error: the hosting REPL stops
/// the session, a plan executor stops the remaining plan. Callers are
/// expected to pattern-match on all three cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text (possibly multi-line, possibly with its own trailing
    /// newline -- e.g. `cat` output is verbatim file content).
    Text(String),
    /// Command produced no visible output.
    None,
    /// Explicit termination request (`exit` / `quit`).
    Terminate,
}

/// Shared mutable state passed to every command.
pub struct Environment<'a> {
    /// The jail: fixed root plus current working directory.
    pub sandbox: &'a mut Sandbox,
    /// Decision capability for destructive operations (`rm -r`).
    pub confirm: &'a dyn ConfirmPolicy,
}

/// A single executable command.
pub trait Command {
    /// The command name (what the user types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string (e.g. "ls \[-a\] \[path\]").
    fn usage(&self) -> &str;

    /// Command category for grouping in `help` output.
    fn category(&self) -> &str {
        "general"
    }

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput>;
}

/// Maximum number of session history entries to retain.
const MAX_HISTORY: usize = 100;

/// Registry of available commands with dispatch.
///
/// Built once at construction and treated as immutable configuration
/// afterwards; the only interior state is the session history ring.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
    history: RefCell<Vec<String>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Get session history.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    fn push_history(&self, line: &str) {
        let mut hist = self.history.borrow_mut();
        // Don't duplicate the last entry.
        if hist.last().is_none_or(|last| last != line) {
            hist.push(line.to_string());
            if hist.len() > MAX_HISTORY {
                hist.remove(0);
            }
        }
    }

    /// Parse and execute a command line.
    ///
    /// Tokenization errors, unknown commands, and handler failures all
    /// come back as `Err`; the caller renders them as a single error line
    /// and keeps the session alive. Command names are matched exactly
    /// (case-sensitive).
    pub fn execute(&self, line: &str, env: &mut Environment<'_>) -> Result<CommandOutput> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(CommandOutput::None);
        }

        self.push_history(trimmed);

        let tokens = tokenize(trimmed)?;
        if tokens.is_empty() {
            return Ok(CommandOutput::None);
        }

        let name = tokens[0].as_str();
        let arg_strings: Vec<String> = tokens[1..].to_vec();
        let args: Vec<&str> = arg_strings.iter().map(String::as_str).collect();

        // Intercept built-ins that need registry access.
        match name {
            "help" => return self.execute_help(&args),
            "history" => return self.execute_history_cmd(&args),
            _ => {},
        }

        log::debug!("dispatch: {name} ({} args)", args.len());
        match self.commands.get(name) {
            Some(cmd) => cmd.execute(&args, env),
            None => Err(ShellError::UnknownCommand(name.to_string())),
        }
    }

    /// Built-in help with access to the registry.
    fn execute_help(&self, args: &[&str]) -> Result<CommandOutput> {
        if let Some(&name) = args.first() {
            match self.commands.get(name) {
                Some(cmd) => {
                    let mut out = format!("{} ({})\n", cmd.name(), cmd.category());
                    out.push_str(&format!("  {}\n", cmd.description()));
                    out.push_str(&format!("  Usage: {}", cmd.usage()));
                    Ok(CommandOutput::Text(out))
                },
                None => Err(ShellError::UnknownCommand(name.to_string())),
            }
        } else {
            // Group commands by category.
            let mut categories: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
            for builtin in &[("help", "general"), ("history", "general")] {
                categories
                    .entry(builtin.1)
                    .or_default()
                    .push((builtin.0, ""));
            }
            for cmd in self.commands.values() {
                categories
                    .entry(cmd.category())
                    .or_default()
                    .push((cmd.name(), cmd.description()));
            }

            let mut cats: Vec<&str> = categories.keys().copied().collect();
            cats.sort();

            let total: usize = categories.values().map(|v| v.len()).sum();
            let mut out = format!("Commands ({total}):\n");
            for cat in &cats {
                let mut cmds = categories[cat].clone();
                cmds.sort_by_key(|(name, _)| *name);
                out.push_str(&format!("\n  [{cat}]\n"));
                for (name, desc) in &cmds {
                    if desc.is_empty() {
                        out.push_str(&format!("    {name}\n"));
                    } else {
                        out.push_str(&format!("    {name:12} {desc}\n"));
                    }
                }
            }
            out.push_str("\nType 'help <command>' for details.");
            Ok(CommandOutput::Text(out))
        }
    }

    /// Built-in `history` command: numbered session history.
    fn execute_history_cmd(&self, args: &[&str]) -> Result<CommandOutput> {
        if args.first() == Some(&"clear") {
            self.history.borrow_mut().clear();
            return Ok(CommandOutput::Text("History cleared.".to_string()));
        }
        let hist = self.history.borrow();
        if hist.is_empty() {
            return Ok(CommandOutput::Text("(no history)".to_string()));
        }
        let mut out = String::new();
        for (i, entry) in hist.iter().enumerate() {
            out.push_str(&format!("  {:4}  {entry}\n", i + 1));
        }
        Ok(CommandOutput::Text(out.trim_end().to_string()))
    }

    /// Return a sorted list of (name, description) pairs.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut cmds: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|c| (c.name(), c.description()))
            .collect();
        cmds.sort_by_key(|(name, _)| *name);
        cmds
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tokenizer: handles single quotes, double quotes, and backslash escapes.
// ---------------------------------------------------------------------------

/// Tokenize a command line respecting quotes and backslash escapes.
///
/// - Single-quoted strings preserve all characters literally.
/// - Double-quoted strings group words; `\"`, `\\` escape inside them.
/// - Backslash escapes the next character outside of quotes.
///
/// An unterminated quote is a `ShellError::Parse`, never a panic.
pub fn tokenize(input: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(ch) = chars.next() {
        if in_single {
            if ch == '\'' {
                in_single = false;
            } else {
                current.push(ch);
            }
        } else if in_double {
            if ch == '"' {
                in_double = false;
            } else if ch == '\\'
                && let Some(&next) = chars.peek()
            {
                match next {
                    '"' | '\\' => {
                        chars.next();
                        current.push(next);
                    },
                    _ => {
                        current.push('\\');
                    },
                }
            } else {
                current.push(ch);
            }
        } else {
            match ch {
                '\'' => in_single = true,
                '"' => in_double = true,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                },
                _ => current.push(ch),
            }
        }
    }

    if in_single {
        return Err(ShellError::Parse("unterminated single quote".to_string()));
    }
    if in_double {
        return Err(ShellError::Parse("unterminated double quote".to_string()));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::StaticConfirm;

    struct GreetCmd;
    impl Command for GreetCmd {
        fn name(&self) -> &str {
            "greet"
        }
        fn description(&self) -> &str {
            "Say hello"
        }
        fn usage(&self) -> &str {
            "greet [name...]"
        }
        fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Text(format!("hello {}", args.join(" "))))
        }
    }

    struct QuitCmd;
    impl Command for QuitCmd {
        fn name(&self) -> &str {
            "quit"
        }
        fn description(&self) -> &str {
            "Leave"
        }
        fn usage(&self) -> &str {
            "quit"
        }
        fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
            Ok(CommandOutput::Terminate)
        }
    }

    fn setup() -> (CommandRegistry, tempfile::TempDir, Sandbox) {
        let mut reg = CommandRegistry::new();
        reg.register(Box::new(GreetCmd));
        reg.register(Box::new(QuitCmd));
        let dir = tempfile::tempdir().unwrap();
        let sb = Sandbox::new(dir.path()).unwrap();
        (reg, dir, sb)
    }

    fn exec(reg: &CommandRegistry, sb: &mut Sandbox, line: &str) -> Result<CommandOutput> {
        let confirm = StaticConfirm(true);
        let mut env = Environment {
            sandbox: sb,
            confirm: &confirm,
        };
        reg.execute(line, &mut env)
    }

    #[test]
    fn dispatch_to_registered_command() {
        let (reg, _dir, mut sb) = setup();
        assert_eq!(
            exec(&reg, &mut sb, "greet world").unwrap(),
            CommandOutput::Text("hello world".to_string())
        );
    }

    #[test]
    fn unknown_command_names_token() {
        let (reg, _dir, mut sb) = setup();
        match exec(&reg, &mut sb, "frobnicate --force now") {
            Err(ShellError::UnknownCommand(tok)) => assert_eq!(tok, "frobnicate"),
            other => panic!("expected UnknownCommand, got {other:?}"),
        }
    }

    #[test]
    fn dispatch_is_case_sensitive() {
        let (reg, _dir, mut sb) = setup();
        assert!(matches!(
            exec(&reg, &mut sb, "GREET world"),
            Err(ShellError::UnknownCommand(_))
        ));
    }

    #[test]
    fn empty_line_is_noop() {
        let (reg, _dir, mut sb) = setup();
        assert_eq!(exec(&reg, &mut sb, "   ").unwrap(), CommandOutput::None);
        assert!(reg.history().is_empty());
    }

    #[test]
    fn terminate_is_a_signal_not_an_error() {
        let (reg, _dir, mut sb) = setup();
        assert_eq!(exec(&reg, &mut sb, "quit").unwrap(), CommandOutput::Terminate);
    }

    #[test]
    fn parse_error_on_unterminated_quote() {
        let (reg, _dir, mut sb) = setup();
        assert!(matches!(
            exec(&reg, &mut sb, "greet 'oops"),
            Err(ShellError::Parse(_))
        ));
    }

    #[test]
    fn failed_command_leaves_registry_usable() {
        let (reg, _dir, mut sb) = setup();
        let _ = exec(&reg, &mut sb, "nope");
        assert_eq!(
            exec(&reg, &mut sb, "greet again").unwrap(),
            CommandOutput::Text("hello again".to_string())
        );
    }

    #[test]
    fn history_records_lines_and_skips_duplicates() {
        let (reg, _dir, mut sb) = setup();
        exec(&reg, &mut sb, "greet a").unwrap();
        exec(&reg, &mut sb, "greet a").unwrap();
        exec(&reg, &mut sb, "greet b").unwrap();
        assert_eq!(reg.history(), vec!["greet a", "greet b"]);
    }

    #[test]
    fn history_builtin_lists_numbered_entries() {
        let (reg, _dir, mut sb) = setup();
        exec(&reg, &mut sb, "greet x").unwrap();
        match exec(&reg, &mut sb, "history").unwrap() {
            CommandOutput::Text(s) => {
                assert!(s.contains("1"));
                assert!(s.contains("greet x"));
            },
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn help_lists_commands_by_category() {
        let (reg, _dir, mut sb) = setup();
        match exec(&reg, &mut sb, "help").unwrap() {
            CommandOutput::Text(s) => {
                assert!(s.contains("greet"));
                assert!(s.contains("[general]"));
                assert!(s.contains("help <command>"));
            },
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn help_for_single_command_shows_usage() {
        let (reg, _dir, mut sb) = setup();
        match exec(&reg, &mut sb, "help greet").unwrap() {
            CommandOutput::Text(s) => assert!(s.contains("greet [name...]")),
            other => panic!("expected text, got {other:?}"),
        }
    }

    // ---- tokenizer ----

    #[test]
    fn tokenize_simple_words() {
        assert_eq!(tokenize("ls -a /tmp").unwrap(), vec!["ls", "-a", "/tmp"]);
    }

    #[test]
    fn tokenize_double_quotes_group() {
        assert_eq!(
            tokenize("touch \"my file.txt\"").unwrap(),
            vec!["touch", "my file.txt"]
        );
    }

    #[test]
    fn tokenize_single_quotes_literal() {
        assert_eq!(tokenize("echo 'a \"b\" c'").unwrap(), vec!["echo", "a \"b\" c"]);
    }

    #[test]
    fn tokenize_backslash_escape() {
        assert_eq!(tokenize("cat my\\ file").unwrap(), vec!["cat", "my file"]);
    }

    #[test]
    fn tokenize_escaped_quote_in_double() {
        assert_eq!(tokenize("echo \"say \\\"hi\\\"\"").unwrap(), vec![
            "echo",
            "say \"hi\""
        ]);
    }

    #[test]
    fn tokenize_unterminated_quotes_fail() {
        assert!(tokenize("echo 'abc").is_err());
        assert!(tokenize("echo \"abc").is_err());
    }

    #[test]
    fn tokenize_empty_input() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
