//! Command interpreter for the sandboxed shell.
//!
//! The shell is a registry-based dispatch system. Commands implement the
//! `Command` trait and are registered by name. The interpreter tokenizes
//! input lines, resolves the command name, and dispatches `execute()`.
//! All filesystem access goes through the `burrow-sandbox` resolver, so
//! every operation stays inside the configured root.

mod commands;
mod confirm;
mod history;
mod interpreter;
mod system_commands;
mod text_commands;

/// Register all built-in commands (fs, text, system) into a registry.
pub use commands::register_builtins;
/// Decision capability for destructive operations.
pub use confirm::{ConfirmPolicy, StaticConfirm};
/// Append-only command log collaborators.
pub use history::{FileHistory, HistorySink, NullHistory};
/// A single executable command trait.
pub use interpreter::Command;
/// Outcome of a command: text, nothing, or a termination request.
pub use interpreter::CommandOutput;
/// Registry of available commands with dispatch.
pub use interpreter::CommandRegistry;
/// Shared mutable state passed to every command.
pub use interpreter::Environment;
/// Tokenize a command line respecting quotes and escapes.
pub use interpreter::tokenize;
