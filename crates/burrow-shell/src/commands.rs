//! Built-in filesystem commands for the sandboxed shell.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use burrow_types::error::{Result, ShellError};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Register all built-in commands into a registry.
///
/// This covers the filesystem core plus the text (`head`/`tail`) and
/// system (`df`/`sysmon`/`ps`) command modules.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(PwdCmd));
    reg.register(Box::new(LsCmd));
    reg.register(Box::new(CdCmd));
    reg.register(Box::new(MkdirCmd));
    reg.register(Box::new(RmCmd));
    reg.register(Box::new(TouchCmd));
    reg.register(Box::new(CatCmd));
    reg.register(Box::new(EchoCmd));
    reg.register(Box::new(CpCmd));
    reg.register(Box::new(MvCmd));
    reg.register(Box::new(ExitCmd));
    reg.register(Box::new(QuitCmd));
    crate::text_commands::register_text_commands(reg);
    crate::system_commands::register_system_commands(reg);
}

// ---------------------------------------------------------------------------
// pwd
// ---------------------------------------------------------------------------

struct PwdCmd;
impl Command for PwdCmd {
    fn name(&self) -> &str {
        "pwd"
    }
    fn description(&self) -> &str {
        "Print working directory"
    }
    fn usage(&self) -> &str {
        "pwd"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(
            env.sandbox.cwd().display().to_string(),
        ))
    }
}

// ---------------------------------------------------------------------------
// ls
// ---------------------------------------------------------------------------

struct LsCmd;
impl Command for LsCmd {
    fn name(&self) -> &str {
        "ls"
    }
    fn description(&self) -> &str {
        "List directory contents"
    }
    fn usage(&self) -> &str {
        "ls [-a] [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut show_all = false;
        let mut target = "";
        for a in args {
            if *a == "-a" {
                show_all = true;
            } else {
                // Anything else (unknown flags included) is a path.
                target = a;
            }
        }
        let path = env.sandbox.resolve(target);
        if !path.exists() {
            return Err(ShellError::NotFound(display_target(target, &path)));
        }
        if path.is_file() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            return Ok(CommandOutput::Text(name));
        }

        // Directories first, then case-insensitive name order.
        let mut entries: Vec<(String, bool)> = Vec::new();
        for entry in fs::read_dir(&path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !show_all && name.starts_with('.') {
                continue;
            }
            let is_dir = entry.file_type()?.is_dir();
            entries.push((name, is_dir));
        }
        entries.sort_by(|a, b| (!a.1, a.0.to_lowercase()).cmp(&(!b.1, b.0.to_lowercase())));

        let lines: Vec<String> = entries
            .into_iter()
            .map(|(name, is_dir)| if is_dir { format!("{name}/") } else { name })
            .collect();
        if lines.is_empty() {
            return Ok(CommandOutput::None);
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

// ---------------------------------------------------------------------------
// cd
// ---------------------------------------------------------------------------

struct CdCmd;
impl Command for CdCmd {
    fn name(&self) -> &str {
        "cd"
    }
    fn description(&self) -> &str {
        "Change working directory"
    }
    fn usage(&self) -> &str {
        "cd [path]"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        match args.first() {
            None => {
                env.sandbox.reset_cwd();
            },
            Some(raw) => {
                let target = env.sandbox.resolve(raw);
                env.sandbox.set_cwd(&target)?;
            },
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// mkdir
// ---------------------------------------------------------------------------

struct MkdirCmd;
impl Command for MkdirCmd {
    fn name(&self) -> &str {
        "mkdir"
    }
    fn description(&self) -> &str {
        "Create directories (parents included, idempotent)"
    }
    fn usage(&self) -> &str {
        "mkdir <dir>..."
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(ShellError::Usage("mkdir <dir>...".to_string()));
        }
        for raw in args {
            fs::create_dir_all(env.sandbox.resolve(raw))?;
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// rm
// ---------------------------------------------------------------------------

struct RmCmd;
impl Command for RmCmd {
    fn name(&self) -> &str {
        "rm"
    }
    fn description(&self) -> &str {
        "Remove files, or directories with -r"
    }
    fn usage(&self) -> &str {
        "rm [-r] <path>..."
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let mut recursive = false;
        let mut paths = Vec::new();
        for a in args {
            if *a == "-r" {
                recursive = true;
            } else {
                paths.push(*a);
            }
        }
        if paths.is_empty() {
            return Err(ShellError::Usage("rm [-r] <path>...".to_string()));
        }

        // Per-path failures are reported inline; the command keeps going.
        let mut lines = Vec::new();
        for raw in paths {
            let path = env.sandbox.resolve(raw);
            if !path.exists() {
                lines.push(format!("error: {}", ShellError::NotFound(raw.to_string())));
                continue;
            }
            if path.is_dir() {
                if !recursive {
                    lines.push(format!(
                        "error: {}",
                        ShellError::IsADirectory(raw.to_string())
                    ));
                    continue;
                }
                // A declined confirmation is "aborted", not an error.
                if !env.confirm.confirm(&format!("rm -r {}", path.display())) {
                    lines.push("aborted".to_string());
                    continue;
                }
                if let Err(e) = fs::remove_dir_all(&path) {
                    lines.push(format!("error: {}", ShellError::Io(e)));
                }
            } else if let Err(e) = fs::remove_file(&path) {
                lines.push(format!("error: {}", ShellError::Io(e)));
            }
        }
        if lines.is_empty() {
            Ok(CommandOutput::None)
        } else {
            Ok(CommandOutput::Text(lines.join("\n")))
        }
    }
}

// ---------------------------------------------------------------------------
// touch
// ---------------------------------------------------------------------------

struct TouchCmd;
impl Command for TouchCmd {
    fn name(&self) -> &str {
        "touch"
    }
    fn description(&self) -> &str {
        "Create empty files or update modification time"
    }
    fn usage(&self) -> &str {
        "touch <file>..."
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(ShellError::Usage("touch <file>...".to_string()));
        }
        for raw in args {
            let path = env.sandbox.resolve(raw);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            file.set_modified(SystemTime::now())?;
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// cat
// ---------------------------------------------------------------------------

struct CatCmd;
impl Command for CatCmd {
    fn name(&self) -> &str {
        "cat"
    }
    fn description(&self) -> &str {
        "Print file contents"
    }
    fn usage(&self) -> &str {
        "cat <file>..."
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.is_empty() {
            return Err(ShellError::Usage("cat <file>...".to_string()));
        }
        // Contents are emitted verbatim; invalid UTF-8 is replaced, a
        // missing file is a per-file error and the rest still print.
        let mut out = String::new();
        for raw in args {
            let path = env.sandbox.resolve(raw);
            if !path.is_file() {
                out.push_str(&format!(
                    "error: {}\n",
                    ShellError::NotFound(raw.to_string())
                ));
                continue;
            }
            let data = fs::read(&path)?;
            out.push_str(&String::from_utf8_lossy(&data));
        }
        Ok(CommandOutput::Text(out))
    }
}

// ---------------------------------------------------------------------------
// echo
// ---------------------------------------------------------------------------

struct EchoCmd;
impl Command for EchoCmd {
    fn name(&self) -> &str {
        "echo"
    }
    fn description(&self) -> &str {
        "Print arguments"
    }
    fn usage(&self) -> &str {
        "echo [text...]"
    }
    fn category(&self) -> &str {
        "general"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Text(args.join(" ")))
    }
}

// ---------------------------------------------------------------------------
// cp
// ---------------------------------------------------------------------------

struct CpCmd;
impl Command for CpCmd {
    fn name(&self) -> &str {
        "cp"
    }
    fn description(&self) -> &str {
        "Copy a file or directory tree"
    }
    fn usage(&self) -> &str {
        "cp <src> <dst>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.len() < 2 {
            return Err(ShellError::Usage("cp <src> <dst>".to_string()));
        }
        let src = env.sandbox.resolve(args[0]);
        let mut dst = env.sandbox.resolve(args[1]);
        if !src.exists() {
            return Err(ShellError::NotFound(args[0].to_string()));
        }
        // An existing destination directory receives the source inside it
        // under the source's own name.
        if dst.is_dir()
            && let Some(name) = src.file_name()
        {
            dst = dst.join(name);
        }
        if src.is_dir() {
            copy_tree(&src, &dst)?;
        } else {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dst)?;
            copy_mtime(&src, &dst);
        }
        Ok(CommandOutput::None)
    }
}

/// Recursively copy a directory, merging into an existing destination.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
            copy_mtime(&from, &to);
        }
    }
    Ok(())
}

/// Best-effort carry-over of the source's modification time.
fn copy_mtime(src: &Path, dst: &Path) {
    if let Ok(meta) = fs::metadata(src)
        && let Ok(mtime) = meta.modified()
        && let Ok(file) = fs::OpenOptions::new().write(true).open(dst)
    {
        let _ = file.set_modified(mtime);
    }
}

// ---------------------------------------------------------------------------
// mv
// ---------------------------------------------------------------------------

struct MvCmd;
impl Command for MvCmd {
    fn name(&self) -> &str {
        "mv"
    }
    fn description(&self) -> &str {
        "Move or rename a file or directory"
    }
    fn usage(&self) -> &str {
        "mv <src> <dst>"
    }
    fn category(&self) -> &str {
        "filesystem"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.len() < 2 {
            return Err(ShellError::Usage("mv <src> <dst>".to_string()));
        }
        let src = env.sandbox.resolve(args[0]);
        let mut dst = env.sandbox.resolve(args[1]);
        if !src.exists() {
            return Err(ShellError::NotFound(args[0].to_string()));
        }
        if dst.is_dir()
            && let Some(name) = src.file_name()
        {
            dst = dst.join(name);
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        if fs::rename(&src, &dst).is_err() {
            // Rename can fail across mount points; fall back to copy+delete.
            if src.is_dir() {
                copy_tree(&src, &dst)?;
                fs::remove_dir_all(&src)?;
            } else {
                fs::copy(&src, &dst)?;
                copy_mtime(&src, &dst);
                fs::remove_file(&src)?;
            }
        }
        Ok(CommandOutput::None)
    }
}

// ---------------------------------------------------------------------------
// exit / quit
// ---------------------------------------------------------------------------

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn description(&self) -> &str {
        "End the session"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Terminate)
    }
}

struct QuitCmd;
impl Command for QuitCmd {
    fn name(&self) -> &str {
        "quit"
    }
    fn description(&self) -> &str {
        "End the session (alias for exit)"
    }
    fn usage(&self) -> &str {
        "quit"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Terminate)
    }
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

/// Name a path in an error: the user's token when they gave one, the
/// resolved path otherwise.
fn display_target(raw: &str, resolved: &Path) -> String {
    if raw.is_empty() {
        resolved.display().to_string()
    } else {
        raw.to_string()
    }
}
