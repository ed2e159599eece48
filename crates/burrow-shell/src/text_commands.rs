//! Line-oriented text commands: `head` and `tail`.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use burrow_types::error::{Result, ShellError};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

const DEFAULT_LINES: usize = 10;

pub fn register_text_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(HeadCmd));
    reg.register(Box::new(TailCmd));
}

/// Parse `[-n N] <file>...` and return `(line_count, files)`.
///
/// A malformed count aborts the whole command rather than being skipped
/// as a bad file argument.
fn parse_line_args<'a>(name: &str, args: &[&'a str]) -> Result<(usize, Vec<&'a str>)> {
    let mut count = DEFAULT_LINES;
    let mut files = Vec::new();
    let mut iter = args.iter();
    while let Some(a) = iter.next() {
        if *a == "-n" {
            let Some(value) = iter.next() else {
                return Err(ShellError::Usage(format!("{name} [-n N] <file>...")));
            };
            count = value
                .parse()
                .map_err(|_| ShellError::Parse(format!("invalid line count: {value}")))?;
        } else {
            files.push(*a);
        }
    }
    if files.is_empty() {
        return Err(ShellError::Usage(format!("{name} [-n N] <file>...")));
    }
    Ok((count, files))
}

/// First `n` lines of a file, terminators preserved, invalid UTF-8
/// replaced. Never reads past what it needs.
fn read_head(path: &Path, n: usize) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut out = String::new();
    let mut buf = Vec::new();
    for _ in 0..n {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        out.push_str(&String::from_utf8_lossy(&buf));
    }
    Ok(out)
}

/// Last `n` lines of a file via a bounded ring, so memory stays
/// proportional to the request rather than the file.
fn read_tail(path: &Path, n: usize) -> std::io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut ring: VecDeque<Vec<u8>> = VecDeque::with_capacity(n.min(1024));
    loop {
        let mut buf = Vec::new();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        if ring.len() == n {
            ring.pop_front();
        }
        if n > 0 {
            ring.push_back(buf);
        }
    }
    let mut out = String::new();
    for line in ring {
        out.push_str(&String::from_utf8_lossy(&line));
    }
    Ok(out)
}

fn run_line_command(
    name: &str,
    args: &[&str],
    env: &mut Environment<'_>,
    read: fn(&Path, usize) -> std::io::Result<String>,
) -> Result<CommandOutput> {
    let (count, files) = parse_line_args(name, args)?;
    let mut out = String::new();
    for raw in files {
        let path = env.sandbox.resolve(raw);
        if !path.is_file() {
            out.push_str(&format!(
                "error: {}\n",
                ShellError::NotFound(raw.to_string())
            ));
            continue;
        }
        out.push_str(&read(&path, count)?);
    }
    Ok(CommandOutput::Text(out))
}

// ---------------------------------------------------------------------------
// head
// ---------------------------------------------------------------------------

struct HeadCmd;
impl Command for HeadCmd {
    fn name(&self) -> &str {
        "head"
    }
    fn description(&self) -> &str {
        "Print the first lines of files"
    }
    fn usage(&self) -> &str {
        "head [-n N] <file>..."
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        run_line_command("head", args, env, read_head)
    }
}

// ---------------------------------------------------------------------------
// tail
// ---------------------------------------------------------------------------

struct TailCmd;
impl Command for TailCmd {
    fn name(&self) -> &str {
        "tail"
    }
    fn description(&self) -> &str {
        "Print the last lines of files"
    }
    fn usage(&self) -> &str {
        "tail [-n N] <file>..."
    }
    fn category(&self) -> &str {
        "text"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        run_line_command("tail", args, env, read_tail)
    }
}
