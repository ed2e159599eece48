//! Error types for the burrow shell.

use std::io;

/// Errors produced by the shell core.
///
/// Every variant renders as a single human-readable line; callers at the
/// interpreter boundary print `error: {e}` and keep going. Nothing here is
/// allowed to carry a raw backtrace to the user.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Malformed tokenization (unterminated quote, etc.).
    #[error("parse error: {0}")]
    Parse(String),

    /// First token did not match any registered command.
    #[error("unknown command: {0}. Try 'help'.")]
    UnknownCommand(String),

    /// Wrong arity or missing required argument; names the correct usage.
    #[error("usage: {0}")]
    Usage(String),

    /// Path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Operation needs a directory but got something else.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Operation refuses to act on a directory (e.g. `rm` without `-r`).
    #[error("is a directory (use -r): {0}")]
    IsADirectory(String),

    /// A resolved path ended up outside the sandbox root. The resolver
    /// clamps instead of raising this, so it only surfaces from the
    /// defensive re-checks (e.g. `cd`).
    #[error("access outside sandbox root is blocked: {0}")]
    AccessViolation(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display() {
        let e = ShellError::Parse("unterminated single quote".into());
        assert_eq!(format!("{e}"), "parse error: unterminated single quote");
    }

    #[test]
    fn unknown_command_names_token() {
        let e = ShellError::UnknownCommand("frobnicate".into());
        let msg = format!("{e}");
        assert!(msg.contains("frobnicate"));
        assert!(msg.contains("help"));
    }

    #[test]
    fn usage_error_display() {
        let e = ShellError::Usage("mkdir <dir>...".into());
        assert_eq!(format!("{e}"), "usage: mkdir <dir>...");
    }

    #[test]
    fn not_found_display() {
        let e = ShellError::NotFound("a.txt".into());
        assert_eq!(format!("{e}"), "not found: a.txt");
    }

    #[test]
    fn is_a_directory_suggests_recursive_flag() {
        let e = ShellError::IsADirectory("build".into());
        assert!(format!("{e}").contains("use -r"));
    }

    #[test]
    fn access_violation_display() {
        let e = ShellError::AccessViolation("/etc/passwd".into());
        assert!(format!("{e}").contains("blocked"));
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: ShellError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: ShellError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: ShellError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn result_alias_roundtrip() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.unwrap(), 42);
        let err: Result<i32> = Err(ShellError::NotFound("x".into()));
        assert!(err.is_err());
    }
}
