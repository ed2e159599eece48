//! Shell configuration -- sandbox root, history file, confirmation default.
//!
//! Loaded from a TOML file; every field is optional so a host can supply
//! only what it wants to override. CLI flags win over file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How destructive operations are confirmed when no interactive prompt
/// is wired in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmDefault {
    /// Ask the host's confirmation policy (interactive prompt if any).
    #[default]
    Prompt,
    /// Pre-approve every destructive operation.
    Always,
    /// Pre-decline every destructive operation.
    Never,
}

/// Host configuration for a shell session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Directory all filesystem operations are confined to.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Append-only command log. `None` disables persistence.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// Confirmation behavior for recursive deletes.
    #[serde(default)]
    pub confirm: ConfirmDefault,
}

impl ShellConfig {
    /// Load a config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}
