//! Foundation types shared across the burrow workspace.

pub mod config;
pub mod error;

pub use config::{ConfirmDefault, ShellConfig};
pub use error::{Result, ShellError};
