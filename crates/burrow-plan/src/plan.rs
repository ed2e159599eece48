//! Plan model and loading.

use burrow_types::error::{Result, ShellError};
use serde::Deserialize;

/// An ordered list of pre-tokenized commands.
///
/// The JSON envelope is `{"commands": [["mkdir", "demo"], ...]}`. Tokens
/// are taken literally; no quoting or re-parsing happens on load.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Plan {
    pub commands: Vec<Vec<String>>,
}

impl Plan {
    /// Parse a plan from its JSON envelope.
    pub fn from_json(input: &str) -> Result<Self> {
        let plan: Plan = serde_json::from_str(input)?;
        for (i, cmd) in plan.commands.iter().enumerate() {
            if cmd.is_empty() {
                return Err(ShellError::Parse(format!("plan step {} is empty", i + 1)));
            }
        }
        Ok(plan)
    }

    /// Drop commands whose name is not in `allowed`, logging each drop.
    pub fn retain_allowed(&mut self, allowed: &[&str]) {
        self.commands.retain(|cmd| {
            let keep = cmd.first().is_some_and(|name| allowed.contains(&name.as_str()));
            if !keep {
                log::warn!("dropping disallowed plan step: {}", render_line(cmd));
            }
            keep
        });
    }

    /// Human-readable preview, one `$ command` line per step.
    pub fn render(&self) -> String {
        self.commands
            .iter()
            .map(|cmd| format!("$ {}", render_line(cmd)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Join tokens back into an interpreter-ready line, quoting tokens that
/// would otherwise split or be misread.
pub(crate) fn render_line(tokens: &[String]) -> String {
    tokens
        .iter()
        .map(|t| quote_token(t))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_token(token: &str) -> String {
    let needs_quoting = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\');
    if !needs_quoting {
        return token.to_string();
    }
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for c in token.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_json_envelope() {
        let plan = Plan::from_json(r#"{"commands": [["mkdir", "demo"], ["ls"]]}"#).unwrap();
        assert_eq!(plan.commands, vec![
            vec!["mkdir".to_string(), "demo".to_string()],
            vec!["ls".to_string()],
        ]);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Plan::from_json("{\"commands\": [[\"ls\""),
            Err(ShellError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_steps() {
        assert!(matches!(
            Plan::from_json(r#"{"commands": [["ls"], []]}"#),
            Err(ShellError::Parse(_))
        ));
    }

    #[test]
    fn render_previews_each_step() {
        let plan = Plan::from_json(r#"{"commands": [["mkdir", "demo"], ["mv", "a", "b"]]}"#)
            .unwrap();
        assert_eq!(plan.render(), "$ mkdir demo\n$ mv a b");
    }

    #[test]
    fn render_quotes_tokens_with_spaces() {
        let plan = Plan {
            commands: vec![vec!["touch".to_string(), "my file.txt".to_string()]],
        };
        assert_eq!(plan.render(), "$ touch \"my file.txt\"");
    }

    #[test]
    fn retain_allowed_drops_unknown_names() {
        let mut plan =
            Plan::from_json(r#"{"commands": [["ls"], ["format", "c:"], ["pwd"]]}"#).unwrap();
        plan.retain_allowed(&["ls", "pwd"]);
        assert_eq!(plan.commands, vec![
            vec!["ls".to_string()],
            vec!["pwd".to_string()],
        ]);
    }
}
