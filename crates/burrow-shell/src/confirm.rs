//! Confirmation policy for destructive operations.
//!
//! Handlers never read an input stream themselves; they ask the policy
//! injected by the host. An interactive host wires a prompt, a
//! non-interactive one supplies a pre-decided answer.

/// Decision capability for destructive operations (`rm -r`).
pub trait ConfirmPolicy {
    /// Decide whether the described operation may proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// A pre-decided answer, for non-interactive hosts. Defaults to deny so a
/// host without a prompt can never block or destroy silently.
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirm(pub bool);

impl Default for StaticConfirm {
    fn default() -> Self {
        Self(false)
    }
}

impl ConfirmPolicy for StaticConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

impl<F: Fn(&str) -> bool> ConfirmPolicy for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_confirm_returns_its_answer() {
        assert!(StaticConfirm(true).confirm("rm -r /x"));
        assert!(!StaticConfirm(false).confirm("rm -r /x"));
    }

    #[test]
    fn default_is_deny() {
        assert!(!StaticConfirm::default().confirm("anything"));
    }

    #[test]
    fn closures_are_policies() {
        let policy = |prompt: &str| prompt.contains("safe");
        assert!(policy.confirm("safe to remove"));
        assert!(!policy.confirm("dangerous"));
    }
}
