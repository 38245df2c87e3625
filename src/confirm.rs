//! Interactive yes/no confirmation
//!
//! Concurrent tasks share one terminal, so every prompt goes through a
//! process-wide lock. Anything other than an explicit `y` declines,
//! including a failed read.

use std::io::{BufRead, Write};
use std::sync::Mutex;

static PROMPT_LOCK: Mutex<()> = Mutex::new(());

/// Whether a mutating operation asks before touching each file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Never prompt; every subject is approved
    Auto,
    /// Prompt on the terminal for every subject
    Interactive,
}

impl ConfirmPolicy {
    /// Asks the user to approve `subject`. `Auto` always approves.
    pub fn confirm(&self, subject: &str) -> bool {
        match self {
            ConfirmPolicy::Auto => true,
            ConfirmPolicy::Interactive => prompt(subject),
        }
    }
}

fn prompt(subject: &str) -> bool {
    let _guard = PROMPT_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    print!("{subject}? [y/n] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match std::io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim_start().starts_with('y'),
        Err(e) => {
            tracing::warn!("prompt failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_policy_always_approves() {
        assert!(ConfirmPolicy::Auto.confirm("Update /tmp/file"));
    }
}
