use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::*;

use crate::interrupt::InterruptGate;

/// Interactive gate in front of recursive deletions.
pub trait Confirm {
    fn confirm_delete(&mut self, path: &Path) -> bool;
}

/// Asks on stdin; `y` or `yes` proceeds, anything else (including EOF) declines.
pub struct StdinConfirm {
    template: String,
    gate: Option<InterruptGate>,
}

impl StdinConfirm {
    /// `template` is the question with a `{0}` placeholder for the path.
    pub fn new(template: String) -> Self {
        Self { template, gate: None }
    }

    /// Lets Ctrl-C end the shell while the question is waiting for an answer.
    pub fn with_gate(mut self, gate: InterruptGate) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl Confirm for StdinConfirm {
    fn confirm_delete(&mut self, path: &Path) -> bool {
        print!(
            "{}",
            self.template.replace("{0}", &path.display().to_string()).yellow()
        );
        io::stdout().flush().ok();
        let mut input = String::new();
        if let Some(gate) = &self.gate {
            gate.enter_prompt();
        }
        let read = io::stdin().lock().read_line(&mut input);
        if let Some(gate) = &self.gate {
            gate.leave_prompt();
        }
        match read {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&input),
        }
    }
}

/// Fixed answer, for non-interactive runs and tests.
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm_delete(&mut self, _path: &Path) -> bool {
        self.0
    }
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_and_long_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("n"));
        assert!(!is_yes(""));
    }
}
