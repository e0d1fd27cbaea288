//! Confirmers for tool calls requested by the assistant

use std::io::{self, BufRead, Write};

use crate::domain::{Confirmer, PendingCall};

/// Asks on the terminal: calls are listed on stderr, the answer read from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl TerminalConfirmer {
    pub fn new() -> Self {
        Self
    }

    /// Write the prompt for `calls` to `out`
    pub fn render(calls: &[PendingCall<'_>], out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "The assistant wants to run:")?;
        for call in calls {
            writeln!(out, "  {}", call)?;
        }
        write!(out, "Proceed? [y/N] ")?;
        out.flush()
    }

    /// Prompt on `out` and read one answer line from `input`
    pub fn ask(
        calls: &[PendingCall<'_>],
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> io::Result<bool> {
        Self::render(calls, out)?;
        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }
        Ok(is_affirmative(&answer))
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, calls: &[PendingCall<'_>]) -> anyhow::Result<bool> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut stderr = io::stderr();
        Ok(Self::ask(calls, &mut input, &mut stderr)?)
    }
}

/// Only an explicit `y` or `yes` counts as approval
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
