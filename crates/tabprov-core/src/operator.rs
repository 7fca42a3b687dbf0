use std::io::{BufRead, Write};

use crate::error::{ProvisionError, Result};

/// The human at the bench. Progress messages go out through `say`; manual
/// checkpoints block in `confirm` until the operator acknowledges them.
pub trait Operator {
    /// Print a progress message. `newline = false` leaves the cursor on the
    /// line so a following message ("done.") completes it.
    fn say(&mut self, msg: &str, newline: bool);

    /// Block until the operator acknowledges `prompt`.
    fn confirm(&mut self, prompt: &str) -> Result<()>;

    /// Read one line of free-form input, trimmed. `None` once input is closed.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Operator attached to the controlling terminal.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn say(&mut self, msg: &str, newline: bool) {
        let written = if newline {
            writeln!(self.output, "{msg}")
        } else {
            write!(self.output, "{msg}")
        };
        if let Err(e) = written.and_then(|()| self.output.flush()) {
            tracing::debug!("progress message dropped: {e}");
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<()> {
        match self.ask(prompt)? {
            Some(_) => Ok(()),
            None => Err(ProvisionError::OperatorAborted),
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
