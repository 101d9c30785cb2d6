//! Terminal console for step traces and verdicts
//!
//! Every line is flushed immediately so traces interleave correctly with the
//! output of child processes sharing the terminal.

use crate::cli::output::{CHECK, CROSS, INFO};
use crate::execution::Console;
use console::{style, Term};
use std::io::{self, Write};

/// [`Console`] writing to stdout
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    pub fn new() -> Self {
        Self
    }

    fn print(&self, line: &str) {
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

impl Console for TerminalConsole {
    fn write(&self, line: &str) {
        self.print(line);
    }

    fn info(&self, message: &str) {
        self.print(&format!("{}{}", INFO, style(message).cyan()));
    }

    fn ok(&self, message: &str) {
        self.print(&format!("{}{}", CHECK, style(message).green()));
    }

    fn error(&self, message: &str) {
        self.print(&format!("{}{}", CROSS, style(message).red()));
    }

    fn clear(&self) {
        let _ = Term::stdout().clear_screen();
    }
}
