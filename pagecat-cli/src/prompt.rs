//! Line input for the shell and for yes/no questions.

use std::io::{IsTerminal, Write};

use pagecat::error::{PageCatError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

/// Reads answers and commands one line at a time.
pub struct Prompter<R> {
    lines: Lines<R>,
    show_prompts: bool,
}

impl Prompter<BufReader<Stdin>> {
    /// Read from stdin. Prompts are only drawn when stdin is a terminal.
    pub fn stdin() -> Self {
        let show_prompts = std::io::stdin().is_terminal();
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            show_prompts,
        }
    }
}

impl<R: AsyncBufRead + Unpin> Prompter<R> {
    /// Read from any buffered reader, without drawing prompts.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            show_prompts: false,
        }
    }

    /// Next input line, or `None` at end of input.
    pub async fn next_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.show_prompts {
            eprint!("{prompt}");
            std::io::stderr().flush().ok();
        }
        self.lines
            .next_line()
            .await
            .map_err(|err| PageCatError::other(format!("Failed to read input: {err}")))
    }

    /// Ask a yes/no question. Anything but `y` or `yes` is a no, and so is
    /// end of input.
    pub async fn confirm(&mut self, question: &str) -> Result<bool> {
        eprint!("{question} [y/N]: ");
        std::io::stderr().flush().ok();

        let answer = self
            .lines
            .next_line()
            .await
            .map_err(|err| PageCatError::other(format!("Failed to read input: {err}")))?;
        Ok(answer.is_some_and(|answer| {
            matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
        }))
    }
}
