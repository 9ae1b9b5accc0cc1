//! Interactive command shell.
//!
//! Each input line is parsed into one [`Command`] and runs exactly one
//! controller or merger call. Errors are reported and the shell keeps going;
//! only a failure to read input ends it early.

use pagecat::command::{Command, HELP};
use pagecat::config::Config;
use pagecat::controller::SelectionController;
use pagecat::error::{PageCatError, Result};
use pagecat::output::{OutputFormatter, display_session};
use pagecat::session::{DocumentId, SelectionEntry};
use tokio::io::AsyncBufRead;
use tracing::debug;

use crate::actions::{load_inputs, merge_to_file};
use crate::prompt::Prompter;

const PROMPT: &str = "pagecat> ";

/// What the shell does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Leave the shell.
    Quit,
}

/// The interactive front-end over one controller.
pub struct Shell<'a, R> {
    controller: SelectionController,
    config: &'a Config,
    formatter: &'a OutputFormatter,
    prompter: Prompter<R>,
}

impl<'a, R: AsyncBufRead + Unpin> Shell<'a, R> {
    /// Create a shell around an already populated controller.
    pub fn new(
        controller: SelectionController,
        config: &'a Config,
        formatter: &'a OutputFormatter,
        prompter: Prompter<R>,
    ) -> Self {
        Self {
            controller,
            config,
            formatter,
            prompter,
        }
    }

    /// The controller driven by this shell.
    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    /// Read and run commands until `quit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        self.formatter
            .info("Type 'help' for the list of commands, 'quit' to leave.");

        while let Some(line) = self.prompter.next_line(PROMPT).await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let flow = match line.parse::<Command>() {
                Ok(command) => self.execute(command).await,
                Err(err) => Err(err),
            };
            match flow {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(PageCatError::Cancelled) => self.formatter.info("Cancelled."),
                Err(err) => self.formatter.error(&err.to_string()),
            }
        }
        Ok(())
    }

    /// Run one command.
    pub async fn execute(&mut self, command: Command) -> Result<Flow> {
        debug!(?command, "shell command");
        let mutating = command.is_mutating();
        match command {
            Command::Load(patterns) => {
                load_inputs(&mut self.controller, &patterns, self.config, self.formatter).await?;
            }
            Command::Toggle { document, page } => {
                let selected = self.controller.toggle_page(document, page).ok_or_else(|| {
                    PageCatError::invalid_selection(
                        SelectionEntry::new(document, page).to_string(),
                        "no such document or page",
                    )
                })?;
                if selected {
                    let position = self.controller.session().selection().len();
                    self.formatter.info(&format!(
                        "Selected {document} page {page} (position {position})"
                    ));
                } else {
                    self.formatter
                        .info(&format!("Unselected {document} page {page}"));
                }
            }
            Command::SelectAll(document) => {
                self.require_document(document)?;
                let added = self.controller.select_all_pages(document);
                self.formatter
                    .info(&format!("Selected {added} more page(s) of {document}"));
            }
            Command::DeselectAll(document) => {
                self.require_document(document)?;
                let removed = self.controller.deselect_all_pages(document);
                self.formatter
                    .info(&format!("Unselected {removed} page(s) of {document}"));
            }
            Command::Remove(document) => {
                let removed = self
                    .controller
                    .remove_document(document)
                    .ok_or_else(|| unknown_document(document))?;
                self.formatter
                    .info(&format!("Removed {} ({document})", removed.name()));
            }
            Command::Clear => {
                let documents = self.controller.session().documents().len();
                let answer = if documents == 0 {
                    true
                } else {
                    self.prompter
                        .confirm(&format!("Remove all {documents} document(s)?"))
                        .await?
                };
                self.controller.clear_all(|_| answer)?;
                if documents > 0 {
                    self.formatter.info("Session cleared.");
                }
            }
            Command::List { json } => {
                display_session(self.formatter, &self.controller.view(), json)?;
            }
            Command::Merge(path) => {
                let path = path.unwrap_or_else(|| self.config.output.clone());
                merge_to_file(
                    self.controller.session(),
                    &path,
                    self.config,
                    self.formatter,
                    &mut self.prompter,
                )
                .await?;
            }
            Command::Help => self.formatter.output(HELP),
            Command::Quit => return Ok(Flow::Quit),
        }
        if mutating {
            let session = self.controller.session();
            debug!(
                documents = session.documents().len(),
                selected = session.selection().len(),
                "session changed"
            );
        }
        Ok(Flow::Continue)
    }

    fn require_document(&self, document: DocumentId) -> Result<()> {
        self.controller
            .session()
            .document(document)
            .map(|_| ())
            .ok_or_else(|| unknown_document(document))
    }
}

fn unknown_document(document: DocumentId) -> PageCatError {
    PageCatError::invalid_selection(document.to_string(), "no such document")
}
