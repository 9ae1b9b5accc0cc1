//! Commands of the interactive shell.
//!
//! Every line typed into the shell parses into one [`Command`], and every
//! command maps to one controller or merger call.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{PageCatError, Result};
use crate::session::DocumentId;

/// Usage summary printed by `help`.
pub const HELP: &str = "\
Commands:
  load <file|pattern>...     load PDF files (glob patterns allowed)
  toggle <doc> <page>        select or unselect one page
  select-all <doc>           select every page of a document
  deselect-all <doc>         unselect every page of a document
  remove <doc>               remove a document and its selected pages
  clear                      remove all documents (asks first)
  list [--json]              show documents and the merge order
  merge [output]             merge the selected pages (default: merged.pdf)
  help                       show this help
  quit                       leave the shell

<doc> is a document id as shown by 'list', e.g. 2 or #2.
Quote paths that contain spaces: merge \"out dir/picked.pdf\"";

/// One user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load files matching the given paths or patterns.
    Load(Vec<String>),
    /// Flip the selection state of one page.
    Toggle {
        /// Document to change.
        document: DocumentId,
        /// 1-based page number.
        page: u32,
    },
    /// Select every page of a document.
    SelectAll(DocumentId),
    /// Unselect every page of a document.
    DeselectAll(DocumentId),
    /// Remove a document.
    Remove(DocumentId),
    /// Remove every document.
    Clear,
    /// Show the session.
    List {
        /// Print JSON instead of text.
        json: bool,
    },
    /// Merge the selection, optionally to a specific path.
    Merge(Option<PathBuf>),
    /// Show the command summary.
    Help,
    /// Leave the shell.
    Quit,
}

impl Command {
    /// Check if the command changes the session.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Load(_)
                | Self::Toggle { .. }
                | Self::SelectAll(_)
                | Self::DeselectAll(_)
                | Self::Remove(_)
                | Self::Clear
        )
    }
}

impl FromStr for Command {
    type Err = PageCatError;

    fn from_str(line: &str) -> Result<Self> {
        let words = split_words(line)?;
        let Some((name, args)) = words.split_first() else {
            return Err(PageCatError::invalid_command(line, "empty command"));
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let expect_args = |count: usize, usage: &str| -> Result<()> {
            if args.len() == count {
                Ok(())
            } else {
                Err(PageCatError::invalid_command(line, format!("usage: {usage}")))
            }
        };
        let document = |arg: &str| -> Result<DocumentId> {
            arg.parse()
                .map_err(|_| PageCatError::invalid_command(line, format!("invalid document '{arg}'")))
        };

        match name.to_lowercase().as_str() {
            "load" | "open" => {
                if args.is_empty() {
                    return Err(PageCatError::invalid_command(
                        line,
                        "usage: load <file|pattern>...",
                    ));
                }
                Ok(Self::Load(args.iter().map(|s| s.to_string()).collect()))
            }
            "toggle" | "t" => {
                expect_args(2, "toggle <doc> <page>")?;
                let page = args[1].parse().map_err(|_| {
                    PageCatError::invalid_command(line, format!("invalid page '{}'", args[1]))
                })?;
                Ok(Self::Toggle {
                    document: document(args[0])?,
                    page,
                })
            }
            "select-all" => {
                expect_args(1, "select-all <doc>")?;
                Ok(Self::SelectAll(document(args[0])?))
            }
            "deselect-all" => {
                expect_args(1, "deselect-all <doc>")?;
                Ok(Self::DeselectAll(document(args[0])?))
            }
            "remove" | "rm" => {
                expect_args(1, "remove <doc>")?;
                Ok(Self::Remove(document(args[0])?))
            }
            "clear" => {
                expect_args(0, "clear")?;
                Ok(Self::Clear)
            }
            "list" | "ls" => match args.as_slice() {
                [] => Ok(Self::List { json: false }),
                ["--json"] => Ok(Self::List { json: true }),
                _ => Err(PageCatError::invalid_command(line, "usage: list [--json]")),
            },
            "merge" => match args.as_slice() {
                [] => Ok(Self::Merge(None)),
                [path] => Ok(Self::Merge(Some(PathBuf::from(path)))),
                _ => Err(PageCatError::invalid_command(line, "usage: merge [output]")),
            },
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(PageCatError::invalid_command(
                line,
                format!("unknown command '{other}'"),
            )),
        }
    }
}

/// Split a command line into words. Single or double quotes group words
/// containing spaces; quotes do not nest and there are no escapes.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current: Option<String> = None;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.get_or_insert_with(String::new).push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                current.get_or_insert_with(String::new);
            }
            None if c.is_whitespace() => words.extend(current.take()),
            None => current.get_or_insert_with(String::new).push(c),
        }
    }

    if let Some(q) = quote {
        return Err(PageCatError::invalid_command(
            line,
            format!("missing closing {q}"),
        ));
    }
    words.extend(current);
    Ok(words)
}
