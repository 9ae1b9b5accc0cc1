//! pagecat - Pick pages from several PDF files and merge them into one.
//!
//! Documents are loaded into a [`Session`], pages are selected in the order
//! they should appear, and the [`Merger`] copies exactly those pages, in
//! that order, into a new PDF.
//!
//! # Examples
//!
//! ## Pick pages and merge
//!
//! ```no_run
//! use pagecat::controller::SelectionController;
//! use pagecat::io::{InputFile, PdfWriter};
//! use pagecat::merge::Merger;
//! use std::path::Path;
//!
//! # async fn example() -> pagecat::Result<()> {
//! let mut controller = SelectionController::new();
//! let files = vec![
//!     InputFile::from_path(Path::new("a.pdf")).await?,
//!     InputFile::from_path(Path::new("b.pdf")).await?,
//! ];
//! let ids = controller.load_files(files).await?;
//!
//! controller.toggle_page(ids[0], 2);
//! controller.toggle_page(ids[1], 1);
//! controller.toggle_page(ids[0], 1);
//!
//! let output = Merger::new()
//!     .merge(controller.session(), |progress| {
//!         println!("{}/{}", progress.processed, progress.total);
//!     })
//!     .await?;
//! PdfWriter::new().save(&output.bytes, Path::new("merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving it with commands
//!
//! ```
//! use pagecat::command::Command;
//!
//! let command: Command = "toggle 1 3".parse().unwrap();
//! assert!(command.is_mutating());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod io;
pub mod merge;
pub mod output;
pub mod render;
pub mod session;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use controller::SelectionController;
pub use error::{PageCatError, Result};
pub use merge::Merger;
pub use session::Session;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
