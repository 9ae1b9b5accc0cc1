//! Error types for pagecat.
//!
//! Every failure in the library is a [`PageCatError`]. Errors carry enough
//! context (file name, page number, output path) to be shown to the user as-is,
//! and [`PageCatError::kind`] sorts them into the categories the front-ends
//! care about:
//!
//! - **User**: nothing selected, no PDF among the offered files, declined confirmation
//! - **Decode / Render / Build**: malformed or unsupported PDF content
//! - **Merge**: a merge that was aborted, wrapping the underlying cause
//! - **Download**: the merged bytes could not be handed to the user
//! - **Config / Io**: invalid arguments and generic I/O failures

use std::io;
use std::path::PathBuf;

/// Result type alias for pagecat operations.
pub type Result<T> = std::result::Result<T, PageCatError>;

/// Broad category of a [`PageCatError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid user action; shown as a dismissible message, state unchanged.
    User,
    /// Source bytes could not be decoded as a PDF.
    Decode,
    /// A page preview could not be rendered.
    Render,
    /// The output document could not be constructed.
    Build,
    /// A merge was aborted.
    Merge,
    /// The merged document could not be written out.
    Download,
    /// Invalid configuration or arguments.
    Config,
    /// Generic I/O failure.
    Io,
}

/// Main error type for pagecat operations.
#[derive(Debug, thiserror::Error)]
pub enum PageCatError {
    /// None of the offered files was declared as a PDF.
    #[error("No valid PDF files to load ({skipped} file(s) skipped)\n  Only application/pdf files are accepted")]
    NoValidPdfFiles {
        /// Number of files that were skipped.
        skipped: usize,
    },

    /// A merge was requested with an empty selection.
    #[error("Nothing selected\n  Select at least one page before merging")]
    NothingSelected,

    /// A selection refers to a document or page that does not exist.
    #[error("Invalid selection '{spec}': {reason}")]
    InvalidSelection {
        /// The selection as written by the user.
        spec: String,
        /// Why it could not be applied.
        reason: String,
    },

    /// A shell command could not be parsed.
    #[error("Invalid command '{input}': {reason}\n  Type 'help' for a list of commands")]
    InvalidCommand {
        /// The line as typed.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The user declined a confirmation prompt.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file exists but could not be read.
    #[error("Cannot access file: {}\n  Reason: {source}", path.display())]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The decoder rejected the bytes of a file.
    #[error("Failed to decode PDF: {name}\n  Reason: {reason}")]
    FailedToDecode {
        /// Display name of the file.
        name: String,
        /// Message reported by the decoder.
        reason: String,
    },

    /// The file is encrypted and cannot be processed.
    #[error(
        "PDF is encrypted and cannot be processed: {name}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools"
    )]
    EncryptedPdf {
        /// Display name of the file.
        name: String,
    },

    /// A page preview could not be rendered.
    #[error("Failed to render page {page} of {name}\n  Reason: {reason}")]
    FailedToRender {
        /// Display name of the file.
        name: String,
        /// 1-based page number.
        page: u32,
        /// Message reported by the renderer.
        reason: String,
    },

    /// The document builder failed (invalid page index, corrupt document, ...).
    #[error("Failed to build output document: {reason}")]
    BuildFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// A merge was aborted; the session was left unchanged.
    #[error("Merge operation failed: {source}")]
    MergeFailed {
        /// The failure that aborted the merge.
        #[source]
        source: Box<PageCatError>,
    },

    /// Output file already exists and overwriting is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create the output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write to the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<anyhow::Error> for PageCatError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(format!("{err:#}"))
    }
}

impl PageCatError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a FailedToDecode error.
    pub fn failed_to_decode(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FailedToDecode {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an EncryptedPdf error.
    pub fn encrypted_pdf(name: impl Into<String>) -> Self {
        Self::EncryptedPdf { name: name.into() }
    }

    /// Create a FailedToRender error.
    pub fn failed_to_render(name: impl Into<String>, page: u32, reason: impl Into<String>) -> Self {
        Self::FailedToRender {
            name: name.into(),
            page,
            reason: reason.into(),
        }
    }

    /// Create a BuildFailed error.
    pub fn build_failed(reason: impl Into<String>) -> Self {
        Self::BuildFailed {
            reason: reason.into(),
        }
    }

    /// Wrap an error as the cause of an aborted merge.
    ///
    /// An error that already is a `MergeFailed` is returned unchanged.
    pub fn merge_failed(cause: PageCatError) -> Self {
        match cause {
            already @ Self::MergeFailed { .. } => already,
            cause => Self::MergeFailed {
                source: Box::new(cause),
            },
        }
    }

    /// Create an InvalidSelection error.
    pub fn invalid_selection(spec: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSelection {
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidCommand error.
    pub fn invalid_command(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoValidPdfFiles { .. }
            | Self::NothingSelected
            | Self::InvalidSelection { .. }
            | Self::InvalidCommand { .. }
            | Self::Cancelled => ErrorKind::User,
            Self::FailedToDecode { .. } | Self::EncryptedPdf { .. } => ErrorKind::Decode,
            Self::FailedToRender { .. } => ErrorKind::Render,
            Self::BuildFailed { .. } => ErrorKind::Build,
            Self::MergeFailed { .. } => ErrorKind::Merge,
            Self::OutputExists { .. }
            | Self::FailedToCreateOutput { .. }
            | Self::FailedToWrite { .. } => ErrorKind::Download,
            Self::InvalidConfig { .. } => ErrorKind::Config,
            Self::FileNotFound { .. }
            | Self::NotAFile { .. }
            | Self::FileNotAccessible { .. }
            | Self::Io { .. }
            | Self::Other { .. } => ErrorKind::Io,
        }
    }

    /// Check if this error is a plain user mistake.
    ///
    /// User errors never change session state and are shown as a dismissible
    /// message rather than a failure report.
    pub fn is_user_error(&self) -> bool {
        self.kind() == ErrorKind::User
    }

    /// The innermost cause of a `MergeFailed` error, or `self` otherwise.
    pub fn root_cause(&self) -> &PageCatError {
        match self {
            Self::MergeFailed { source } => source.root_cause(),
            other => other,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoValidPdfFiles { .. } => 1,
            Self::NothingSelected => 1,
            Self::InvalidSelection { .. } => 1,
            Self::InvalidCommand { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::FailedToDecode { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::FailedToRender { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::BuildFailed { .. } => 6,
            Self::MergeFailed { source } => source.exit_code().max(6),
            Self::InvalidConfig { .. } => 1,
            Self::Other { .. } => 1,
        }
    }
}
