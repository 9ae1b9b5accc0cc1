//! Input and output for pagecat.
//!
//! - [`source`]: files offered for loading, with their declared MIME type
//! - [`decoder`]: turning PDF bytes into page handles
//! - [`writer`]: handing the merged bytes to the user as a file

pub mod decoder;
pub mod source;
pub mod writer;

pub use decoder::{DecodedPdf, PageHandle, PdfDecoder};
pub use source::{InputFile, PDF_MIME};
pub use writer::{PdfWriter, WriteStatistics};
