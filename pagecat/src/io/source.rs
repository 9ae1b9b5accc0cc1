//! Files offered to the session for loading.
//!
//! An [`InputFile`] is a named blob with a declared MIME type, the same thing
//! a file picker hands over. Only files declared as [`PDF_MIME`] are loaded;
//! the type is taken at face value and the bytes are not sniffed.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{PageCatError, Result};
use crate::utils;

/// MIME type accepted for loading.
pub const PDF_MIME: &str = "application/pdf";

/// MIME type declared for anything that is not recognised as a PDF.
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// A file offered for loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Original file name, for display only.
    pub name: String,
    /// Declared MIME type.
    pub mime: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl InputFile {
    /// Create an input file from its parts.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Create an input file declared as a PDF.
    pub fn pdf(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, PDF_MIME, bytes)
    }

    /// Read a file from disk.
    ///
    /// The MIME type is derived from the extension: `.pdf` (any case) is
    /// declared as `application/pdf`, everything else as
    /// `application/octet-stream`.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not exist, is not a regular file, or
    /// cannot be read.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PageCatError::file_not_found(path.to_path_buf())
            } else {
                PageCatError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_file() {
            return Err(PageCatError::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PageCatError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        debug!(path = %path.display(), size = bytes.len(), "read input file");

        Ok(Self::new(name, mime_for_path(path), bytes))
    }

    /// Read every path matched by the given patterns, in order.
    ///
    /// Patterns without glob metacharacters are read as plain paths, so a
    /// missing file is reported as such instead of silently matching nothing.
    pub async fn from_patterns<T>(patterns: T) -> Result<Vec<Self>>
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        let paths: Vec<PathBuf> = utils::collect_paths_for_patterns(patterns)?;
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(Self::from_path(&path).await?);
        }
        Ok(files)
    }

    /// Check if this file is declared as a PDF.
    pub fn is_pdf(&self) -> bool {
        self.mime.eq_ignore_ascii_case(PDF_MIME)
    }

    /// Size of the content in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// MIME type declared for a path, based on its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MIME,
        _ => OCTET_STREAM_MIME,
    }
}
