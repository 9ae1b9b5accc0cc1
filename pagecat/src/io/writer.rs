//! Writing the merged document to disk.
//!
//! [`PdfWriter`] is the download step: it takes the serialized output of a
//! merge and makes it available as a file. Writes are atomic (write to a
//! temporary file next to the target, then rename), so a failed
//! write never leaves a truncated `merged.pdf` behind.
//!
//! # Examples
//!
//! ```no_run
//! use pagecat::io::writer::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&bytes, Path::new("merged.pdf")).await?;
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, instrument};

use crate::error::{PageCatError, Result};
use crate::utils::format_file_size;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writer for merged output.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns `FailedToCreateOutput` if the file cannot be created and
    /// `FailedToWrite` if writing or the final rename fails.
    pub async fn save(&self, bytes: &[u8], path: &Path) -> Result<()> {
        let _stats = self.save_with_stats(bytes, path).await?;
        Ok(())
    }

    /// Write `bytes` to `path` and return statistics about the operation.
    #[instrument(skip(self, bytes), fields(path = %path.display(), size = bytes.len()))]
    pub async fn save_with_stats(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let bytes = bytes.to_vec();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = temp_path_for(&path_buf);

            let file = std::fs::File::create(&write_path).map_err(|e| {
                PageCatError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::new(file);

            let written = writer
                .write_all(&bytes)
                .and_then(|()| writer.flush())
                .map_err(|e| PageCatError::FailedToWrite {
                    path: write_path.clone(),
                    source: e,
                });
            drop(writer);

            if let Err(err) = written {
                let _ = std::fs::remove_file(&write_path);
                return Err(err);
            }

            if let Err(e) = std::fs::rename(&write_path, &path_buf) {
                let _ = std::fs::remove_file(&write_path);
                return Err(PageCatError::FailedToWrite {
                    path: path_buf.clone(),
                    source: e,
                });
            }

            let write_time = start.elapsed();
            let file_size = std::fs::metadata(&path_buf)
                .map(|m| m.len())
                .unwrap_or(bytes.len() as u64);

            Ok::<_, PageCatError>(WriteStatistics {
                write_time,
                file_size,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PageCatError::other(format!("Write task failed: {e}")))??;

        debug!(
            bytes = stats.file_size,
            elapsed_ms = stats.write_time.as_millis() as u64,
            "wrote output"
        );

        Ok(stats)
    }

    /// Check if a file can be written to the given path.
    ///
    /// Performs pre-flight checks without actually writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory doesn't exist or is read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PageCatError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                ))
            } else {
                PageCatError::FileNotAccessible {
                    path: parent.to_path_buf(),
                    source: e,
                }
            }
        })?;

        if !metadata.is_dir() {
            return Err(PageCatError::invalid_config(format!(
                "Output directory is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(PageCatError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

/// Temporary sibling used for atomic writes: `merged.pdf` -> `.merged.pdf.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}
