//! Steps shared by batch mode and the shell.

use std::path::Path;

use pagecat::config::{Config, OverwriteMode};
use pagecat::controller::SelectionController;
use pagecat::error::{PageCatError, Result};
use pagecat::io::{InputFile, PdfWriter, WriteStatistics};
use pagecat::merge::Merger;
use pagecat::output::{OutputFormatter, ProgressBar, display_merge_statistics};
use pagecat::session::{DocumentId, Session};
use tokio::io::AsyncBufRead;
use tracing::debug;

use crate::prompt::Prompter;

/// Read the files matching `patterns`, load them, and export previews when
/// a thumbnails directory is configured.
pub async fn load_inputs<S: AsRef<str>>(
    controller: &mut SelectionController,
    patterns: &[S],
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<Vec<DocumentId>> {
    let files = InputFile::from_patterns(patterns).await?;
    let skipped = files.iter().filter(|file| !file.is_pdf()).count();
    if skipped > 0 {
        formatter.warning(&format!("Skipping {skipped} file(s) that are not PDFs"));
    }

    let ids = controller.load_files(files).await?;
    for id in &ids {
        if let Some(document) = controller.session().document(*id) {
            formatter.success(&format!(
                "Loaded {} as {id} ({} page(s))",
                document.name(),
                document.page_count()
            ));
        }
    }

    if let Some(dir) = &config.thumbnails_dir {
        let mut written = 0;
        for id in &ids {
            written += controller.export_thumbnails(*id, dir).await?.len();
        }
        formatter.info(&format!(
            "Wrote {written} preview(s) to {}",
            dir.display()
        ));
    }

    Ok(ids)
}

/// Make sure `path` may be written, asking the user when it already exists
/// and the overwrite mode says so.
pub async fn ensure_writable<R: AsyncBufRead + Unpin>(
    path: &Path,
    config: &Config,
    formatter: &OutputFormatter,
    prompter: &mut Prompter<R>,
) -> Result<()> {
    let writer = PdfWriter::new();
    writer.can_write(path).await?;
    if !writer.exists(path).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PageCatError::output_exists(path.to_path_buf())),
        OverwriteMode::Prompt => {
            // Nobody is there to answer in quiet mode.
            if formatter.is_quiet() {
                return Err(PageCatError::output_exists(path.to_path_buf()));
            }
            formatter.warning(&format!("Output file already exists: {}", path.display()));
            if prompter.confirm("Overwrite?").await? {
                Ok(())
            } else {
                Err(PageCatError::Cancelled)
            }
        }
    }
}

/// Merge the selection of `session` and write it to `path`.
///
/// Nothing is written and nobody is asked when the selection is empty.
pub async fn merge_to_file<R: AsyncBufRead + Unpin>(
    session: &Session,
    path: &Path,
    config: &Config,
    formatter: &OutputFormatter,
    prompter: &mut Prompter<R>,
) -> Result<WriteStatistics> {
    if !session.merge_enabled() {
        return Err(PageCatError::NothingSelected);
    }
    ensure_writable(path, config, formatter, prompter).await?;

    let total = session.selection().len();
    let mut progress = if formatter.should_print() {
        ProgressBar::auto(total)
    } else {
        ProgressBar::disabled()
    };
    progress.set_message("Merging");

    let result = Merger::from_config(config)
        .merge(session, |step| progress.observe(step))
        .await;
    let output = match result {
        Ok(output) => {
            progress.finish();
            output
        }
        Err(err) => {
            progress.clear();
            return Err(err);
        }
    };

    debug!(path = %path.display(), bytes = output.bytes.len(), "writing merged document");
    let write_stats = PdfWriter::new()
        .save_with_stats(&output.bytes, path)
        .await?;
    display_merge_statistics(formatter, &output.statistics, &write_stats);
    Ok(write_stats)
}
