//! The merge loop.
//!
//! [`Merger`] walks the session's selection in order, copies each selected
//! page into a new document through a [`DocumentBuilder`], and returns the
//! serialized bytes. It only reads the session; a failed merge leaves it
//! exactly as it was.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::config::{Config, SourceReuse};
use crate::error::{PageCatError, Result};
use crate::merge::builder::{DocumentBuilder, LopdfBuilder};
use crate::session::{DocumentId, Session};
use crate::utils::format_file_size;

/// Progress of a running merge, reported after each appended page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeProgress {
    /// Pages appended so far.
    pub processed: usize,
    /// Pages in the selection.
    pub total: usize,
}

impl MergeProgress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }

    /// Check if every page has been appended.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Pages in the output document.
    pub pages_merged: usize,

    /// Selection entries whose document was no longer loaded.
    pub pages_skipped: usize,

    /// Distinct documents the pages came from.
    pub source_documents: usize,

    /// Times a source document was decoded by the builder.
    pub source_loads: usize,

    /// Size of the serialized output.
    pub output_size: u64,

    /// Total time taken for the merge.
    pub merge_time: Duration,
}

impl MergeStatistics {
    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// The serialized PDF.
    pub bytes: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,
}

/// Merges the selected pages of a session into one document.
#[derive(Debug, Clone, Default)]
pub struct Merger<B = LopdfBuilder> {
    builder: B,
    source_reuse: SourceReuse,
}

impl Merger<LopdfBuilder> {
    /// Create a merger backed by lopdf with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a merger with the compression, metadata and source reuse from
    /// `config`.
    pub fn from_config(config: &Config) -> Self {
        let builder = LopdfBuilder::new()
            .with_compression(config.compression)
            .with_metadata(config.metadata.clone());
        Self::with_builder(builder).with_source_reuse(config.source_reuse)
    }
}

impl<B: DocumentBuilder> Merger<B> {
    /// Create a merger around a custom builder.
    pub fn with_builder(builder: B) -> Self {
        Self {
            builder,
            source_reuse: SourceReuse::default(),
        }
    }

    /// Set how source documents are re-read.
    pub fn with_source_reuse(mut self, source_reuse: SourceReuse) -> Self {
        self.source_reuse = source_reuse;
        self
    }

    /// The builder used for merging.
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Merge the selected pages of `session`, in selection order.
    ///
    /// `on_progress` is called after each page is appended.
    ///
    /// # Errors
    ///
    /// Returns `NothingSelected` without touching the builder when the
    /// selection is empty. Any builder failure aborts the merge and is
    /// returned wrapped in `MergeFailed`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use pagecat::merge::Merger;
    /// # use pagecat::session::Session;
    /// # async fn example(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    /// let mut merger = Merger::new();
    /// let output = merger
    ///     .merge(session, |p| println!("{:.0}%", p.fraction() * 100.0))
    ///     .await?;
    /// println!("{} pages", output.statistics.pages_merged);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all, fields(selected = session.selection().len()))]
    pub async fn merge<F>(&mut self, session: &Session, mut on_progress: F) -> Result<MergeOutput>
    where
        F: FnMut(MergeProgress),
    {
        if session.selection().is_empty() {
            return Err(PageCatError::NothingSelected);
        }

        let output = self
            .run(session, &mut on_progress)
            .await
            .map_err(PageCatError::merge_failed)?;

        info!(
            pages = output.statistics.pages_merged,
            sources = output.statistics.source_documents,
            size = %output.statistics.format_output_size(),
            elapsed_ms = output.statistics.merge_time.as_millis() as u64,
            "merge complete"
        );
        Ok(output)
    }

    async fn run<F>(&mut self, session: &Session, on_progress: &mut F) -> Result<MergeOutput>
    where
        F: FnMut(MergeProgress),
    {
        let start = Instant::now();
        let total = session.selection().len();
        let mut target = self.builder.create_empty()?;

        let mut sources: HashMap<DocumentId, B::Source> = HashMap::new();
        let mut seen = Vec::new();
        let mut processed = 0;
        let mut skipped = 0;
        let mut source_loads = 0;

        for entry in session.selection() {
            let Some(document) = session.document(entry.document_id) else {
                warn!(%entry, "selected document is no longer loaded, skipping");
                skipped += 1;
                continue;
            };
            let index = entry.page_number.checked_sub(1).ok_or_else(|| {
                PageCatError::build_failed(format!("invalid page number in {entry}"))
            })? as usize;

            if !seen.contains(&entry.document_id) {
                seen.push(entry.document_id);
            }

            let page = match self.source_reuse {
                SourceReuse::PerPage => {
                    let source = self.builder.load(&mut target, document.source_bytes())?;
                    source_loads += 1;
                    tokio::task::yield_now().await;
                    self.builder.copy_page(&mut target, &source, index)?
                }
                SourceReuse::PerMerge => {
                    let source = match sources.entry(entry.document_id) {
                        Entry::Occupied(slot) => slot.into_mut(),
                        Entry::Vacant(slot) => {
                            let source =
                                self.builder.load(&mut target, document.source_bytes())?;
                            source_loads += 1;
                            slot.insert(source)
                        }
                    };
                    self.builder.copy_page(&mut target, source, index)?
                }
            };
            self.builder.append(&mut target, page)?;

            processed += 1;
            on_progress(MergeProgress { processed, total });
            tokio::task::yield_now().await;
        }

        if processed == 0 {
            return Err(PageCatError::NothingSelected);
        }

        let bytes = self.builder.serialize(target)?;

        Ok(MergeOutput {
            statistics: MergeStatistics {
                pages_merged: processed,
                pages_skipped: skipped,
                source_documents: seen.len(),
                source_loads,
                output_size: bytes.len() as u64,
                merge_time: start.elapsed(),
            },
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::SelectionController;
    use crate::io::InputFile;
    use crate::test_support::{labeled_pdf, page_labels};

    /// Builder that records calls instead of building anything.
    #[derive(Default)]
    struct RecordingBuilder {
        calls: Vec<String>,
        fail_on_copy: Option<usize>,
    }

    impl DocumentBuilder for RecordingBuilder {
        type Document = Vec<(usize, usize)>;
        type Source = usize;
        type Page = (usize, usize);

        fn create_empty(&mut self) -> Result<Self::Document> {
            self.calls.push("create".to_string());
            Ok(Vec::new())
        }

        fn load(&mut self, _target: &mut Self::Document, bytes: &[u8]) -> Result<usize> {
            self.calls.push(format!("load {}", bytes.len()));
            Ok(bytes.len())
        }

        fn copy_page(
            &mut self,
            _target: &mut Self::Document,
            source: &usize,
            index: usize,
        ) -> Result<(usize, usize)> {
            self.calls.push(format!("copy {index}"));
            if self.fail_on_copy == Some(index) {
                return Err(PageCatError::build_failed("boom"));
            }
            Ok((*source, index))
        }

        fn append(&mut self, target: &mut Self::Document, page: (usize, usize)) -> Result<()> {
            self.calls.push("append".to_string());
            target.push(page);
            Ok(())
        }

        fn serialize(&mut self, target: Self::Document) -> Result<Vec<u8>> {
            self.calls.push("serialize".to_string());
            Ok(target.iter().map(|(_, index)| *index as u8).collect())
        }
    }

    async fn controller_with(docs: &[(&str, u32)]) -> SelectionController {
        let mut controller = SelectionController::new();
        let files = docs
            .iter()
            .map(|(label, pages)| InputFile::pdf(format!("{label}.pdf"), labeled_pdf(label, *pages)))
            .collect();
        controller.load_files(files).await.unwrap();
        controller
    }

    #[tokio::test]
    async fn test_empty_selection_makes_no_builder_calls() {
        let controller = controller_with(&[("A", 2)]).await;
        let mut merger = Merger::with_builder(RecordingBuilder::default());

        let err = merger.merge(controller.session(), |_| {}).await.unwrap_err();
        assert!(matches!(err, PageCatError::NothingSelected));
        assert!(merger.builder().calls.is_empty());
    }

    #[tokio::test]
    async fn test_output_follows_selection_order() {
        let mut controller = controller_with(&[("A", 3), ("B", 2)]).await;
        let ids = controller.session().documents().iter().map(|d| d.id()).collect::<Vec<_>>();
        controller.toggle_page(ids[0], 2);
        controller.toggle_page(ids[1], 1);
        controller.toggle_page(ids[0], 1);

        let mut merger = Merger::new();
        let output = merger.merge(controller.session(), |_| {}).await.unwrap();

        assert_eq!(page_labels(&output.bytes), vec!["A-2", "B-1", "A-1"]);
        assert_eq!(output.statistics.pages_merged, 3);
        assert_eq!(output.statistics.source_documents, 2);
        assert_eq!(output.statistics.source_loads, 2);
    }

    #[tokio::test]
    async fn test_per_page_reuse_reloads_every_page() {
        let mut controller = controller_with(&[("A", 3)]).await;
        let id = controller.session().documents()[0].id();
        controller.select_all_pages(id);

        let mut merger = Merger::new().with_source_reuse(SourceReuse::PerPage);
        let output = merger.merge(controller.session(), |_| {}).await.unwrap();

        assert_eq!(output.statistics.source_loads, 3);
        assert_eq!(page_labels(&output.bytes), vec!["A-1", "A-2", "A-3"]);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_one() {
        let mut controller = controller_with(&[("A", 4)]).await;
        let id = controller.session().documents()[0].id();
        controller.select_all_pages(id);

        let mut seen = Vec::new();
        let mut merger = Merger::with_builder(RecordingBuilder::default());
        merger
            .merge(controller.session(), |p| seen.push(p))
            .await
            .unwrap();

        let fractions: Vec<f64> = seen.iter().map(MergeProgress::fraction).collect();
        assert_eq!(fractions, vec![0.25, 0.5, 0.75, 1.0]);
        assert!(seen.last().unwrap().is_complete());
        assert!(seen[..3].iter().all(|p| !p.is_complete()));
    }

    #[tokio::test]
    async fn test_call_sequence() {
        let mut controller = controller_with(&[("A", 2)]).await;
        let id = controller.session().documents()[0].id();
        controller.toggle_page(id, 2);
        controller.toggle_page(id, 1);

        let mut merger = Merger::with_builder(RecordingBuilder::default());
        let output = merger.merge(controller.session(), |_| {}).await.unwrap();

        let size = controller.session().documents()[0].source_bytes().len();
        assert_eq!(
            merger.builder().calls,
            vec![
                "create".to_string(),
                format!("load {size}"),
                "copy 1".to_string(),
                "append".to_string(),
                "copy 0".to_string(),
                "append".to_string(),
                "serialize".to_string(),
            ]
        );
        assert_eq!(output.bytes, vec![1, 0]);
    }

    #[tokio::test]
    async fn test_failure_is_wrapped_and_session_untouched() {
        let mut controller = controller_with(&[("A", 3)]).await;
        let id = controller.session().documents()[0].id();
        controller.select_all_pages(id);
        let before = controller.view();

        let builder = RecordingBuilder {
            fail_on_copy: Some(1),
            ..Default::default()
        };
        let mut merger = Merger::with_builder(builder);
        let mut progress = Vec::new();
        let err = merger
            .merge(controller.session(), |p| progress.push(p))
            .await
            .unwrap_err();

        assert!(matches!(err, PageCatError::MergeFailed { .. }));
        assert!(matches!(err.root_cause(), PageCatError::BuildFailed { .. }));
        assert_eq!(progress.len(), 1);
        assert!(!merger.builder().calls.contains(&"serialize".to_string()));
        assert_eq!(controller.view(), before);
    }

    #[test]
    fn test_progress_fraction_edge() {
        let empty = MergeProgress {
            processed: 0,
            total: 0,
        };
        assert_eq!(empty.fraction(), 1.0);
    }
}
