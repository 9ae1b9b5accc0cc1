//! The selection controller.
//!
//! [`SelectionController`] owns the [`Session`] and is the only thing that
//! mutates it. Each user action maps to one method here. Mutating methods
//! take `&mut self`, so an action cannot interleave with an in-flight load.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::config::{Config, DEFAULT_PREVIEW_SCALE, PageSelection, SelectionSpec};
use crate::error::{PageCatError, Result};
use crate::io::{InputFile, PdfDecoder};
use crate::render::{MediaBoxRenderer, PageRenderer, Thumbnail};
use crate::session::{DocumentId, LoadedDocument, Session, SessionView};

/// Applies user actions to a [`Session`].
#[derive(Debug)]
pub struct SelectionController<R = MediaBoxRenderer> {
    session: Session,
    decoder: PdfDecoder,
    renderer: R,
    preview_scale: f32,
}

impl SelectionController<MediaBoxRenderer> {
    /// Create a controller with an empty session and the default renderer.
    pub fn new() -> Self {
        Self::with_renderer(MediaBoxRenderer::new())
    }

    /// Create a controller using the preview scale from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new().with_preview_scale(config.preview_scale)
    }
}

impl Default for SelectionController<MediaBoxRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: PageRenderer> SelectionController<R> {
    /// Create a controller with an empty session and a custom renderer.
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            session: Session::new(),
            decoder: PdfDecoder::new(),
            renderer,
            preview_scale: DEFAULT_PREVIEW_SCALE,
        }
    }

    /// Set the scale previews are rendered at.
    pub fn with_preview_scale(mut self, scale: f32) -> Self {
        self.preview_scale = scale;
        self
    }

    /// The current session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Give up the controller and keep the session.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// A serialisable snapshot of the current session.
    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    /// Check if a page is currently selected.
    pub fn is_selected(&self, id: DocumentId, page_number: u32) -> bool {
        self.session.is_selected(id, page_number)
    }

    /// Load files into the session.
    ///
    /// Files not declared as `application/pdf` are skipped. The rest are
    /// processed one at a time: each is decoded and every page rendered
    /// before the document is added, so a document is either fully present
    /// or absent.
    ///
    /// # Errors
    ///
    /// Returns `NoValidPdfFiles` if no file is declared as a PDF. The first
    /// decode or render failure stops the batch; documents added before it
    /// stay loaded.
    #[instrument(skip_all, fields(files = files.len()))]
    pub async fn load_files(&mut self, files: Vec<InputFile>) -> Result<Vec<DocumentId>> {
        let offered = files.len();
        let accepted: Vec<InputFile> = files.into_iter().filter(InputFile::is_pdf).collect();
        let skipped = offered - accepted.len();

        if accepted.is_empty() {
            return Err(PageCatError::NoValidPdfFiles { skipped });
        }
        if skipped > 0 {
            debug!(skipped, "ignoring files not declared as PDF");
        }

        let mut loaded = Vec::with_capacity(accepted.len());
        for file in accepted {
            let thumbnails = self.render_previews(&file).await?;

            let id = self.session.next_id();
            info!(document = %id, file = %file.name, pages = thumbnails.len(), "loaded document");
            self.session.insert_document(LoadedDocument::new(
                id,
                file.name,
                file.bytes,
                thumbnails,
            ));
            loaded.push(id);
        }

        Ok(loaded)
    }

    async fn render_previews(&self, file: &InputFile) -> Result<Vec<Thumbnail>> {
        let decoded = self.decoder.decode(&file.name, &file.bytes)?;
        tokio::task::yield_now().await;

        let mut thumbnails = Vec::with_capacity(decoded.page_count() as usize);
        for page in decoded.pages() {
            thumbnails.push(self.renderer.render(&page, self.preview_scale)?);
            tokio::task::yield_now().await;
        }
        Ok(thumbnails)
    }

    /// Flip the selection state of one page.
    ///
    /// A newly selected page goes to the end of the merge order. Returns the
    /// new state, or `None` if the document or page does not exist.
    pub fn toggle_page(&mut self, id: DocumentId, page_number: u32) -> Option<bool> {
        let selected = self.session.toggle(id, page_number);
        if let Some(selected) = selected {
            debug!(document = %id, page = page_number, selected, "toggled page");
        }
        debug_assert!(self.session.is_consistent());
        selected
    }

    /// Select every page of a document that is not selected yet, in
    /// ascending order. Returns the number of pages added.
    pub fn select_all_pages(&mut self, id: DocumentId) -> usize {
        let Some(count) = self.session.document(id).map(LoadedDocument::page_count) else {
            return 0;
        };
        let pages: Vec<u32> = (1..=count).collect();
        self.select_pages(id, &pages)
    }

    /// Select the given pages of a document in the given order.
    ///
    /// Pages already selected keep their place; unknown pages are ignored.
    /// Returns the number of pages added.
    pub fn select_pages(&mut self, id: DocumentId, page_numbers: &[u32]) -> usize {
        let added = self.session.select_pages(id, page_numbers);
        debug!(document = %id, added, "selected pages");
        debug_assert!(self.session.is_consistent());
        added
    }

    /// Apply a `DOC:PAGES` selection, where `DOC` is a 1-based position in
    /// load order.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSelection` if the document or a page does not exist.
    pub fn apply_selection(&mut self, spec: &SelectionSpec) -> Result<usize> {
        let document = self.session.document_at(spec.document).ok_or_else(|| {
            PageCatError::invalid_selection(
                spec.as_str(),
                format!(
                    "document {} is not loaded ({} loaded)",
                    spec.document,
                    self.session.documents().len()
                ),
            )
        })?;
        let (id, page_count) = (document.id(), document.page_count());

        match &spec.pages {
            PageSelection::All => Ok(self.select_all_pages(id)),
            PageSelection::Pages(range) => {
                if range.max_page() > page_count {
                    return Err(PageCatError::invalid_selection(
                        spec.as_str(),
                        format!(
                            "page {} does not exist ({} has {page_count} pages)",
                            range.max_page(),
                            document.name()
                        ),
                    ));
                }
                let pages = range.pages_in_order(page_count);
                Ok(self.select_pages(id, &pages))
            }
        }
    }

    /// Unselect every page of a document. Returns the number of pages removed
    /// from the selection; the order of the rest is unchanged.
    pub fn deselect_all_pages(&mut self, id: DocumentId) -> usize {
        let removed = self.session.deselect_document(id);
        debug!(document = %id, removed, "deselected pages");
        debug_assert!(self.session.is_consistent());
        removed
    }

    /// Remove a document and its selected pages.
    pub fn remove_document(&mut self, id: DocumentId) -> Option<LoadedDocument> {
        let removed = self.session.remove_document(id);
        if let Some(document) = &removed {
            info!(document = %id, file = %document.name(), "removed document");
        }
        debug_assert!(self.session.is_consistent());
        removed
    }

    /// Remove every document and clear the selection.
    ///
    /// `confirm` is asked first and sees the session as it is. Clearing an
    /// empty session does nothing and does not ask.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled`, with the session untouched, if `confirm` returns
    /// false.
    pub fn clear_all<F>(&mut self, confirm: F) -> Result<()>
    where
        F: FnOnce(&Session) -> bool,
    {
        if !self.session.clear_enabled() {
            return Ok(());
        }
        if !confirm(&self.session) {
            return Err(PageCatError::Cancelled);
        }

        let documents = self.session.documents().len();
        self.session.clear();
        info!(documents, "cleared session");
        Ok(())
    }

    /// Write the previews of a document as `<dir>/<id>-p<page>.png`.
    ///
    /// The directory is created if needed.
    pub async fn export_thumbnails(&self, id: DocumentId, dir: &Path) -> Result<Vec<PathBuf>> {
        let document = self.session.document(id).ok_or_else(|| {
            PageCatError::invalid_selection(id.to_string(), "document is not loaded")
        })?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PageCatError::FailedToCreateOutput {
                path: dir.to_path_buf(),
                source: e,
            })?;

        let mut written = Vec::with_capacity(document.pages().len());
        for page in document.pages() {
            let path = dir.join(format!("{}-p{}.png", id.get(), page.page_number()));
            page.thumbnail().save_png(&path)?;
            written.push(path);
            tokio::task::yield_now().await;
        }
        Ok(written)
    }
}
