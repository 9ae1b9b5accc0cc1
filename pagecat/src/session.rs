//! Session state: loaded documents and the ordered page selection.
//!
//! A [`Session`] is an owned value. Only the
//! [`SelectionController`](crate::controller::SelectionController) mutates it;
//! the merger reads it through `&Session`. Two facts hold after every
//! operation:
//!
//! - a page is marked `selected` exactly when a [`SelectionEntry`] for it is
//!   in the selection, and no entry appears twice
//! - every entry refers to a document that is still loaded
//!
//! The selection order is the output order of a merge.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PageCatError;
use crate::render::Thumbnail;

/// Identifier of a loaded document, unique within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Wrap a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = PageCatError;

    /// Parse `3` or `#3`.
    fn from_str(s: &str) -> crate::Result<Self> {
        let digits = s.trim().trim_start_matches('#');
        digits
            .parse()
            .map(Self)
            .map_err(|_| PageCatError::invalid_selection(s, "expected a document id like #3"))
    }
}

/// One page of a loaded document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageEntry {
    page_number: u32,
    selected: bool,
    thumbnail: Thumbnail,
}

impl PageEntry {
    /// 1-based page number within the owning document.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Whether the page is part of the selection.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// The preview rendered when the document was loaded.
    pub fn thumbnail(&self) -> &Thumbnail {
        &self.thumbnail
    }
}

/// A document that finished decoding and rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    id: DocumentId,
    name: String,
    source_bytes: Vec<u8>,
    pages: Vec<PageEntry>,
}

impl LoadedDocument {
    /// Build a document from its rendered previews.
    ///
    /// Thumbnails must be in page order; page numbers are assigned from
    /// their position.
    pub(crate) fn new(
        id: DocumentId,
        name: String,
        source_bytes: Vec<u8>,
        thumbnails: Vec<Thumbnail>,
    ) -> Self {
        let pages = thumbnails
            .into_iter()
            .enumerate()
            .map(|(index, thumbnail)| PageEntry {
                page_number: index as u32 + 1,
                selected: false,
                thumbnail,
            })
            .collect();

        Self {
            id,
            name,
            source_bytes,
            pages,
        }
    }

    /// Session-unique id.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The original file content.
    pub fn source_bytes(&self) -> &[u8] {
        &self.source_bytes
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// All pages in order.
    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    /// Look up a page by its 1-based number.
    pub fn page(&self, page_number: u32) -> Option<&PageEntry> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
    }

    fn page_mut(&mut self, page_number: u32) -> Option<&mut PageEntry> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get_mut(index as usize))
    }

    /// Number of selected pages.
    pub fn selected_count(&self) -> usize {
        self.pages.iter().filter(|p| p.selected).count()
    }
}

/// One page in the merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SelectionEntry {
    /// Owning document.
    pub document_id: DocumentId,
    /// 1-based page number within that document.
    pub page_number: u32,
}

impl SelectionEntry {
    /// Create an entry.
    pub fn new(document_id: DocumentId, page_number: u32) -> Self {
        Self {
            document_id,
            page_number,
        }
    }
}

impl fmt::Display for SelectionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:p{}", self.document_id, self.page_number)
    }
}

/// Loaded documents plus the ordered selection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    documents: Vec<LoadedDocument>,
    selection: Vec<SelectionEntry>,
    last_id: u64,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loaded documents in load order.
    pub fn documents(&self) -> &[LoadedDocument] {
        &self.documents
    }

    /// The selection in merge order.
    pub fn selection(&self) -> &[SelectionEntry] {
        &self.selection
    }

    /// Look up a document by id.
    pub fn document(&self, id: DocumentId) -> Option<&LoadedDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Look up a document by its 1-based position in load order.
    pub fn document_at(&self, position: usize) -> Option<&LoadedDocument> {
        position
            .checked_sub(1)
            .and_then(|index| self.documents.get(index))
    }

    /// Check if a page is currently selected.
    pub fn is_selected(&self, id: DocumentId, page_number: u32) -> bool {
        self.document(id)
            .and_then(|d| d.page(page_number))
            .is_some_and(|p| p.selected)
    }

    /// True when there is anything to merge.
    pub fn merge_enabled(&self) -> bool {
        !self.selection.is_empty()
    }

    /// True when there is anything to clear.
    pub fn clear_enabled(&self) -> bool {
        !self.documents.is_empty()
    }

    /// Check that page flags and selection entries agree.
    ///
    /// Holds after every controller operation.
    pub fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.selection {
            if !seen.insert(*entry) || !self.is_selected(entry.document_id, entry.page_number) {
                return false;
            }
        }
        let flagged: usize = self.documents.iter().map(|d| d.selected_count()).sum();
        flagged == self.selection.len()
    }

    /// A serialisable snapshot of the session.
    pub fn view(&self) -> SessionView {
        SessionView::from(self)
    }

    pub(crate) fn next_id(&mut self) -> DocumentId {
        self.last_id += 1;
        DocumentId(self.last_id)
    }

    pub(crate) fn insert_document(&mut self, document: LoadedDocument) {
        self.documents.push(document);
    }

    /// Flip the selection state of a page; returns the new state.
    pub(crate) fn toggle(&mut self, id: DocumentId, page_number: u32) -> Option<bool> {
        let page = self
            .documents
            .iter_mut()
            .find(|d| d.id == id)?
            .page_mut(page_number)?;
        page.selected = !page.selected;

        let entry = SelectionEntry::new(id, page_number);
        if page.selected {
            self.selection.push(entry);
        } else {
            self.selection.retain(|e| *e != entry);
        }
        Some(page.selected)
    }

    /// Select the given pages of a document in order, skipping pages that are
    /// already selected or do not exist. Returns how many were added.
    pub(crate) fn select_pages(&mut self, id: DocumentId, page_numbers: &[u32]) -> usize {
        let Some(document) = self.documents.iter_mut().find(|d| d.id == id) else {
            return 0;
        };

        let mut added = 0;
        for &number in page_numbers {
            if let Some(page) = document.page_mut(number)
                && !page.selected
            {
                page.selected = true;
                self.selection.push(SelectionEntry::new(id, number));
                added += 1;
            }
        }
        added
    }

    /// Unselect every page of a document. Returns how many were removed.
    pub(crate) fn deselect_document(&mut self, id: DocumentId) -> usize {
        let Some(document) = self.documents.iter_mut().find(|d| d.id == id) else {
            return 0;
        };
        for page in &mut document.pages {
            page.selected = false;
        }

        let before = self.selection.len();
        self.selection.retain(|e| e.document_id != id);
        before - self.selection.len()
    }

    pub(crate) fn remove_document(&mut self, id: DocumentId) -> Option<LoadedDocument> {
        let index = self.documents.iter().position(|d| d.id == id)?;
        self.selection.retain(|e| e.document_id != id);
        Some(self.documents.remove(index))
    }

    /// Drop all documents and the selection. Ids keep increasing.
    pub(crate) fn clear(&mut self) {
        self.documents.clear();
        self.selection.clear();
    }
}

/// Serialisable projection of a [`Session`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Loaded documents in load order.
    pub documents: Vec<DocumentView>,
    /// The selection in merge order.
    pub selection: Vec<SelectionEntry>,
    /// Whether a merge can be started.
    pub merge_enabled: bool,
    /// Whether there is anything to clear.
    pub clear_enabled: bool,
}

/// One document in a [`SessionView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    /// Session-unique id.
    pub id: DocumentId,
    /// 1-based position in load order.
    pub position: usize,
    /// Original file name.
    pub name: String,
    /// Size of the source file in bytes.
    pub size: u64,
    /// Number of pages.
    pub page_count: u32,
    /// Per-page state.
    pub pages: Vec<PageView>,
}

/// One page in a [`DocumentView`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView {
    /// 1-based page number.
    pub page_number: u32,
    /// Whether the page is selected.
    pub selected: bool,
    /// 1-based position in the merge order, if selected.
    pub order: Option<usize>,
    /// Preview width in pixels.
    pub thumbnail_width: u32,
    /// Preview height in pixels.
    pub thumbnail_height: u32,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        let order_of = |id: DocumentId, page_number: u32| {
            session
                .selection
                .iter()
                .position(|e| e.document_id == id && e.page_number == page_number)
                .map(|index| index + 1)
        };

        let documents = session
            .documents
            .iter()
            .enumerate()
            .map(|(index, doc)| DocumentView {
                id: doc.id,
                position: index + 1,
                name: doc.name.clone(),
                size: doc.source_bytes.len() as u64,
                page_count: doc.page_count(),
                pages: doc
                    .pages
                    .iter()
                    .map(|page| PageView {
                        page_number: page.page_number,
                        selected: page.selected,
                        order: order_of(doc.id, page.page_number),
                        thumbnail_width: page.thumbnail.width(),
                        thumbnail_height: page.thumbnail.height(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            documents,
            selection: session.selection.clone(),
            merge_enabled: session.merge_enabled(),
            clear_enabled: session.clear_enabled(),
        }
    }
}
