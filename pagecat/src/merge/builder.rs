//! Construction of the output document.
//!
//! [`DocumentBuilder`] is the seam between the merge loop and the PDF
//! library: create an empty document, load a source, copy one page out of
//! it, append that page, and serialize the result. [`LopdfBuilder`] is the
//! lopdf implementation.
//!
//! lopdf has no notion of importing a page from another document, so
//! [`LopdfBuilder::load`] renumbers every source into an id range the target
//! has not used yet. Copied pages then keep their object ids and cannot
//! collide with anything already in the target, even when the same file is
//! loaded several times.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use tracing::{debug, trace};

use crate::config::{CompressionLevel, Metadata};
use crate::error::{PageCatError, Result};
use crate::merge::metadata::MetadataManager;
use crate::utils;

/// Page attributes that a page may inherit from its ancestors.
const INHERITABLE_KEYS: &[&str] = &["Resources", "MediaBox", "CropBox", "Rotate"];

/// PDF version written for merged documents.
pub const OUTPUT_VERSION: &str = "1.7";

/// Builds an output document page by page.
///
/// Every method may fail with `BuildFailed` on an invalid page index or a
/// corrupt document.
pub trait DocumentBuilder {
    /// Document under construction.
    type Document;
    /// A source document pages are copied from.
    type Source;
    /// A copied page, ready to be appended.
    type Page;

    /// Start a new, empty output document.
    fn create_empty(&mut self) -> Result<Self::Document>;

    /// Load a source document from its bytes for copying into `target`.
    fn load(&mut self, target: &mut Self::Document, bytes: &[u8]) -> Result<Self::Source>;

    /// Copy the page at zero-based `index` of `source` into `target`.
    ///
    /// The page is not part of the output until it is appended.
    fn copy_page(
        &mut self,
        target: &mut Self::Document,
        source: &Self::Source,
        index: usize,
    ) -> Result<Self::Page>;

    /// Append a copied page as the next page of `target`.
    fn append(&mut self, target: &mut Self::Document, page: Self::Page) -> Result<()>;

    /// Finish the document and return its bytes.
    fn serialize(&mut self, target: Self::Document) -> Result<Vec<u8>>;
}

/// Output document under construction.
#[derive(Debug)]
pub struct LopdfTarget {
    document: Document,
    pages_id: ObjectId,
    page_count: usize,
}

impl LopdfTarget {
    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// The document as built so far.
    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// A source document, renumbered for one target.
#[derive(Debug)]
pub struct LopdfSource {
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl LopdfSource {
    /// Number of pages in the source.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }
}

/// A page dictionary copied into a target, not yet linked into its page tree.
#[derive(Debug, Clone)]
pub struct LopdfPage {
    dictionary: Dictionary,
}

/// [`DocumentBuilder`] backed by lopdf.
#[derive(Debug, Clone, Default)]
pub struct LopdfBuilder {
    compression: CompressionLevel,
    metadata: Metadata,
}

impl LopdfBuilder {
    /// Create a builder with standard compression and no extra metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compression applied when serializing.
    pub fn with_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Set the metadata written into the Info dictionary.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

fn build_error(context: &str, err: impl std::fmt::Display) -> PageCatError {
    PageCatError::build_failed(format!("{context}: {err}"))
}

impl DocumentBuilder for LopdfBuilder {
    type Document = LopdfTarget;
    type Source = LopdfSource;
    type Page = LopdfPage;

    fn create_empty(&mut self) -> Result<LopdfTarget> {
        let mut document = Document::with_version(OUTPUT_VERSION);
        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Ok(LopdfTarget {
            document,
            pages_id,
            page_count: 0,
        })
    }

    fn load(&mut self, target: &mut LopdfTarget, bytes: &[u8]) -> Result<LopdfSource> {
        let mut document =
            Document::load_mem(bytes).map_err(|e| build_error("cannot read source", e))?;

        let first_id = target.document.max_id + 1;
        document.renumber_objects_with(first_id);
        target.document.max_id = target.document.max_id.max(document.max_id);

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        trace!(first_id, last_id = document.max_id, pages = page_ids.len(), "loaded source");

        Ok(LopdfSource { document, page_ids })
    }

    fn copy_page(
        &mut self,
        target: &mut LopdfTarget,
        source: &LopdfSource,
        index: usize,
    ) -> Result<LopdfPage> {
        let page_id = *source.page_ids.get(index).ok_or_else(|| {
            PageCatError::build_failed(format!(
                "page index {index} out of range (source has {} pages)",
                source.page_count()
            ))
        })?;

        let mut dictionary = source
            .document
            .get_dictionary(page_id)
            .map_err(|e| build_error("cannot read page", e))?
            .clone();

        for key in INHERITABLE_KEYS {
            if !dictionary.has(key.as_bytes())
                && let Some(value) =
                    utils::find_inherited(&source.document, page_id, key.as_bytes())
            {
                dictionary.set(*key, value);
            }
        }
        dictionary.remove(b"Parent");

        let copied: usize = dictionary
            .iter()
            .map(|(_, value)| {
                utils::import_references(&mut target.document, &source.document, value)
            })
            .sum();
        trace!(index, objects = copied, "copied page");

        Ok(LopdfPage { dictionary })
    }

    fn append(&mut self, target: &mut LopdfTarget, page: LopdfPage) -> Result<()> {
        let mut dictionary = page.dictionary;
        dictionary.set("Parent", target.pages_id);
        let page_id = target.document.add_object(dictionary);

        let pages = target
            .document
            .get_dictionary_mut(target.pages_id)
            .map_err(|e| build_error("cannot update page tree", e))?;
        let kids = pages
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|e| build_error("cannot update page tree", e))?;
        kids.push(page_id.into());
        let count = kids.len() as i64;
        pages.set("Count", count);

        target.page_count += 1;
        Ok(())
    }

    fn serialize(&mut self, target: LopdfTarget) -> Result<Vec<u8>> {
        let mut document = target.document;

        MetadataManager::new().set_metadata(&mut document, &self.metadata)?;

        match self.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => document.compress(),
            CompressionLevel::Maximum => {
                let pruned = document.prune_objects();
                debug!(pruned = pruned.len(), "pruned unreferenced objects");
                document.compress();
            }
        }
        document.renumber_objects();

        let mut bytes = Vec::new();
        document
            .save_to(&mut bytes)
            .map_err(|e| build_error("cannot serialize output", e))?;

        debug!(
            pages = target.page_count,
            bytes = bytes.len(),
            compression = ?self.compression,
            "serialized output"
        );
        Ok(bytes)
    }
}
