//! Decoding PDF bytes into page handles.
//!
//! [`PdfDecoder`] parses a byte buffer with lopdf and exposes the result as a
//! [`DecodedPdf`]: a page count plus 1-based access to [`PageHandle`]s that
//! the renderer can measure.

use lopdf::{Document, ObjectId};
use tracing::debug;

use crate::error::{PageCatError, Result};
use crate::utils;

/// US Letter, used when a page tree carries no MediaBox at all.
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Decoder for PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfDecoder {
    allow_empty: bool,
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfDecoder {
    /// Create a decoder that accepts documents without pages.
    pub fn new() -> Self {
        Self { allow_empty: true }
    }

    /// Create a decoder that rejects documents without pages.
    pub fn strict() -> Self {
        Self { allow_empty: false }
    }

    /// Decode a PDF held in memory.
    ///
    /// # Errors
    ///
    /// Returns `EncryptedPdf` for password-protected input and
    /// `FailedToDecode` for anything lopdf cannot parse.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> Result<DecodedPdf> {
        let document = Document::load_mem(bytes).map_err(|e| {
            let err_msg = e.to_string();
            let lowered = err_msg.to_lowercase();
            if lowered.contains("encrypt") || lowered.contains("password") {
                PageCatError::encrypted_pdf(name)
            } else {
                PageCatError::failed_to_decode(name, err_msg)
            }
        })?;

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();

        if page_ids.is_empty() && !self.allow_empty {
            return Err(PageCatError::failed_to_decode(name, "PDF has no pages"));
        }

        debug!(
            file = name,
            pages = page_ids.len(),
            version = %document.version,
            "decoded PDF"
        );

        Ok(DecodedPdf {
            name: name.to_string(),
            document,
            page_ids,
        })
    }
}

/// A decoded PDF document.
#[derive(Debug)]
pub struct DecodedPdf {
    name: String,
    document: Document,
    page_ids: Vec<ObjectId>,
}

impl DecodedPdf {
    /// Display name of the source file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    /// PDF version from the file header.
    pub fn version(&self) -> &str {
        &self.document.version
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Get a page by its 1-based number.
    ///
    /// # Errors
    ///
    /// Returns `FailedToDecode` if the number is 0 or past the last page.
    pub fn page(&self, number: u32) -> Result<PageHandle<'_>> {
        let id = number
            .checked_sub(1)
            .and_then(|index| self.page_ids.get(index as usize))
            .ok_or_else(|| {
                PageCatError::failed_to_decode(
                    &self.name,
                    format!(
                        "page {number} does not exist (document has {} pages)",
                        self.page_count()
                    ),
                )
            })?;

        Ok(PageHandle {
            document: &self.document,
            name: &self.name,
            id: *id,
            number,
        })
    }

    /// Iterate over all pages in order.
    pub fn pages(&self) -> impl Iterator<Item = PageHandle<'_>> {
        self.page_ids
            .iter()
            .enumerate()
            .map(|(index, id)| PageHandle {
                document: &self.document,
                name: &self.name,
                id: *id,
                number: index as u32 + 1,
            })
    }
}

/// One page of a [`DecodedPdf`].
#[derive(Debug, Clone, Copy)]
pub struct PageHandle<'a> {
    document: &'a Document,
    name: &'a str,
    id: ObjectId,
    number: u32,
}

impl<'a> PageHandle<'a> {
    /// 1-based page number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Display name of the owning file.
    pub fn document_name(&self) -> &'a str {
        self.name
    }

    /// Object id of the page dictionary.
    pub fn object_id(&self) -> ObjectId {
        self.id
    }

    /// Effective MediaBox as `[llx, lly, urx, ury]`.
    ///
    /// The box is looked up on the page and then on its ancestors in the
    /// page tree. Pages without any MediaBox fall back to US Letter.
    ///
    /// # Errors
    ///
    /// Returns `FailedToDecode` if a MediaBox is present but malformed.
    pub fn media_box(&self) -> Result<[f32; 4]> {
        let Some(object) = utils::find_inherited(self.document, self.id, b"MediaBox") else {
            return Ok(DEFAULT_MEDIA_BOX);
        };

        let malformed = || {
            PageCatError::failed_to_decode(
                self.name,
                format!("page {} has a malformed MediaBox", self.number),
            )
        };

        let array = utils::resolve(self.document, &object)
            .as_array()
            .map_err(|_| malformed())?;
        if array.len() != 4 {
            return Err(malformed());
        }

        let mut rect = [0.0f32; 4];
        for (slot, value) in rect.iter_mut().zip(array) {
            *slot = utils::number(utils::resolve(self.document, value)).ok_or_else(malformed)?;
        }
        Ok(rect)
    }

    /// Page width and height in points, before rotation.
    pub fn size(&self) -> Result<(f32, f32)> {
        let [llx, lly, urx, ury] = self.media_box()?;
        Ok(((urx - llx).abs(), (ury - lly).abs()))
    }

    /// Effective `/Rotate` value normalised to 0, 90, 180 or 270.
    pub fn rotation(&self) -> u16 {
        let degrees = utils::find_inherited(self.document, self.id, b"Rotate")
            .and_then(|obj| utils::resolve(self.document, &obj).as_i64().ok())
            .unwrap_or(0);
        (degrees.rem_euclid(360) / 90 * 90) as u16
    }
}

impl std::fmt::Display for PageHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} p{}", self.name, self.number)
    }
}
