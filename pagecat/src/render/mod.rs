//! Page previews.
//!
//! [`PageRenderer`] turns a [`PageHandle`] into a [`Thumbnail`] at a given
//! scale. The bundled [`MediaBoxRenderer`] does not rasterise page content;
//! it produces a blank sheet with the page's effective size and orientation,
//! which is what a page picker needs to lay thumbnails out. A rasterising
//! backend plugs in behind the same trait.

use std::path::Path;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::error::{PageCatError, Result};
use crate::io::PageHandle;

/// Largest edge of a thumbnail, in pixels.
pub const MAX_THUMBNAIL_EDGE: u32 = 4096;

/// Renders page previews.
pub trait PageRenderer {
    /// Render `page` at `scale` (1.0 = one pixel per PDF point).
    ///
    /// # Errors
    ///
    /// Returns `FailedToRender` when the page cannot be rendered.
    fn render(&self, page: &PageHandle<'_>, scale: f32) -> Result<Thumbnail>;
}

/// A rendered page preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    page_number: u32,
    image: RgbaImage,
}

impl Thumbnail {
    /// Wrap a rendered image.
    pub fn new(page_number: u32, image: RgbaImage) -> Self {
        Self { page_number, image }
    }

    /// 1-based number of the page this preview shows.
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Write the preview as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| PageCatError::FailedToWrite {
                path: path.to_path_buf(),
                source: std::io::Error::other(e),
            })
    }
}

/// Renders each page as a blank sheet sized to its MediaBox.
#[derive(Debug, Clone)]
pub struct MediaBoxRenderer {
    background: Rgba<u8>,
    border: Rgba<u8>,
}

impl Default for MediaBoxRenderer {
    fn default() -> Self {
        Self {
            background: Rgba([255, 255, 255, 255]),
            border: Rgba([160, 160, 160, 255]),
        }
    }
}

impl MediaBoxRenderer {
    /// Create a renderer with a white sheet and a grey border.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel size of a page at `scale`, after applying its rotation.
    ///
    /// Pages whose longer edge would exceed [`MAX_THUMBNAIL_EDGE`] are scaled
    /// down to fit, keeping their aspect ratio.
    pub fn thumbnail_size(&self, page: &PageHandle<'_>, scale: f32) -> Result<(u32, u32)> {
        let fail = |reason: String| {
            PageCatError::failed_to_render(page.document_name(), page.number(), reason)
        };

        if !(scale.is_finite() && scale > 0.0) {
            return Err(fail(format!("invalid scale {scale}")));
        }

        let (width, height) = page.size()?;
        if !(width > 0.0 && height > 0.0) {
            return Err(fail(format!("page is empty ({width}x{height} pt)")));
        }
        let (width, height) = match page.rotation() {
            90 | 270 => (height, width),
            _ => (width, height),
        };

        let limit = MAX_THUMBNAIL_EDGE as f32;
        let scale = scale.min(limit / width.max(height));
        let to_pixels = |points: f32| (points * scale).round().clamp(1.0, limit) as u32;

        Ok((to_pixels(width), to_pixels(height)))
    }
}

impl PageRenderer for MediaBoxRenderer {
    fn render(&self, page: &PageHandle<'_>, scale: f32) -> Result<Thumbnail> {
        let (width, height) = self.thumbnail_size(page, scale)?;
        let mut image = RgbaImage::from_pixel(width, height, self.background);

        for x in 0..width {
            image.put_pixel(x, 0, self.border);
            image.put_pixel(x, height - 1, self.border);
        }
        for y in 0..height {
            image.put_pixel(0, y, self.border);
            image.put_pixel(width - 1, y, self.border);
        }

        Ok(Thumbnail::new(page.number(), image))
    }
}
