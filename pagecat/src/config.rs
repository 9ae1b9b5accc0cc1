//! Configuration module for pagecat.
//!
//! This module holds the validated configuration that drives a pagecat run,
//! built from CLI arguments. It handles:
//! - Validation of argument combinations
//! - Parsing of page selections (`DOC:PAGES`)
//! - Application of defaults

use anyhow::{Context, Result, bail};

use crate::PageCatError;
use std::{fmt, path::PathBuf, str::FromStr};

/// File name used for the merged document when none is given.
pub const DEFAULT_OUTPUT: &str = "merged.pdf";

/// Scale factor applied to page previews when none is given.
pub const DEFAULT_PREVIEW_SCALE: f32 = 0.5;

/// Largest accepted preview scale.
pub const MAX_PREVIEW_SCALE: f32 = 4.0;

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - streams are written as they were copied.
    None,
    /// Compress streams only.
    #[default]
    Standard,
    /// Compress streams and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = crate::PageCatError;

    /// Parse compression level from "none", "standard", or "maximum".
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PageCatError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Page range specification.
///
/// Supports individual pages and ranges:
/// - "1" - single page
/// - "1-5" - range of pages (inclusive)
/// - "1,3,5" - multiple individual pages
/// - "5-7,1" - combination of ranges, order is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    ranges: Vec<PageRangeItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRangeItem {
    Single(u32),
    Range(u32, u32),
}

impl PageRange {
    /// Parse a page range string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string format is invalid or contains invalid page numbers.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagecat::config::PageRange;
    ///
    /// let range = PageRange::parse("1-5,10").unwrap();
    /// assert!(range.contains(3));
    /// assert!(range.contains(10));
    /// assert!(!range.contains(7));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let mut ranges = Vec::new();

        for part in s.split(',') {
            let part = part.trim();

            if part.contains('-') {
                let parts: Vec<&str> = part.split('-').collect();
                if parts.len() != 2 {
                    bail!("Invalid page range format: {part}. Expected format like '1-5'");
                }

                let start: u32 = parts[0]
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid page number: {}", parts[0]))?;

                let end: u32 = parts[1]
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid page number: {}", parts[1]))?;

                if start == 0 || end == 0 {
                    bail!("Page numbers must be positive (1-indexed)");
                }

                if start > end {
                    bail!(
                        "Invalid range {start}-{end}: start page must be less than or equal to end page"
                    );
                }

                ranges.push(PageRangeItem::Range(start, end));
            } else {
                let page: u32 = part
                    .parse()
                    .with_context(|| format!("Invalid page number: {part}"))?;

                if page == 0 {
                    bail!("Page numbers must be positive (1-indexed)");
                }

                ranges.push(PageRangeItem::Single(page));
            }
        }

        if ranges.is_empty() {
            bail!("Page range cannot be empty");
        }

        Ok(Self { ranges })
    }

    /// Check if a page number is included in this range.
    pub fn contains(&self, page: u32) -> bool {
        self.ranges.iter().any(|item| match item {
            PageRangeItem::Single(p) => *p == page,
            PageRangeItem::Range(start, end) => page >= *start && page <= *end,
        })
    }

    /// Page numbers in the order they were written, up to `max_pages`.
    ///
    /// Duplicates keep their first position. Pages beyond `max_pages` are
    /// dropped.
    pub fn pages_in_order(&self, max_pages: u32) -> Vec<u32> {
        let mut pages = Vec::new();
        for item in &self.ranges {
            let (start, end) = match *item {
                PageRangeItem::Single(p) => (p, p),
                PageRangeItem::Range(start, end) => (start, end.min(max_pages)),
            };
            for page in start..=end {
                if page <= max_pages && !pages.contains(&page) {
                    pages.push(page);
                }
            }
        }
        pages
    }

    /// Highest page number mentioned in this range.
    pub fn max_page(&self) -> u32 {
        self.ranges
            .iter()
            .map(|item| match item {
                PageRangeItem::Single(p) => *p,
                PageRangeItem::Range(_, end) => *end,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Pages named by a [`SelectionSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page of the document, ascending.
    All,
    /// An explicit list of pages, in the order written.
    Pages(PageRange),
}

/// A page selection given on the command line: `DOC:PAGES`.
///
/// `DOC` is the 1-based position of a loaded document, `PAGES` is `all` or
/// a page range such as `3,1-2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSpec {
    /// 1-based position of the document among the loaded inputs.
    pub document: usize,
    /// Pages to select from that document.
    pub pages: PageSelection,
    raw: String,
}

impl SelectionSpec {
    /// The selection as written by the user.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for SelectionSpec {
    type Err = PageCatError;

    fn from_str(s: &str) -> crate::Result<Self> {
        let raw = s.trim();
        let Some((doc, pages)) = raw.split_once(':') else {
            return Err(PageCatError::invalid_selection(
                raw,
                "expected DOC:PAGES, e.g. 1:2-3 or 2:all",
            ));
        };

        let document: usize = doc.trim().parse().map_err(|_| {
            PageCatError::invalid_selection(raw, format!("invalid document number '{doc}'"))
        })?;
        if document == 0 {
            return Err(PageCatError::invalid_selection(
                raw,
                "document numbers start at 1",
            ));
        }

        let pages = if pages.trim().eq_ignore_ascii_case("all") {
            PageSelection::All
        } else {
            let range = PageRange::parse(pages)
                .map_err(|e| PageCatError::invalid_selection(raw, format!("{e:#}")))?;
            PageSelection::Pages(range)
        };

        Ok(Self {
            document,
            pages,
            raw: raw.to_string(),
        })
    }
}

impl fmt::Display for SelectionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// How the merge re-reads source documents.
///
/// The merged output is identical either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceReuse {
    /// Decode each source document once per merge.
    #[default]
    PerMerge,
    /// Decode the source bytes again for every selected page.
    PerPage,
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a pagecat run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input paths or glob patterns, in load order.
    pub inputs: Vec<PathBuf>,

    /// Page selections applied after loading, in order.
    pub selections: Vec<SelectionSpec>,

    /// Select every page of every loaded document.
    pub select_all: bool,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Start the interactive command shell.
    pub interactive: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Metadata to set on output document.
    pub metadata: Metadata,

    /// Scale factor for page previews.
    pub preview_scale: f32,

    /// Directory to write page previews to, if any.
    pub thumbnails_dir: Option<PathBuf>,

    /// How sources are re-read during a merge.
    pub source_reuse: SourceReuse,

    /// Print the session as JSON instead of merging.
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            selections: Vec::new(),
            select_all: false,
            output: PathBuf::from(DEFAULT_OUTPUT),
            interactive: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            metadata: Metadata::default(),
            preview_scale: DEFAULT_PREVIEW_SCALE,
            thumbnails_dir: None,
            source_reuse: SourceReuse::default(),
            json: false,
        }
    }
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are given outside interactive mode
    /// - Verbose and quiet modes are both enabled
    /// - The preview scale is outside (0, 4]
    /// - A selection names a document that is not among the inputs
    /// - The output path is also an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && !self.interactive {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if !(self.preview_scale > 0.0 && self.preview_scale <= MAX_PREVIEW_SCALE) {
            bail!(
                "Preview scale must be greater than 0 and at most {MAX_PREVIEW_SCALE}, got {}",
                self.preview_scale
            );
        }

        if self.select_all && !self.selections.is_empty() {
            bail!("Cannot combine --all with --select");
        }

        // Glob patterns may expand to more files, so only literal paths bound
        // the document numbers.
        let has_patterns = self.inputs.iter().any(|p| is_pattern(p));
        if !has_patterns {
            for spec in &self.selections {
                if spec.document > self.inputs.len() {
                    bail!(
                        "Selection '{spec}' refers to document {} but only {} input(s) given",
                        spec.document,
                        self.inputs.len()
                    );
                }
            }
        }

        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output file cannot be the same as an input file: {}",
                    self.output.display()
                );
            }
        }

        Ok(())
    }

    /// Check if a merge should happen at the end of a batch run.
    pub fn wants_merge(&self) -> bool {
        !self.json && (self.select_all || !self.selections.is_empty())
    }

    /// Check if output should be displayed.
    pub fn should_print(&self) -> bool {
        !self.quiet
    }
}

fn is_pattern(path: &std::path::Path) -> bool {
    path.to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}
