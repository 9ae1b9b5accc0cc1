//! Command-line arguments for pagecat.

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use pagecat::config::{
    CompressionLevel, Config, DEFAULT_OUTPUT, DEFAULT_PREVIEW_SCALE, Metadata, OverwriteMode,
    SelectionSpec, SourceReuse,
};
use pagecat::error::{PageCatError, Result};

/// Pick pages from several PDF files and merge them into one document.
///
/// Pages are merged in the order they are selected, not in file order.
///
///   pagecat a.pdf b.pdf --select 1:2 --select 2:1 --select 1:1
///
/// produces merged.pdf with page 2 of a.pdf, page 1 of b.pdf, then page 1 of
/// a.pdf. Use --interactive to pick pages from a command shell instead.
#[derive(Parser, Debug)]
#[command(name = "pagecat")]
#[command(version)]
#[command(about = "Pick pages from several PDF files and merge them into one document")]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files or glob patterns, in load order
    ///
    /// Files whose name does not end in .pdf are skipped.
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Select pages as DOC:PAGES, in merge order (repeatable)
    ///
    /// DOC is the 1-based position of an input file, PAGES is a page list
    /// such as 3, 1-4,7 or all. Pages are added in the order written.
    ///
    /// Examples:
    ///   --select 2:1 --select 1:3-4
    ///   --select 1:all
    #[arg(short, long = "select", value_name = "DOC:PAGES")]
    pub selections: Vec<SelectionSpec>,

    /// Select every page of every input, in file order
    #[arg(short, long, conflicts_with = "selections")]
    pub all: bool,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Start an interactive shell instead of merging right away
    ///
    /// The files given on the command line are loaded first. Type 'help' in
    /// the shell for the list of commands.
    #[arg(short, long)]
    pub interactive: bool,

    /// Print the session as JSON instead of merging
    #[arg(long)]
    pub json: bool,

    /// Preview scale relative to the page size, in (0, 4]
    #[arg(long, value_name = "FACTOR", default_value_t = DEFAULT_PREVIEW_SCALE)]
    pub scale: f32,

    /// Write page previews as PNG files into this directory
    ///
    /// Files are named <doc-id>-p<page>.png.
    #[arg(long, value_name = "DIR")]
    pub thumbnails: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Overwrite an existing output file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for the output PDF
    ///
    /// - none: streams are written as copied
    /// - standard: compress streams (default)
    /// - maximum: compress streams and drop unused objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// How often source files are re-read during a merge
    ///
    /// - per-merge: once per source file (default)
    /// - per-page: once per selected page
    #[arg(long, value_name = "POLICY", default_value = "per-merge")]
    #[arg(value_parser = ["per-merge", "per-page"])]
    pub reuse_sources: String,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,
}

impl Cli {
    /// Convert the arguments into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if an option value is invalid or the
    /// combination of options is rejected by [`Config::validate`].
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;

        let source_reuse = match self.reuse_sources.as_str() {
            "per-merge" => SourceReuse::PerMerge,
            "per-page" => SourceReuse::PerPage,
            other => {
                return Err(PageCatError::invalid_config(format!(
                    "Invalid source reuse policy: {other}. Must be per-merge or per-page"
                )));
            }
        };

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let config = Config {
            inputs: self.inputs.iter().map(PathBuf::from).collect(),
            selections: self.selections.clone(),
            select_all: self.all,
            output: self.output.clone(),
            interactive: self.interactive,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            compression,
            metadata: Metadata::new(
                self.title.clone(),
                self.author.clone(),
                self.subject.clone(),
                self.keywords.clone(),
            ),
            preview_scale: self.scale,
            thumbnails_dir: self.thumbnails.clone(),
            source_reuse,
            json: self.json,
        };

        config.validate().map_err(|e| {
            PageCatError::invalid_config(format!("Configuration validation failed: {e:#}"))
        })?;

        Ok(config)
    }

    /// Early checks that need no file access.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` on conflicting or empty arguments.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && !self.interactive {
            return Err(PageCatError::invalid_config(
                "No input files specified (use --interactive to start without files)",
            ));
        }

        if self.inputs.iter().any(|input| input.trim().is_empty()) {
            return Err(PageCatError::invalid_config("Empty input path"));
        }

        if self.json && self.interactive {
            return Err(PageCatError::invalid_config(
                "--json lists a batch session; use 'list --json' inside the shell",
            ));
        }

        Ok(())
    }
}
