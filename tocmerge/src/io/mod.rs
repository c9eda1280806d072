//! PDF input and output.
//!
//! The merger talks to PDF libraries through three small traits:
//!
//! - [`PdfBackend`] opens sources and creates the output document
//! - [`SourceDocument`] exposes a source's page count, outline and named
//!   destinations
//! - [`OutputDocument`] accepts concatenated pages and the final outline
//!
//! [`LopdfBackend`] implements them with `lopdf`.
//!
//! # Examples
//!
//! ```no_run
//! use tocmerge::io::{LopdfBackend, PdfBackend, SourceDocument};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = LopdfBackend::new();
//! let source = backend.open(Path::new("report.pdf"))?;
//! println!("{} pages, {} top-level bookmarks", source.page_count(), source.outline()?.nodes.len());
//! # Ok(())
//! # }
//! ```

mod destinations;
pub mod reader;
pub mod writer;

pub use reader::{LoadedPdf, PdfReader};
pub use writer::{MergedDocument, PdfWriter, WriteOptions, WriteStatistics};

use std::path::Path;

use crate::error::Result;
use crate::outline::{ExplicitDestination, OutlineEntry, SourceOutline};

/// A source document opened for merging.
pub trait SourceDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Read the document outline.
    ///
    /// Returns an empty outline when the document has no bookmarks. Links
    /// that cannot be followed are counted in [`SourceOutline::truncated`]
    /// and the rest of the outline is still returned.
    ///
    /// # Errors
    ///
    /// Returns an error when an outline exists but cannot be read at all.
    fn outline(&self) -> Result<SourceOutline>;

    /// Look up a named destination, returning its zero-based page.
    fn resolve_named_destination(&self, name: &str) -> Option<ExplicitDestination>;
}

/// The combined document being built.
pub trait OutputDocument<S> {
    /// Number of pages appended so far.
    fn page_count(&self) -> usize;

    /// Copy pages `from..=to` of `source` into this document at `insert_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is out of bounds or the pages cannot
    /// be copied. The document is left unchanged on error.
    fn concatenate_pages(
        &mut self,
        source: &S,
        from: usize,
        to: usize,
        insert_at: usize,
    ) -> Result<()>;

    /// Replace the document outline with the given pre-order entries.
    fn set_outline(&mut self, entries: &[OutlineEntry]) -> Result<()>;

    /// Write the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    fn save(&self, path: &Path) -> Result<WriteStatistics>;
}

/// Opens sources and creates output documents.
pub trait PdfBackend {
    /// Source document type.
    type Source: SourceDocument;
    /// Output document type.
    type Output: OutputDocument<Self::Source>;

    /// Open a source document.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, encrypted or
    /// not a PDF.
    fn open(&self, path: &Path) -> Result<Self::Source>;

    /// Create an empty output document.
    fn create_output(&self) -> Self::Output;
}

/// [`PdfBackend`] built on `lopdf`.
#[derive(Debug, Clone, Default)]
pub struct LopdfBackend {
    reader: PdfReader,
    write_options: WriteOptions,
}

impl LopdfBackend {
    /// Create a backend with default reader and writer settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose output documents use `options` when saved.
    pub fn with_write_options(options: WriteOptions) -> Self {
        Self {
            reader: PdfReader::new(),
            write_options: options,
        }
    }

    /// Writer settings used for output documents.
    pub fn write_options(&self) -> &WriteOptions {
        &self.write_options
    }
}

impl PdfBackend for LopdfBackend {
    type Source = LoadedPdf;
    type Output = MergedDocument;

    fn open(&self, path: &Path) -> Result<LoadedPdf> {
        self.reader.load(path)
    }

    fn create_output(&self) -> MergedDocument {
        MergedDocument::new(self.write_options.clone())
    }
}
