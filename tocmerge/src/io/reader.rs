//! PDF loading.
//!
//! [`PdfReader`] loads a source file with `lopdf`, checks that its page tree
//! is usable and wraps it in a [`LoadedPdf`], which is what the merger reads
//! pages, bookmarks and named destinations from.
//!
//! # Examples
//!
//! ```no_run
//! use tocmerge::io::SourceDocument;
//! use tocmerge::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("document.pdf"))?;
//! println!("Loaded {} pages in {:?}", loaded.page_count(), loaded.load_time);
//! # Ok(())
//! # }
//! ```

use lopdf::{Document, ObjectId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::SourceDocument;
use super::destinations::OutlineReader;
use crate::error::{Result, TocMergeError};
use crate::outline::{ExplicitDestination, SourceOutline};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,

    /// Page object ids in page order.
    page_ids: Vec<ObjectId>,

    /// Page object id to zero-based page index.
    page_index: HashMap<ObjectId, usize>,
}

impl LoadedPdf {
    /// Wrap an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns [`TocMergeError::EncryptedPdf`] for encrypted documents and
    /// [`TocMergeError::CorruptedPdf`] when a page does not resolve to a
    /// dictionary.
    pub fn from_document(document: Document, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if document.trailer.get(b"Encrypt").is_ok() {
            return Err(TocMergeError::encrypted_pdf(path));
        }

        let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
        for (index, &page_id) in page_ids.iter().enumerate() {
            if document.get_dictionary(page_id).is_err() {
                return Err(TocMergeError::corrupted_pdf(
                    path,
                    format!(
                        "page {} ({} {} R) is not a page dictionary",
                        index + 1,
                        page_id.0,
                        page_id.1
                    ),
                ));
            }
        }

        let page_index = page_ids
            .iter()
            .enumerate()
            .map(|(index, &id)| (id, index))
            .collect();

        Ok(Self {
            document,
            path,
            load_time: Duration::ZERO,
            file_size: 0,
            page_ids,
            page_index,
        })
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    fn outline_reader(&self) -> OutlineReader<'_> {
        OutlineReader::new(&self.document, &self.page_index, &self.path)
    }
}

impl SourceDocument for LoadedPdf {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn outline(&self) -> Result<SourceOutline> {
        self.outline_reader().read()
    }

    fn resolve_named_destination(&self, name: &str) -> Option<ExplicitDestination> {
        self.outline_reader().resolve_named(name)
    }
}

/// PDF reader.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the PDF file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not a regular file
    /// - File is not a valid PDF
    /// - PDF is encrypted
    /// - A page in the page tree is not a dictionary
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let path_buf = path.to_path_buf();

        let metadata = std::fs::metadata(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => TocMergeError::file_not_found(path_buf.clone()),
            _ => TocMergeError::failed_to_load_pdf(path_buf.clone(), err.to_string()),
        })?;
        if !metadata.is_file() {
            return Err(TocMergeError::not_a_file(path_buf));
        }

        let start = Instant::now();

        let document = Document::load(path).map_err(|e| {
            let err_msg = e.to_string();
            if err_msg.contains("encrypt") || err_msg.contains("password") {
                TocMergeError::encrypted_pdf(path_buf.clone())
            } else {
                TocMergeError::failed_to_load_pdf(path_buf.clone(), err_msg)
            }
        })?;

        let mut loaded = LoadedPdf::from_document(document, path_buf)?;
        loaded.load_time = start.elapsed();
        loaded.file_size = metadata.len();

        log::debug!(
            "Loaded {} ({} pages) in {:?}",
            path.display(),
            loaded.page_count(),
            loaded.load_time
        );

        Ok(loaded)
    }
}
