//! Building and saving the merged document.
//!
//! [`MergedDocument`] owns a fresh page tree. Pages copied from sources are
//! renumbered into its object space, re-parented under that tree and given
//! their inherited attributes. The outline is written from the reconciled
//! entry list, and [`PdfWriter`] saves the result with an atomic
//! write-then-rename.
//!
//! # Examples
//!
//! ```no_run
//! use tocmerge::io::writer::{MergedDocument, WriteOptions};
//! use tocmerge::io::OutputDocument;
//! use tocmerge::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = PdfReader::new().load(Path::new("chapter.pdf"))?;
//! let mut merged = MergedDocument::new(WriteOptions::default());
//! merged.concatenate_pages(&source, 0, 0, 0)?;
//! let stats = merged.save(Path::new("output.pdf"))?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::OutputDocument;
use super::reader::LoadedPdf;
use crate::config::CompressionLevel;
use crate::error::{Result, TocMergeError};
use crate::outline::{Destination, OutlineEntry, OutlineNode, ViewPosition, entries_to_forest};
use crate::utils::format_file_size;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Options for writing PDF files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Stream compression and cleanup applied before writing.
    pub compression: CompressionLevel,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compression: CompressionLevel::Standard,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression level that was applied.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Saves documents to disk.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a new PDF writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Save a PDF document and return statistics about the write.
    ///
    /// The document is cloned so the caller's copy keeps its object ids.
    ///
    /// # Arguments
    ///
    /// * `doc` - PDF document to save
    /// * `path` - Output file path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output directory cannot be created
    /// - The file cannot be created or written
    /// - The temporary file cannot be renamed into place
    pub fn save(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();
        let mut doc = doc.clone();

        match self.options.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => {
                doc.compress();
                doc.renumber_objects();
            }
            CompressionLevel::Maximum => {
                let pruned = doc.prune_objects();
                log::debug!("Pruned {} unreachable objects", pruned.len());
                doc.compress();
                doc.renumber_objects();
            }
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| TocMergeError::FailedToCreateOutput {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let write_path = if self.options.atomic {
            temp_path_for(path)
        } else {
            path.to_path_buf()
        };

        if let Err(err) = self.write_file(&mut doc, &write_path) {
            if self.options.atomic {
                let _ = std::fs::remove_file(&write_path);
            }
            return Err(err);
        }

        if self.options.atomic {
            std::fs::rename(&write_path, path).map_err(|e| {
                let _ = std::fs::remove_file(&write_path);
                TocMergeError::FailedToWrite {
                    path: path.to_path_buf(),
                    source: e,
                }
            })?;
        }

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
        let stats = WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
            compression: self.options.compression,
        };

        log::info!(
            "Wrote {} ({}) in {:?}",
            path.display(),
            stats.format_file_size(),
            stats.write_time
        );

        Ok(stats)
    }

    fn write_file(&self, doc: &mut Document, write_path: &Path) -> Result<()> {
        let file = File::create(write_path).map_err(|e| TocMergeError::FailedToCreateOutput {
            path: write_path.to_path_buf(),
            source: e,
        })?;

        let mut writer = BufWriter::with_capacity(self.options.buffer_size, file);

        doc.save_to(&mut writer)
            .map_err(|e| TocMergeError::FailedToWrite {
                path: write_path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;

        writer.flush().map_err(|e| TocMergeError::FailedToWrite {
            path: write_path.to_path_buf(),
            source: e,
        })
    }
}

/// Temporary file used for atomic writes, next to the final output.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// The combined document under construction.
#[derive(Debug, Clone)]
pub struct MergedDocument {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    options: WriteOptions,
}

impl MergedDocument {
    /// Create an empty document with its own catalog and page tree.
    pub fn new(options: WriteOptions) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
            options,
        }
    }

    /// The underlying `lopdf` document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Page object ids in page order.
    pub fn page_ids(&self) -> &[ObjectId] {
        &self.page_ids
    }

    fn sync_page_tree(&mut self) -> Result<()> {
        let kids: Vec<Object> = self.page_ids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = self.document.get_dictionary_mut(self.pages_id)?;
        pages.set("Kids", kids);
        pages.set("Count", self.page_ids.len() as i64);
        Ok(())
    }

    /// Write one level of the outline under `parent` and return the first
    /// and last item ids.
    fn write_outline_items(
        &mut self,
        nodes: &[OutlineNode],
        parent: ObjectId,
    ) -> Option<(ObjectId, ObjectId)> {
        let ids: Vec<ObjectId> = nodes.iter().map(|_| self.document.new_object_id()).collect();

        for (index, node) in nodes.iter().enumerate() {
            let mut item = dictionary! {
                "Title" => lopdf::text_string(&node.title),
                "Parent" => parent,
            };
            if index > 0 {
                item.set("Prev", ids[index - 1]);
            }
            if let Some(next) = ids.get(index + 1) {
                item.set("Next", *next);
            }
            if let Some(dest) = self.destination_array(node) {
                item.set("Dest", dest);
            }
            if let Some((first, last)) = self.write_outline_items(&node.children, ids[index]) {
                item.set("First", first);
                item.set("Last", last);
                // Negative count: children start out collapsed
                item.set("Count", -(node.children.len() as i64));
            }
            self.document
                .objects
                .insert(ids[index], Object::Dictionary(item));
        }

        Some((*ids.first()?, *ids.last()?))
    }

    fn destination_array(&self, node: &OutlineNode) -> Option<Object> {
        let Some(Destination::Explicit(dest)) = &node.destination else {
            return None;
        };
        let page = usize::try_from(dest.page).ok()?;
        let page_id = *self.page_ids.get(page)?;
        Some(Object::Array(view_array(page_id, dest.view, dest.zoom)))
    }
}

impl OutputDocument<LoadedPdf> for MergedDocument {
    fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    fn concatenate_pages(
        &mut self,
        source: &LoadedPdf,
        from: usize,
        to: usize,
        insert_at: usize,
    ) -> Result<()> {
        let source_pages = source.page_ids().len();
        if from > to || to >= source_pages {
            return Err(TocMergeError::merge_failed(format!(
                "page range {}-{} is outside {} ({} pages)",
                from + 1,
                to + 1,
                source.path.display(),
                source_pages
            )));
        }
        if insert_at > self.page_ids.len() {
            return Err(TocMergeError::merge_failed(format!(
                "cannot insert at page {} of a {} page document",
                insert_at + 1,
                self.page_ids.len()
            )));
        }

        let mut incoming = source.document.clone();
        incoming.renumber_objects_with(self.document.max_id + 1);

        let incoming_pages: Vec<ObjectId> = incoming.get_pages().into_values().collect();
        let selected = incoming_pages
            .get(from..=to)
            .map(<[ObjectId]>::to_vec)
            .ok_or_else(|| {
                TocMergeError::merge_failed(format!(
                    "{} lost pages while renumbering",
                    source.path.display()
                ))
            })?;

        for &page_id in &selected {
            flatten_inherited(&mut incoming, page_id);
            let page = incoming.get_dictionary_mut(page_id)?;
            page.set("Parent", self.pages_id);
        }

        self.document.max_id = self.document.max_id.max(incoming.max_id);
        self.document.objects.extend(incoming.objects);

        let count = selected.len();
        self.page_ids.splice(insert_at..insert_at, selected);
        self.sync_page_tree()?;

        log::debug!(
            "Copied {count} page(s) from {} at page {}",
            source.path.display(),
            insert_at + 1
        );
        Ok(())
    }

    fn set_outline(&mut self, entries: &[OutlineEntry]) -> Result<()> {
        self.document.catalog_mut()?.remove(b"Outlines");

        let forest = entries_to_forest(entries);
        let outlines_id = self.document.new_object_id();
        let Some((first, last)) = self.write_outline_items(&forest, outlines_id) else {
            return Ok(());
        };

        self.document.objects.insert(
            outlines_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => first,
                "Last" => last,
                "Count" => forest.len() as i64,
            }),
        );

        let catalog = self.document.catalog_mut()?;
        catalog.set("Outlines", outlines_id);
        catalog.set("PageMode", "UseOutlines");
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<WriteStatistics> {
        PdfWriter::with_options(self.options.clone()).save(&self.document, path)
    }
}

/// Copy inheritable attributes from ancestors onto the page itself, so the
/// page keeps its size and resources once moved under a new parent.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) {
    let mut inherited = Vec::new();
    if let Ok(page) = doc.get_dictionary(page_id) {
        for key in INHERITABLE_KEYS {
            if page.has(key) {
                continue;
            }
            if let Some(value) = inherited_value(doc, page, key) {
                inherited.push((key, value));
            }
        }
    }

    if let Ok(page) = doc.get_dictionary_mut(page_id) {
        for (key, value) in inherited {
            page.set(key, value);
        }
    }
}

fn inherited_value(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent
        && depth < MAX_PAGE_TREE_DEPTH
    {
        let node = doc.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    None
}

fn view_array(page_id: ObjectId, view: ViewPosition, zoom: Option<f32>) -> Vec<Object> {
    let coord = |value: Option<f32>| value.map(Object::Real).unwrap_or(Object::Null);
    let name = |kind: &str| Object::Name(kind.as_bytes().to_vec());

    let mut array = vec![Object::Reference(page_id)];
    match view {
        ViewPosition::Xyz { left, top } => {
            array.extend([name("XYZ"), coord(left), coord(top), coord(zoom)])
        }
        ViewPosition::Fit => array.push(name("Fit")),
        ViewPosition::FitH { top } => array.extend([name("FitH"), coord(top)]),
        ViewPosition::FitV { left } => array.extend([name("FitV"), coord(left)]),
        ViewPosition::FitR {
            left,
            bottom,
            right,
            top,
        } => array.extend([
            name("FitR"),
            coord(left),
            coord(bottom),
            coord(right),
            coord(top),
        ]),
        ViewPosition::FitB => array.push(name("FitB")),
        ViewPosition::FitBH { top } => array.extend([name("FitBH"), coord(top)]),
        ViewPosition::FitBV { left } => array.extend([name("FitBV"), coord(left)]),
    }
    array
}
