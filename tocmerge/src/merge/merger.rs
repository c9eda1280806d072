//! Merge orchestration.
//!
//! [`BookmarkMerger`] walks the inputs in order. Each source is opened,
//! its bookmarks are reconciled against the current page offset, its pages
//! are appended, and only then are its bookmarks committed. A source that
//! cannot be opened or copied is recorded as failed and the merge moves on;
//! only writing the output can fail the whole run.

use std::path::Path;

use super::bookmarks::{BookmarkManager, WrapperPolicy};
use super::plan::MergePlan;
use super::report::{MergeSummary, SkipReason};
use crate::error::{Result, TocMergeError};
use crate::io::{OutputDocument, PdfBackend, SourceDocument, WriteStatistics};
use crate::utils::display_name;

/// Options for a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// When to add a wrapper bookmark per source.
    pub wrapper_policy: WrapperPolicy,
    /// Carry source bookmarks into the output.
    pub keep_source_bookmarks: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            wrapper_policy: WrapperPolicy::Auto,
            keep_source_bookmarks: true,
        }
    }
}

/// Concatenates PDFs and builds one outline from their bookmarks.
#[derive(Debug, Clone)]
pub struct BookmarkMerger<B> {
    backend: B,
    bookmarks: BookmarkManager,
}

impl<B: PdfBackend> BookmarkMerger<B> {
    /// Create a merger with default options.
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, MergeOptions::default())
    }

    /// Create a merger with custom options.
    pub fn with_options(backend: B, options: MergeOptions) -> Self {
        Self {
            backend,
            bookmarks: BookmarkManager::with_policy(
                options.wrapper_policy,
                options.keep_source_bookmarks,
            ),
        }
    }

    /// The backend used to open sources.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fold every source into `output`, in order.
    ///
    /// The outline is returned in the summary and is not written to
    /// `output`; see [`BookmarkMerger::merge_to_path`].
    pub fn merge<P: AsRef<Path>>(&self, sources: &[P], output: &mut B::Output) -> MergeSummary {
        let mut plan = MergePlan::new();
        for (index, path) in sources.iter().enumerate() {
            self.fold_source(&mut plan, index, path.as_ref(), Some(&mut *output));
        }
        finish(plan)
    }

    /// Work out the merge without copying any pages.
    ///
    /// Every source is still opened and its outline read, so the summary
    /// matches what [`BookmarkMerger::merge`] would produce.
    pub fn plan<P: AsRef<Path>>(&self, sources: &[P]) -> MergeSummary {
        let mut plan = MergePlan::new();
        for (index, path) in sources.iter().enumerate() {
            self.fold_source(&mut plan, index, path.as_ref(), None);
        }
        finish(plan)
    }

    /// Merge the sources and write the result to `output_path`.
    ///
    /// # Arguments
    ///
    /// * `sources` - Input PDFs in merge order
    /// * `output_path` - Where to write the combined PDF
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `sources` is empty
    /// - No source could be merged (nothing is written)
    /// - The outline or the file cannot be written
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use tocmerge::{BookmarkMerger, LopdfBackend};
    /// # use std::path::Path;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let merger = BookmarkMerger::new(LopdfBackend::new());
    /// let (summary, stats) = merger.merge_to_path(&["a.pdf", "b.pdf"], Path::new("out.pdf"))?;
    /// println!("{} pages, {} bookmarks, {}",
    ///          summary.total_pages,
    ///          summary.outline.len(),
    ///          stats.format_file_size());
    /// # Ok(())
    /// # }
    /// ```
    pub fn merge_to_path<P: AsRef<Path>>(
        &self,
        sources: &[P],
        output_path: &Path,
    ) -> Result<(MergeSummary, WriteStatistics)> {
        let (summary, written) = self.merge_and_write(sources, output_path);
        written.map(|stats| (summary, stats))
    }

    /// Like [`BookmarkMerger::merge_to_path`], but the summary is returned
    /// even when nothing could be written.
    pub fn merge_and_write<P: AsRef<Path>>(
        &self,
        sources: &[P],
        output_path: &Path,
    ) -> (MergeSummary, Result<WriteStatistics>) {
        let mut output = self.backend.create_output();
        let summary = self.merge(sources, &mut output);

        if sources.is_empty() {
            return (summary, Err(TocMergeError::NoFilesToMerge));
        }
        if !summary.has_merged_files() {
            let err = TocMergeError::NoFilesMerged {
                skipped: summary.skipped_count(),
                failed: summary.failed_count(),
            };
            return (summary, Err(err));
        }

        let written = output
            .set_outline(&summary.outline)
            .and_then(|()| output.save(output_path));
        (summary, written)
    }

    fn fold_source(
        &self,
        plan: &mut MergePlan,
        index: usize,
        path: &Path,
        output: Option<&mut B::Output>,
    ) {
        let source = match self.backend.open(path) {
            Ok(source) => source,
            Err(err) => {
                log::warn!("Skipping {}: {err}", path.display());
                plan.fail(index, path, err.to_string());
                return;
            }
        };

        let page_count = source.page_count();
        if page_count == 0 {
            log::warn!("Skipping {}: no pages", path.display());
            plan.skip(index, path, SkipReason::NoPages);
            return;
        }

        let page_offset = plan.page_offset();
        let (outline, outline_error) = if self.bookmarks.keeps_source_bookmarks() {
            match source.outline() {
                Ok(outline) if outline.is_truncated() => {
                    log::warn!(
                        "Bookmarks of {} are incomplete: {} branch(es) could not be read",
                        path.display(),
                        outline.truncated
                    );
                    let reason = format!(
                        "{} outline branch(es) could not be read",
                        outline.truncated
                    );
                    (outline.nodes, Some(reason))
                }
                Ok(outline) => (outline.nodes, None),
                Err(err) => {
                    log::warn!("Bookmarks of {} are unreadable: {err}", path.display());
                    (Vec::new(), Some(err.to_string()))
                }
            }
        } else {
            (Vec::new(), None)
        };

        let bookmarks = self.bookmarks.source_bookmarks(
            &display_name(path),
            &outline,
            page_offset,
            page_count,
            |name| source.resolve_named_destination(name),
        );

        if let Some(output) = output
            && let Err(err) = output.concatenate_pages(&source, 0, page_count - 1, page_offset)
        {
            log::warn!("Could not copy pages of {}: {err}", path.display());
            plan.fail(index, path, err.to_string());
            return;
        }

        log::debug!(
            "Folded {} ({page_count} pages) at offset {page_offset}, {} bookmark(s){}",
            path.display(),
            bookmarks.entries.len(),
            if bookmarks.wrapped { ", wrapped" } else { "" }
        );
        plan.commit(index, path, page_count, bookmarks, outline_error);
    }
}

fn finish(plan: MergePlan) -> MergeSummary {
    let summary = plan.finish();
    log::info!(
        "Merged {} of {} file(s): {} pages, {} bookmarks",
        summary.merged_count(),
        summary.files.len(),
        summary.total_pages,
        summary.outline.len()
    );
    summary
}
