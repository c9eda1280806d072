//! Running state of a merge: the next page offset, the combined outline and
//! one status per source.

use std::path::Path;

use super::bookmarks::{SourceBookmarks, validate_entries};
use super::report::{BookmarksDegraded, FileOutcome, FileStatus, MergeSummary, SkipReason};
use crate::outline::OutlineEntry;

/// Accumulates sources as they are folded into the output.
///
/// A source's entries are only added once its pages are in, so a failed
/// source never leaves bookmarks behind.
#[derive(Debug, Default)]
pub struct MergePlan {
    page_offset: usize,
    entries: Vec<OutlineEntry>,
    files: Vec<FileStatus>,
}

impl MergePlan {
    /// Start an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Page index the next merged source will start at.
    pub fn page_offset(&self) -> usize {
        self.page_offset
    }

    /// Entries committed so far.
    pub fn entries(&self) -> &[OutlineEntry] {
        &self.entries
    }

    /// Record a merged source and advance the page offset.
    ///
    /// `outline_error` is set when the source outline could not be read at
    /// all; the source then counts as degraded even if nothing was dropped.
    pub fn commit(
        &mut self,
        index: usize,
        path: &Path,
        pages: usize,
        bookmarks: SourceBookmarks,
        outline_error: Option<String>,
    ) {
        let degraded = match outline_error {
            Some(reason) => Some(BookmarksDegraded {
                dropped: bookmarks.dropped,
                reason,
            }),
            None if bookmarks.dropped > 0 => Some(BookmarksDegraded {
                dropped: bookmarks.dropped,
                reason: format!(
                    "{} bookmark(s) had no usable destination",
                    bookmarks.dropped
                ),
            }),
            None => None,
        };

        self.files.push(FileStatus {
            index,
            path: path.to_path_buf(),
            outcome: FileOutcome::Merged {
                page_offset: self.page_offset,
                pages,
                bookmarks: bookmarks.entries.len(),
                wrapped: bookmarks.wrapped,
                degraded,
            },
        });
        self.entries.extend(bookmarks.entries);
        self.page_offset += pages;
    }

    /// Record a skipped source.
    pub fn skip(&mut self, index: usize, path: &Path, reason: SkipReason) {
        self.files.push(FileStatus {
            index,
            path: path.to_path_buf(),
            outcome: FileOutcome::Skipped { reason },
        });
    }

    /// Record a failed source.
    pub fn fail(&mut self, index: usize, path: &Path, reason: impl Into<String>) {
        self.files.push(FileStatus {
            index,
            path: path.to_path_buf(),
            outcome: FileOutcome::Failed {
                reason: reason.into(),
            },
        });
    }

    /// Run the final range check and produce the summary.
    pub fn finish(self) -> MergeSummary {
        let total_pages = self.page_offset;
        let (outline, invalid_entries_removed) = validate_entries(self.entries, total_pages);
        MergeSummary {
            total_pages,
            outline,
            files: self.files,
            invalid_entries_removed,
        }
    }
}
