//! Per-file outcomes and the merge summary.

use serde::Serialize;
use std::path::PathBuf;

use crate::outline::OutlineEntry;

/// Why a source was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// The source has no pages.
    NoPages,
}

/// Details attached to a source whose pages merged but whose bookmarks
/// could not all be carried over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarksDegraded {
    /// Source bookmarks that were left out.
    pub dropped: usize,
    /// What went wrong.
    pub reason: String,
}

/// What happened to one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum FileOutcome {
    /// Pages were appended to the output.
    #[serde(rename_all = "camelCase")]
    Merged {
        /// Index of the source's first page in the output.
        page_offset: usize,
        /// Number of pages appended.
        pages: usize,
        /// Bookmarks contributed, including any wrapper.
        bookmarks: usize,
        /// Whether a wrapper bookmark was added.
        wrapped: bool,
        /// Set when some or all of the source's bookmarks were lost.
        degraded: Option<BookmarksDegraded>,
    },
    /// The source was left out without an error.
    Skipped {
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// The source could not be opened or its pages could not be copied.
    Failed {
        /// Error message.
        reason: String,
    },
}

/// Outcome for one source, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    /// Position in the input list.
    pub index: usize,
    /// Path as given.
    pub path: PathBuf,
    /// What happened.
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileStatus {
    /// Whether the source's pages are in the output.
    pub fn is_merged(&self) -> bool {
        matches!(self.outcome, FileOutcome::Merged { .. })
    }

    /// Whether the source merged with incomplete bookmarks.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self.outcome,
            FileOutcome::Merged {
                degraded: Some(_),
                ..
            }
        )
    }
}

/// Result of a merge or a dry run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeSummary {
    /// Pages in the combined document.
    pub total_pages: usize,
    /// Combined outline, in pre-order.
    pub outline: Vec<OutlineEntry>,
    /// One status per input.
    pub files: Vec<FileStatus>,
    /// Entries removed by the final range check.
    pub invalid_entries_removed: usize,
}

impl MergeSummary {
    /// Number of sources whose pages were merged.
    pub fn merged_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_merged()).count()
    }

    /// Number of merged sources with incomplete bookmarks.
    pub fn degraded_count(&self) -> usize {
        self.files.iter().filter(|f| f.is_degraded()).count()
    }

    /// Number of skipped sources.
    pub fn skipped_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Skipped { .. }))
            .count()
    }

    /// Number of failed sources.
    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    /// Whether at least one source was merged.
    pub fn has_merged_files(&self) -> bool {
        self.files.iter().any(FileStatus::is_merged)
    }

    /// Page offset of every merged source, as `(input index, offset)`.
    pub fn page_offsets(&self) -> Vec<(usize, usize)> {
        self.files
            .iter()
            .filter_map(|f| match f.outcome {
                FileOutcome::Merged { page_offset, .. } => Some((f.index, page_offset)),
                _ => None,
            })
            .collect()
    }
}
