//! PDF merging with bookmark reconciliation.
//!
//! This module concatenates sources and rebuilds one outline for the result:
//! - Source bookmarks are shifted to their pages in the combined document
//! - Sources without a first-page bookmark get a wrapper bookmark
//! - Unusable bookmarks are dropped with their children
//! - Each source gets a status instead of aborting the merge
//!
//! # Examples
//!
//! ```no_run
//! use tocmerge::merge;
//! use tocmerge::config::Config;
//! use std::path::PathBuf;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::new(
//!     vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     PathBuf::from("merged.pdf"),
//! );
//!
//! let (summary, _stats) = merge::merge_pdfs(&config)?;
//! println!("Merged {} pages", summary.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod bookmarks;
mod merger;
pub mod plan;
pub mod report;

pub use bookmarks::{BookmarkManager, WrapperPolicy};
pub use merger::{BookmarkMerger, MergeOptions};
pub use plan::MergePlan;
pub use report::{BookmarksDegraded, FileOutcome, FileStatus, MergeSummary, SkipReason};

use crate::config::Config;
use crate::error::Result;
use crate::io::{LopdfBackend, WriteStatistics};

/// A finished merge run: what happened to each input, and whether the
/// output was written.
#[derive(Debug)]
pub struct MergeRun {
    /// Per-file statuses and the combined outline.
    pub summary: MergeSummary,
    /// Write statistics, `None` for a dry run, or the error that stopped
    /// the output from being written.
    pub written: Result<Option<WriteStatistics>>,
}

impl MergeRun {
    /// Drop the summary when the output could not be written.
    pub fn into_result(self) -> Result<(MergeSummary, Option<WriteStatistics>)> {
        let stats = self.written?;
        Ok((self.summary, stats))
    }
}

/// Merge the configured inputs with the lopdf backend.
///
/// In dry-run mode nothing is written and no statistics are returned.
///
/// # Errors
///
/// Returns an error if nothing could be merged or the output cannot be
/// written. Problems with individual inputs are reported in the summary.
pub fn merge_pdfs(config: &Config) -> Result<(MergeSummary, Option<WriteStatistics>)> {
    run(config).into_result()
}

/// Merge the configured inputs, keeping the per-file summary even when the
/// output cannot be written.
pub fn run(config: &Config) -> MergeRun {
    let backend = LopdfBackend::with_write_options(config.write_options());
    let merger = BookmarkMerger::with_options(backend, config.merge_options());

    if config.dry_run {
        return MergeRun {
            summary: merger.plan(config.inputs()),
            written: Ok(None),
        };
    }

    let (summary, written) = merger.merge_and_write(config.inputs(), &config.output);
    MergeRun {
        summary,
        written: written.map(Some),
    }
}
