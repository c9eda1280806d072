//! tocmerge - Concatenate PDF files and reconcile their bookmarks.
//!
//! This library merges PDF files in order and builds a single outline for
//! the result. Every bookmark is re-addressed to its page in the combined
//! document:
//!
//! - Explicit destinations are shifted by the pages merged before them
//! - Named destinations are resolved against their own source
//! - Sources without a bookmark on their first page get a wrapper bookmark
//! - Bookmarks that cannot be placed are dropped with their children
//! - A broken source is reported and skipped, never fatal
//!
//! # Examples
//!
//! ## Basic Merge
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
//! config.validate()?;
//!
//! let (summary, _stats) = merge::merge_pdfs(&config)?;
//! println!("Created {} page document", summary.total_pages);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use tocmerge::{BookmarkMerger, LopdfBackend, MergeOptions};
//! use tocmerge::merge::WrapperPolicy;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = MergeOptions {
//!     wrapper_policy: WrapperPolicy::Always,
//!     keep_source_bookmarks: true,
//! };
//! let merger = BookmarkMerger::with_options(LopdfBackend::new(), options);
//!
//! // Plan first, then write
//! let plan = merger.plan(&["a.pdf", "b.pdf"]);
//! for entry in &plan.outline {
//!     println!("{} -> page {}", entry.title, entry.page_number);
//! }
//! merger.merge_to_path(&["a.pdf", "b.pdf"], Path::new("merged.pdf"))?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod outline;
pub mod output;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TocMergeError};
pub use io::LopdfBackend;
pub use merge::{BookmarkMerger, MergeOptions, MergeSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
