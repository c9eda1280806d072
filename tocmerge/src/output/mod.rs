//! Output formatting and display for tocmerge.
//!
//! This module handles all user-facing output:
//! - Formatted status messages
//! - One status line per input file
//! - The combined bookmark tree
//! - The JSON report
//!
//! # Examples
//!
//! ```no_run
//! use tocmerge::output::OutputFormatter;
//! use tocmerge::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Starting merge");
//! formatter.success("Merge completed");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use serde_json::{Value, json};

use crate::error::TocMergeError;
use crate::io::WriteStatistics;
use crate::merge::{FileOutcome, FileStatus, MergeSummary};
use crate::outline::OutlineEntry;

/// Render the outline as an indented tree, one entry per line.
///
/// # Examples
///
/// ```
/// use tocmerge::output::render_outline;
/// use tocmerge::outline::OutlineEntry;
///
/// let text = render_outline(&[
///     OutlineEntry::new(1, "report", 0),
///     OutlineEntry::new(2, "Summary", 1),
/// ]);
/// assert_eq!(text, "report (p. 1)\n  Summary (p. 2)");
/// ```
pub fn render_outline(entries: &[OutlineEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let depth = usize::try_from(entry.level.max(1) - 1).unwrap_or(0);
            format!(
                "{}{} (p. {})",
                "  ".repeat(depth),
                entry.title,
                entry.page_number
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Describe what happened to one input.
pub fn describe_status(status: &FileStatus) -> String {
    let path = status.path.display();
    match &status.outcome {
        FileOutcome::Merged {
            page_offset,
            pages,
            bookmarks,
            wrapped,
            degraded,
        } => {
            let mut line = format!(
                "{path}: {pages} page(s) at {}, {bookmarks} bookmark(s)",
                page_offset + 1
            );
            if *wrapped {
                line.push_str(", wrapped");
            }
            if let Some(degraded) = degraded {
                line.push_str(&format!(" (bookmarks degraded: {})", degraded.reason));
            }
            line
        }
        FileOutcome::Skipped { .. } => format!("{path}: skipped, no pages"),
        FileOutcome::Failed { reason } => format!("{path}: failed, {reason}"),
    }
}

/// Display the result of a merge or dry run.
///
/// # Arguments
///
/// * `formatter` - Output formatter to use
/// * `summary` - Merge summary to display
/// * `stats` - Write statistics, absent for a dry run
pub fn display_merge_summary(
    formatter: &OutputFormatter,
    summary: &MergeSummary,
    stats: Option<&WriteStatistics>,
) {
    display_files(formatter, summary);

    if formatter.is_verbose() || stats.is_none() {
        display_outline(formatter, &summary.outline);
    }

    if summary.invalid_entries_removed > 0 {
        formatter.warning(&format!(
            "{} bookmark(s) pointed outside the merged document and were removed",
            summary.invalid_entries_removed
        ));
    }

    let totals = totals_line(summary);

    match stats {
        Some(stats) => {
            formatter.success(&format!(
                "Wrote {} ({} pages, {} bookmarks, {}) in {:.2}s",
                stats.output_path.display(),
                summary.total_pages,
                summary.outline.len(),
                stats.format_file_size(),
                stats.write_time.as_secs_f64()
            ));
            formatter.info(&totals);
        }
        None => {
            formatter.info(&format!(
                "Dry run: {} pages, {} bookmarks would be written",
                summary.total_pages,
                summary.outline.len()
            ));
            formatter.info(&totals);
        }
    }
}

/// Display what happened to each input when no output was written.
pub fn display_failed_merge(formatter: &OutputFormatter, summary: &MergeSummary) {
    display_files(formatter, summary);
    formatter.info(&totals_line(summary));
}

fn display_files(formatter: &OutputFormatter, summary: &MergeSummary) {
    formatter.section("Files:");
    for (i, status) in summary.files.iter().enumerate() {
        let line = describe_status(status);
        match status.outcome {
            FileOutcome::Merged { degraded: None, .. } => formatter.list_item(i + 1, &line),
            _ => formatter.warning(&line),
        }
    }
}

fn totals_line(summary: &MergeSummary) -> String {
    format!(
        "{} merged, {} skipped, {} failed, {} with degraded bookmarks",
        summary.merged_count(),
        summary.skipped_count(),
        summary.failed_count(),
        summary.degraded_count()
    )
}

/// Display the bookmark tree under a section header.
pub fn display_outline(formatter: &OutputFormatter, entries: &[OutlineEntry]) {
    formatter.section("Bookmarks:");
    if entries.is_empty() {
        formatter.info("  (none)");
    } else {
        formatter.lines(&render_outline(entries));
    }
}

/// JSON report of a merge, as printed by `--json`.
pub fn summary_json(summary: &MergeSummary, stats: Option<&WriteStatistics>) -> Value {
    json!({
        "dryRun": stats.is_none(),
        "output": stats.map(|s| s.output_path.display().to_string()),
        "fileSize": stats.map(|s| s.file_size),
        "summary": summary,
    })
}

/// JSON report of a merge whose output was not written.
pub fn failure_json(summary: &MergeSummary, error: &TocMergeError) -> Value {
    json!({
        "dryRun": false,
        "output": Value::Null,
        "error": error.to_string(),
        "exitCode": error.exit_code(),
        "summary": summary,
    })
}
