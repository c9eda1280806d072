//! Integration tests for error handling and edge cases.

use std::path::PathBuf;

use tocmerge::config::Config;
use tocmerge::error::TocMergeError;
use tocmerge::merge::{FileOutcome, SkipReason, merge_pdfs};
use tocmerge::{BookmarkMerger, LopdfBackend};

use crate::common::{PdfSpec, expected, mark, read_outline, write_garbage};

#[test]
fn test_missing_input_does_not_shift_later_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2).write(dir.path(), "a.pdf");
    let gone = dir.path().join("gone.pdf");
    let d = PdfSpec::pages(1)
        .outline(vec![mark("D", 0)])
        .write(dir.path(), "d.pdf");
    let output = dir.path().join("out.pdf");

    let merger = BookmarkMerger::new(LopdfBackend::new());
    let (summary, _) = merger.merge_to_path(&[a, gone, d], &output).unwrap();

    assert_eq!(summary.total_pages, 3);
    assert!(matches!(
        summary.files[1].outcome,
        FileOutcome::Failed { .. }
    ));
    assert_eq!(summary.page_offsets(), vec![(0, 0), (2, 2)]);
    assert_eq!(read_outline(&output), expected(&[(1, "a", 0), (1, "D", 2)]));
}

#[test]
fn test_corrupt_input_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_garbage(dir.path(), "broken.pdf");
    let good = PdfSpec::pages(1).write(dir.path(), "good.pdf");
    let output = dir.path().join("out.pdf");

    let config = Config::new(vec![broken, good], output);
    let (summary, _) = merge_pdfs(&config).unwrap();

    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.merged_count(), 1);
}

#[test]
fn test_empty_pdf_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let empty = PdfSpec::pages(0).write(dir.path(), "empty.pdf");
    let good = PdfSpec::pages(2).write(dir.path(), "good.pdf");
    let output = dir.path().join("out.pdf");

    let config = Config::new(vec![empty, good], output.clone());
    let (summary, _) = merge_pdfs(&config).unwrap();

    assert_eq!(
        summary.files[0].outcome,
        FileOutcome::Skipped {
            reason: SkipReason::NoPages
        }
    );
    assert_eq!(read_outline(&output), expected(&[(1, "good", 0)]));
}

#[test]
fn test_nothing_merged_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let empty = PdfSpec::pages(0).write(dir.path(), "empty.pdf");
    let output = dir.path().join("out.pdf");

    let config = Config::new(vec![empty, dir.path().join("missing.pdf")], output.clone());
    let err = merge_pdfs(&config).unwrap_err();

    assert!(matches!(
        err,
        TocMergeError::NoFilesMerged {
            skipped: 1,
            failed: 1
        }
    ));
    assert_eq!(err.exit_code(), 6);
    assert!(!output.exists());
}

#[test]
fn test_write_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(1).write(dir.path(), "in.pdf");
    // A directory where the output file should go.
    let output = dir.path().join("taken.pdf");
    std::fs::create_dir(&output).unwrap();

    let config = Config::new(vec![input], output.clone());
    let err = merge_pdfs(&config).unwrap_err();

    assert!(err.is_fatal());
    assert!(!dir.path().join("taken.pdf.tmp").exists());
}

#[test]
fn test_empty_input_list() {
    let config = Config::new(Vec::new(), PathBuf::from("out.pdf"));
    assert!(config.validate().is_err());

    let merger = BookmarkMerger::new(LopdfBackend::new());
    let sources: Vec<PathBuf> = Vec::new();
    let err = merger
        .merge_to_path(&sources, &PathBuf::from("out.pdf"))
        .unwrap_err();
    assert!(matches!(err, TocMergeError::NoFilesToMerge));
}

#[test]
fn test_output_cannot_be_an_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(1).write(dir.path(), "in.pdf");

    let config = Config::new(vec![input.clone()], input);
    assert!(config.validate().is_err());
}
