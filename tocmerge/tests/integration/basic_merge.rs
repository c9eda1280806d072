//! Integration tests for basic PDF merging operations.

use rstest::rstest;
use tocmerge::config::{CompressionLevel, Config};
use tocmerge::merge::merge_pdfs;
use tocmerge::{BookmarkMerger, LopdfBackend};

use crate::common::{PdfSpec, expected, mark, page_count, read_outline};

#[test]
fn test_merge_two_pdfs_without_outlines() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(3).write(dir.path(), "alpha.pdf");
    let b = PdfSpec::pages(2).write(dir.path(), "beta.pdf");
    let output = dir.path().join("merged.pdf");

    let merger = BookmarkMerger::new(LopdfBackend::new());
    let (summary, stats) = merger.merge_to_path(&[a, b], &output).unwrap();

    assert_eq!(summary.total_pages, 5);
    assert_eq!(summary.merged_count(), 2);
    assert!(stats.file_size > 0);
    assert_eq!(page_count(&output), 5);
    assert_eq!(
        read_outline(&output),
        expected(&[(1, "alpha", 0), (1, "beta", 3)])
    );
}

#[test]
fn test_cover_bookmark_suppresses_wrapper() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(3).write(dir.path(), "A.pdf");
    let b = PdfSpec::pages(2)
        .outline(vec![mark("Ch1", 0)])
        .write(dir.path(), "B.pdf");
    let output = dir.path().join("merged.pdf");

    let merger = BookmarkMerger::new(LopdfBackend::new());
    let (summary, _) = merger.merge_to_path(&[a, b], &output).unwrap();

    assert_eq!(summary.total_pages, 5);
    assert_eq!(
        read_outline(&output),
        expected(&[(1, "A", 0), (1, "Ch1", 3)])
    );
}

#[test]
fn test_merge_single_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(4)
        .outline(vec![mark("Start", 0), mark("End", 3)])
        .write(dir.path(), "single.pdf");
    let output = dir.path().join("out.pdf");

    let config = Config::new(vec![input], output.clone());
    let (summary, stats) = merge_pdfs(&config).unwrap();

    assert!(stats.is_some());
    assert_eq!(summary.total_pages, 4);
    assert_eq!(
        read_outline(&output),
        expected(&[(1, "Start", 0), (1, "End", 3)])
    );
}

#[test]
fn test_output_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(1).write(dir.path(), "one.pdf");
    let output = dir.path().join("nested").join("deeper").join("out.pdf");

    let config = Config::new(vec![input], output.clone());
    merge_pdfs(&config).unwrap();

    assert!(output.exists());
    assert!(!dir.path().join("nested/deeper/out.pdf.tmp").exists());
}

#[rstest(
    compression,
    case(CompressionLevel::None),
    case(CompressionLevel::Standard),
    case(CompressionLevel::Maximum)
)]
fn test_compression_levels_produce_readable_output(compression: CompressionLevel) {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2)
        .outline(vec![mark("Intro", 0)])
        .write(dir.path(), "a.pdf");
    let b = PdfSpec::pages(3).write(dir.path(), "b.pdf");
    let output = dir.path().join("out.pdf");

    let mut config = Config::new(vec![a, b], output.clone());
    config.compression = compression;
    let (_, stats) = merge_pdfs(&config).unwrap();

    assert_eq!(stats.map(|s| s.compression), Some(compression));
    assert_eq!(page_count(&output), 5);
    assert_eq!(
        read_outline(&output),
        expected(&[(1, "Intro", 0), (1, "b", 2)])
    );
}

#[test]
fn test_same_file_twice_is_merged_once() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(2).write(dir.path(), "twice.pdf");
    let output = dir.path().join("out.pdf");

    let config = Config::new(vec![input.clone(), input.clone()], output.clone());
    assert_eq!(config.duplicates, vec![input]);

    let (summary, _) = merge_pdfs(&config).unwrap();
    assert_eq!(summary.total_pages, 2);
    assert_eq!(page_count(&output), 2);
}
