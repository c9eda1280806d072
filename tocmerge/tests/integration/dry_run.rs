//! Integration tests for dry-run planning.

use tocmerge::config::Config;
use tocmerge::merge::merge_pdfs;
use tocmerge::{BookmarkMerger, LopdfBackend};

use crate::common::{PdfSpec, mark, write_garbage};

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2).write(dir.path(), "a.pdf");
    let output = dir.path().join("out.pdf");

    let mut config = Config::new(vec![a], output.clone());
    config.dry_run = true;
    let (summary, stats) = merge_pdfs(&config).unwrap();

    assert!(stats.is_none());
    assert_eq!(summary.total_pages, 2);
    assert_eq!(summary.outline.len(), 1);
    assert!(!output.exists());
}

#[test]
fn test_plan_matches_merge() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = vec![
        PdfSpec::pages(3)
            .outline(vec![mark("Cover", 0), mark("Body", 1).with(vec![mark("Part", 2)])])
            .write(dir.path(), "a.pdf"),
        write_garbage(dir.path(), "broken.pdf"),
        PdfSpec::pages(0).write(dir.path(), "empty.pdf"),
        PdfSpec::pages(2)
            .outline(vec![mark("Late", 1)])
            .write(dir.path(), "b.pdf"),
    ];
    let output = dir.path().join("out.pdf");
    let merger = BookmarkMerger::new(LopdfBackend::new());

    let planned = merger.plan(&inputs);
    let (merged, _) = merger.merge_to_path(&inputs, &output).unwrap();

    assert_eq!(planned, merged);
    assert_eq!(planned.page_offsets(), vec![(0, 0), (3, 3)]);
}

#[test]
fn test_dry_run_with_only_broken_inputs_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write_garbage(dir.path(), "broken.pdf");

    let mut config = Config::new(vec![broken], dir.path().join("out.pdf"));
    config.dry_run = true;
    let (summary, _) = merge_pdfs(&config).unwrap();

    assert_eq!(summary.failed_count(), 1);
    assert!(!summary.has_merged_files());
}
