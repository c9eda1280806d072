//! Integration tests for bookmark reconciliation on real files.

use lopdf::{Object, StringFormat};
use tocmerge::merge::{FileOutcome, WrapperPolicy};
use tocmerge::{BookmarkMerger, LopdfBackend, MergeOptions};

use crate::common::{PdfSpec, expected, mark, missing, named, read_outline, top_level_item};

fn merger(wrapper_policy: WrapperPolicy) -> BookmarkMerger<LopdfBackend> {
    BookmarkMerger::with_options(
        LopdfBackend::new(),
        MergeOptions {
            wrapper_policy,
            keep_source_bookmarks: true,
        },
    )
}

#[test]
fn test_nested_outline_moves_under_wrapper() {
    let dir = tempfile::tempdir().unwrap();
    let first = PdfSpec::pages(2).write(dir.path(), "cover.pdf");
    let second = PdfSpec::pages(4)
        .outline(vec![
            mark("Chapter 1", 1).with(vec![mark("1.1", 2), mark("1.2", 3)]),
        ])
        .write(dir.path(), "report.pdf");
    let output = dir.path().join("out.pdf");

    merger(WrapperPolicy::Auto)
        .merge_to_path(&[first, second], &output)
        .unwrap();

    assert_eq!(
        read_outline(&output),
        expected(&[
            (1, "cover", 0),
            (1, "report", 2),
            (2, "Chapter 1", 3),
            (3, "1.1", 4),
            (3, "1.2", 5),
        ])
    );
}

#[test]
fn test_named_destinations_are_resolved_per_file() {
    let dir = tempfile::tempdir().unwrap();
    // Both files use the same name for different pages.
    let a = PdfSpec::pages(3)
        .named("summary", 2)
        .outline(vec![mark("A start", 0), named("A summary", "summary")])
        .write(dir.path(), "a.pdf");
    let b = PdfSpec::pages(5)
        .named("summary", 4)
        .outline(vec![mark("B start", 0), named("B summary", "summary")])
        .write(dir.path(), "b.pdf");
    let output = dir.path().join("out.pdf");

    let (summary, _) = merger(WrapperPolicy::Auto)
        .merge_to_path(&[a, b], &output)
        .unwrap();

    assert_eq!(summary.degraded_count(), 0);
    assert_eq!(
        read_outline(&output),
        expected(&[
            (1, "A start", 0),
            (1, "A summary", 2),
            (1, "B start", 3),
            (1, "B summary", 7),
        ])
    );
}

#[test]
fn test_unusable_bookmarks_degrade_but_pages_merge() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(3)
        .outline(vec![
            mark("Kept", 0),
            missing("No target").with(vec![mark("Lost child", 1)]),
            named("Dangling", "nowhere"),
            mark("Also kept", 2),
        ])
        .write(dir.path(), "messy.pdf");
    let output = dir.path().join("out.pdf");

    let (summary, _) = merger(WrapperPolicy::Auto)
        .merge_to_path(&[input], &output)
        .unwrap();

    assert_eq!(summary.total_pages, 3);
    let FileOutcome::Merged {
        degraded: Some(degraded),
        ..
    } = &summary.files[0].outcome
    else {
        panic!("expected degraded bookmarks");
    };
    assert_eq!(degraded.dropped, 3);
    assert_eq!(
        read_outline(&output),
        expected(&[(1, "Kept", 0), (1, "Also kept", 2)])
    );
}

#[test]
fn test_always_wrap() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2)
        .outline(vec![mark("Title page", 0)])
        .write(dir.path(), "a.pdf");
    let output = dir.path().join("out.pdf");

    merger(WrapperPolicy::Always)
        .merge_to_path(&[a], &output)
        .unwrap();

    assert_eq!(
        read_outline(&output),
        expected(&[(1, "a", 0), (2, "Title page", 0)])
    );
}

#[test]
fn test_never_wrap_keeps_levels() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2).write(dir.path(), "a.pdf");
    let b = PdfSpec::pages(2)
        .outline(vec![mark("Second page", 1).with(vec![mark("Detail", 1)])])
        .write(dir.path(), "b.pdf");
    let output = dir.path().join("out.pdf");

    merger(WrapperPolicy::Never)
        .merge_to_path(&[a, b], &output)
        .unwrap();

    assert_eq!(
        read_outline(&output),
        expected(&[(1, "Second page", 3), (2, "Detail", 3)])
    );
}

#[test]
fn test_source_bookmarks_can_be_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2)
        .outline(vec![mark("Cover", 0), mark("Body", 1)])
        .write(dir.path(), "a.pdf");
    let b = PdfSpec::pages(1).write(dir.path(), "b.pdf");
    let output = dir.path().join("out.pdf");

    let merger = BookmarkMerger::with_options(
        LopdfBackend::new(),
        MergeOptions {
            wrapper_policy: WrapperPolicy::Auto,
            keep_source_bookmarks: false,
        },
    );
    merger.merge_to_path(&[a, b], &output).unwrap();

    assert_eq!(
        read_outline(&output),
        expected(&[(1, "a", 0), (1, "b", 2)])
    );
}

#[test]
fn test_unicode_titles_survive() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(2)
        .outline(vec![mark("Einführung", 0), mark("第二章", 1)])
        .write(dir.path(), "unicode.pdf");
    let output = dir.path().join("out.pdf");

    merger(WrapperPolicy::Auto)
        .merge_to_path(&[input], &output)
        .unwrap();

    assert_eq!(
        read_outline(&output),
        expected(&[(1, "Einführung", 0), (1, "第二章", 1)])
    );
}

#[test]
fn test_merged_output_can_be_merged_again() {
    let dir = tempfile::tempdir().unwrap();
    let a = PdfSpec::pages(2).write(dir.path(), "a.pdf");
    let b = PdfSpec::pages(2)
        .outline(vec![mark("B1", 1)])
        .write(dir.path(), "b.pdf");
    let first_pass = dir.path().join("first.pdf");
    merger(WrapperPolicy::Auto)
        .merge_to_path(&[a, b], &first_pass)
        .unwrap();

    let c = PdfSpec::pages(1).write(dir.path(), "c.pdf");
    let second_pass = dir.path().join("second.pdf");
    merger(WrapperPolicy::Auto)
        .merge_to_path(&[first_pass, c], &second_pass)
        .unwrap();

    // The first pass starts with a page-0 bookmark, so it is not wrapped.
    assert_eq!(
        read_outline(&second_pass),
        expected(&[(1, "a", 0), (1, "b", 2), (2, "B1", 3), (1, "c", 4)])
    );
}

#[test]
fn test_dangling_outline_link_degrades_source() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(2)
        .outline(vec![mark("A", 0), mark("B", 1)])
        .patch(|doc| {
            let last = top_level_item(doc, 1);
            doc.get_dictionary_mut(last)
                .unwrap()
                .set("Next", Object::Reference((9999, 0)));
        })
        .write(dir.path(), "dangling.pdf");
    let output = dir.path().join("out.pdf");

    let (summary, _) = merger(WrapperPolicy::Auto)
        .merge_to_path(&[input], &output)
        .unwrap();

    assert_eq!(summary.degraded_count(), 1);
    assert_eq!(summary.total_pages, 2);
    assert_eq!(
        read_outline(&output),
        expected(&[(1, "A", 0), (1, "B", 1)])
    );
}

#[test]
fn test_pdf_doc_encoded_title_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let input = PdfSpec::pages(1)
        .outline(vec![mark("placeholder", 0)])
        .patch(|doc| {
            let first = top_level_item(doc, 0);
            doc.get_dictionary_mut(first).unwrap().set(
                "Title",
                Object::String(vec![b'A', 0x84, b'B', 0x80], StringFormat::Literal),
            );
        })
        .write(dir.path(), "legacy.pdf");
    let output = dir.path().join("out.pdf");

    merger(WrapperPolicy::Auto)
        .merge_to_path(&[input], &output)
        .unwrap();

    assert_eq!(
        read_outline(&output),
        expected(&[(1, "A\u{2014}B\u{2022}", 0)])
    );
}
