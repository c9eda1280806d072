use std::iter::Peekable;

use serde::Serialize;

use super::{Destination, ExplicitDestination, OutlineNode, ViewPosition};

/// A bookmark addressed against the combined document.
///
/// Entries are produced in pre-order, so a parent always precedes its
/// children and siblings keep their source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    /// Nesting depth, at least 1.
    pub level: i32,
    /// Bookmark text.
    pub title: String,
    /// One-based page number, for display.
    pub page_number: usize,
    /// Zero-based page index in the combined document.
    pub destination_page: usize,
    /// View position carried over from the source destination.
    pub view: ViewPosition,
    /// Zoom carried over from the source destination.
    pub zoom: Option<f32>,
}

impl OutlineEntry {
    /// Create an entry that fits the given zero-based page.
    pub fn new(level: i32, title: impl Into<String>, destination_page: usize) -> Self {
        Self {
            level,
            title: title.into(),
            page_number: destination_page + 1,
            destination_page,
            view: ViewPosition::Fit,
            zoom: None,
        }
    }

    /// Whether this entry can be written into a document of `total_pages`.
    pub fn is_valid(&self, total_pages: usize) -> bool {
        self.level >= 1 && !self.title.trim().is_empty() && self.destination_page < total_pages
    }
}

/// Rebuild a bookmark forest from a flat pre-order entry list.
///
/// Each entry becomes a child of the closest preceding entry with a smaller
/// level. Levels are kept as they are, so feeding the result back through
/// reconciliation with no offset reproduces the same entries.
pub fn entries_to_forest(entries: &[OutlineEntry]) -> Vec<OutlineNode> {
    let mut iter = entries.iter().peekable();
    collect_siblings(&mut iter, i32::MIN)
}

fn collect_siblings<'a, I>(iter: &mut Peekable<I>, parent_level: i32) -> Vec<OutlineNode>
where
    I: Iterator<Item = &'a OutlineEntry>,
{
    let mut nodes = Vec::new();
    while let Some(entry) = iter.next_if(|e| e.level > parent_level) {
        let children = collect_siblings(iter, entry.level);
        let destination = ExplicitDestination {
            page: entry.destination_page as i64,
            view: entry.view,
            zoom: entry.zoom,
        };
        nodes.push(OutlineNode {
            title: entry.title.clone(),
            level: entry.level,
            destination: Some(Destination::Explicit(destination)),
            children,
        });
    }
    nodes
}
