//! Outline (bookmark) model.
//!
//! A source document's outline is read into a forest of [`OutlineNode`]s.
//! Reconciliation flattens that forest into a pre-order list of
//! [`OutlineEntry`] values addressed against the combined document, and the
//! writer turns the flat list back into a tree with [`entries_to_forest`].

mod entry;
mod raw;

pub use entry::{OutlineEntry, entries_to_forest};
pub use raw::{RawOutlineItem, normalize_outline};

use serde::Serialize;

/// How the viewer should position the page when a bookmark is followed.
///
/// Coordinates are in PDF user space. `None` means "keep the current value".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "kind")]
pub enum ViewPosition {
    /// Scroll to a point, optionally changing zoom.
    #[serde(rename = "XYZ")]
    Xyz {
        /// Left edge.
        left: Option<f32>,
        /// Top edge.
        top: Option<f32>,
    },
    /// Fit the whole page in the window.
    #[default]
    Fit,
    /// Fit the page width, scrolled to `top`.
    FitH {
        /// Top edge.
        top: Option<f32>,
    },
    /// Fit the page height, scrolled to `left`.
    FitV {
        /// Left edge.
        left: Option<f32>,
    },
    /// Fit a rectangle in the window.
    FitR {
        /// Left edge.
        left: Option<f32>,
        /// Bottom edge.
        bottom: Option<f32>,
        /// Right edge.
        right: Option<f32>,
        /// Top edge.
        top: Option<f32>,
    },
    /// Fit the page's bounding box.
    FitB,
    /// Fit the bounding box width.
    FitBH {
        /// Top edge.
        top: Option<f32>,
    },
    /// Fit the bounding box height.
    FitBV {
        /// Left edge.
        left: Option<f32>,
    },
}

/// A destination that names its page directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplicitDestination {
    /// Zero-based page index within the owning document. May be negative
    /// when the source is malformed; such destinations are dropped.
    pub page: i64,
    /// View position on the target page.
    pub view: ViewPosition,
    /// Zoom factor, if the destination sets one.
    pub zoom: Option<f32>,
}

impl ExplicitDestination {
    /// Create a destination that fits the given page.
    pub fn page(page: i64) -> Self {
        Self {
            page,
            view: ViewPosition::Fit,
            zoom: None,
        }
    }

    /// Set the view position.
    pub fn with_view(mut self, view: ViewPosition, zoom: Option<f32>) -> Self {
        self.view = view;
        self.zoom = zoom;
        self
    }
}

/// The target of a bookmark.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// Points at a page directly.
    Explicit(ExplicitDestination),
    /// Refers to an entry in the document's named destination table.
    Named(String),
}

/// One bookmark in a source document's outline.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    /// Text shown in the viewer's bookmark panel.
    pub title: String,
    /// Nesting depth, starting at 1 for top-level bookmarks.
    pub level: i32,
    /// Where the bookmark points, if anywhere.
    pub destination: Option<Destination>,
    /// Nested bookmarks, in document order.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a bookmark with no children.
    pub fn new(title: impl Into<String>, level: i32, destination: Option<Destination>) -> Self {
        Self {
            title: title.into(),
            level,
            destination,
            children: Vec::new(),
        }
    }

    /// Create a bookmark pointing at a zero-based page.
    pub fn explicit(title: impl Into<String>, level: i32, page: i64) -> Self {
        Self::new(
            title,
            level,
            Some(Destination::Explicit(ExplicitDestination::page(page))),
        )
    }

    /// Create a bookmark pointing at a named destination.
    pub fn named(title: impl Into<String>, level: i32, name: impl Into<String>) -> Self {
        Self::new(title, level, Some(Destination::Named(name.into())))
    }

    /// Attach children to this bookmark.
    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    /// Whether the title has any non-whitespace text.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Number of bookmarks in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + count_nodes(&self.children)
    }
}

/// Outline as read from one source document.
///
/// `truncated` counts the branches the reader had to abandon: sibling or
/// child links to missing objects, cycles and nesting past the depth limit.
/// Bookmarks behind those links are lost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceOutline {
    /// Top-level bookmarks, in document order.
    pub nodes: Vec<OutlineNode>,
    /// Branches that could not be followed.
    pub truncated: usize,
}

impl SourceOutline {
    /// An outline that was read completely.
    pub fn complete(nodes: Vec<OutlineNode>) -> Self {
        Self {
            nodes,
            truncated: 0,
        }
    }

    /// Whether some bookmarks could not be read.
    pub fn is_truncated(&self) -> bool {
        self.truncated > 0
    }
}

/// Count every bookmark in a forest.
pub fn count_nodes(forest: &[OutlineNode]) -> usize {
    forest.iter().map(OutlineNode::subtree_len).sum()
}
