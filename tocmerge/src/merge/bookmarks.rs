//! Bookmark reconciliation.
//!
//! Every source's outline is re-addressed against the combined document:
//! destinations are resolved to a page, shifted by the page offset at which
//! the source was inserted and optionally nested one level deeper under a
//! wrapper bookmark named after the file.
//!
//! A source gets no wrapper when its own outline already has a bookmark on
//! its first page. Otherwise a level-1 bookmark titled with the file name is
//! added at the source's first page and the source outline goes under it.

use std::str::FromStr;

use crate::error::TocMergeError;
use crate::outline::{Destination, ExplicitDestination, OutlineEntry, OutlineNode, ViewPosition};

/// When a source's bookmarks are nested under a wrapper bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapperPolicy {
    /// Wrap unless the source already has a bookmark on its first page.
    #[default]
    Auto,
    /// Always add a wrapper bookmark.
    Always,
    /// Never add a wrapper bookmark.
    Never,
}

impl FromStr for WrapperPolicy {
    type Err = TocMergeError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(TocMergeError::InvalidConfig {
                message: format!("Invalid wrap mode: {s}. Must be one of: auto, always, never"),
            }),
        }
    }
}

/// How a source outline is moved into the combined document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// Added to every resolved page.
    pub page_offset: usize,
    /// Added to every level.
    pub level_increase: i32,
    /// Page count of the source; destinations at or past it are dropped.
    pub page_count: Option<usize>,
}

impl Shift {
    /// A shift by `page_offset` pages and `level_increase` levels.
    pub fn new(page_offset: usize, level_increase: i32) -> Self {
        Self {
            page_offset,
            level_increase,
            page_count: None,
        }
    }

    /// No offset, no extra nesting and no page limit.
    pub fn identity() -> Self {
        Self::new(0, 0)
    }

    /// Drop destinations that do not fall inside a `page_count` page source.
    pub fn within(mut self, page_count: usize) -> Self {
        self.page_count = Some(page_count);
        self
    }
}

/// Entries produced from one outline and how many bookmarks were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftedOutline {
    /// Kept bookmarks in pre-order.
    pub entries: Vec<OutlineEntry>,
    /// Bookmarks dropped, counting every descendant of a dropped bookmark.
    pub dropped: usize,
}

/// Flatten an outline into entries addressed against the combined document.
///
/// A bookmark is dropped, together with its whole subtree, when its title
/// is blank, when it has no destination, when a named destination does not
/// resolve, or when the resolved page is negative or past `shift.page_count`.
/// Levels become `max(1, level + shift.level_increase)`.
///
/// # Arguments
///
/// * `nodes` - Source outline forest
/// * `shift` - Page offset, level increase and page limit
/// * `resolve` - Looks up named destinations in the source
///
/// # Examples
///
/// ```
/// use tocmerge::merge::bookmarks::{Shift, no_named_destinations, shift_outline};
/// use tocmerge::outline::OutlineNode;
///
/// let outline = vec![OutlineNode::explicit("Intro", 1, 0)];
/// let shifted = shift_outline(&outline, Shift::new(10, 1), no_named_destinations);
/// assert_eq!(shifted.entries[0].destination_page, 10);
/// assert_eq!(shifted.entries[0].level, 2);
/// ```
pub fn shift_outline<R>(nodes: &[OutlineNode], shift: Shift, resolve: R) -> ShiftedOutline
where
    R: Fn(&str) -> Option<ExplicitDestination>,
{
    let mut shifted = ShiftedOutline::default();
    shift_nodes(nodes, shift, &resolve, &mut shifted);
    shifted
}

fn shift_nodes<R>(nodes: &[OutlineNode], shift: Shift, resolve: &R, out: &mut ShiftedOutline)
where
    R: Fn(&str) -> Option<ExplicitDestination>,
{
    for node in nodes {
        match shift_node(node, shift, resolve) {
            Some(entry) => {
                out.entries.push(entry);
                shift_nodes(&node.children, shift, resolve, out);
            }
            None => {
                let dropped = node.subtree_len();
                log::debug!(
                    "Dropping bookmark '{}' and {} descendant(s)",
                    node.title.trim(),
                    dropped - 1
                );
                out.dropped += dropped;
            }
        }
    }
}

fn shift_node<R>(node: &OutlineNode, shift: Shift, resolve: &R) -> Option<OutlineEntry>
where
    R: Fn(&str) -> Option<ExplicitDestination>,
{
    if !node.has_title() {
        return None;
    }

    let target = match node.destination.as_ref()? {
        Destination::Explicit(dest) => *dest,
        Destination::Named(name) => resolve(name)?,
    };

    let local_page = usize::try_from(target.page).ok()?;
    if let Some(limit) = shift.page_count
        && local_page >= limit
    {
        return None;
    }
    let destination_page = local_page.checked_add(shift.page_offset)?;

    Some(OutlineEntry {
        level: node.level.saturating_add(shift.level_increase).max(1),
        title: node.title.clone(),
        page_number: destination_page + 1,
        destination_page,
        view: target.view,
        zoom: target.zoom,
    })
}

/// Resolver for documents without named destinations.
pub fn no_named_destinations(_name: &str) -> Option<ExplicitDestination> {
    None
}

/// Whether the outline has a bookmark that resolves to the document's
/// first page.
pub fn has_first_page_bookmark<R>(nodes: &[OutlineNode], page_count: usize, resolve: R) -> bool
where
    R: Fn(&str) -> Option<ExplicitDestination>,
{
    shift_outline(nodes, Shift::identity().within(page_count), resolve)
        .entries
        .iter()
        .any(|entry| entry.destination_page == 0)
}

/// The level-1 bookmark that introduces a source in the combined outline.
pub fn wrapper_entry(title: &str, page_offset: usize) -> OutlineEntry {
    OutlineEntry {
        level: 1,
        title: title.to_string(),
        page_number: page_offset + 1,
        destination_page: page_offset,
        view: ViewPosition::Fit,
        zoom: None,
    }
}

/// Keep only entries that can be written into a `total_pages` document.
///
/// Returns the kept entries and the number removed.
pub fn validate_entries(
    entries: Vec<OutlineEntry>,
    total_pages: usize,
) -> (Vec<OutlineEntry>, usize) {
    let before = entries.len();
    let kept: Vec<OutlineEntry> = entries
        .into_iter()
        .filter(|entry| {
            let valid = entry.is_valid(total_pages);
            if !valid {
                log::warn!(
                    "Removing bookmark '{}' pointing at page {} of {}",
                    entry.title,
                    entry.page_number,
                    total_pages
                );
            }
            valid
        })
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Bookmarks produced for one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBookmarks {
    /// Entries for the combined outline, in pre-order.
    pub entries: Vec<OutlineEntry>,
    /// Whether a wrapper bookmark was added.
    pub wrapped: bool,
    /// Source bookmarks that could not be carried over.
    pub dropped: usize,
}

/// Builds each source's share of the combined outline.
#[derive(Debug, Clone, Default)]
pub struct BookmarkManager {
    policy: WrapperPolicy,
    keep_source_bookmarks: bool,
}

impl BookmarkManager {
    /// Create a manager that wraps as needed and keeps source bookmarks.
    pub fn new() -> Self {
        Self::with_policy(WrapperPolicy::Auto, true)
    }

    /// Create a manager with an explicit wrapper policy.
    pub fn with_policy(policy: WrapperPolicy, keep_source_bookmarks: bool) -> Self {
        Self {
            policy,
            keep_source_bookmarks,
        }
    }

    /// Whether source outlines are carried into the output.
    pub fn keeps_source_bookmarks(&self) -> bool {
        self.keep_source_bookmarks
    }

    /// Build the entries for a source inserted at `page_offset`.
    ///
    /// # Arguments
    ///
    /// * `title` - Wrapper bookmark title, normally the file name
    /// * `outline` - The source's outline forest
    /// * `page_offset` - Page index of the source's first page in the output
    /// * `page_count` - Number of pages in the source
    /// * `resolve` - Looks up named destinations in the source
    pub fn source_bookmarks<R>(
        &self,
        title: &str,
        outline: &[OutlineNode],
        page_offset: usize,
        page_count: usize,
        resolve: R,
    ) -> SourceBookmarks
    where
        R: Fn(&str) -> Option<ExplicitDestination>,
    {
        let outline: &[OutlineNode] = if self.keep_source_bookmarks {
            outline
        } else {
            &[]
        };

        let flat = shift_outline(outline, Shift::new(page_offset, 0).within(page_count), &resolve);
        let wrapped = match self.policy {
            WrapperPolicy::Always => true,
            WrapperPolicy::Never => false,
            WrapperPolicy::Auto => !flat
                .entries
                .iter()
                .any(|entry| entry.destination_page == page_offset),
        };

        if !wrapped {
            return SourceBookmarks {
                entries: flat.entries,
                wrapped,
                dropped: flat.dropped,
            };
        }

        let nested = shift_outline(outline, Shift::new(page_offset, 1).within(page_count), &resolve);
        let mut entries = Vec::with_capacity(nested.entries.len() + 1);
        entries.push(wrapper_entry(title, page_offset));
        entries.extend(nested.entries);

        SourceBookmarks {
            entries,
            wrapped,
            dropped: nested.dropped,
        }
    }
}
