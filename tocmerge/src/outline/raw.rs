use super::{Destination, OutlineNode};

/// Outline data in the shape some PDF libraries hand back: a flat list in
/// which a nested list holds the children of the node just before it.
///
/// A nested list with no preceding node is spliced into the current level.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutlineItem {
    /// A single bookmark, possibly with children of its own.
    Node {
        /// Bookmark text.
        title: String,
        /// Bookmark target.
        destination: Option<Destination>,
        /// Children stored directly on the node.
        children: Vec<RawOutlineItem>,
    },
    /// A nested list.
    List(Vec<RawOutlineItem>),
}

impl RawOutlineItem {
    /// Create a node with no children.
    pub fn node(title: impl Into<String>, destination: Option<Destination>) -> Self {
        Self::Node {
            title: title.into(),
            destination,
            children: Vec::new(),
        }
    }
}

/// Convert the nested-list shape into a bookmark forest with levels set.
pub fn normalize_outline(items: Vec<RawOutlineItem>) -> Vec<OutlineNode> {
    normalize_level(items, 1)
}

fn normalize_level(items: Vec<RawOutlineItem>, level: i32) -> Vec<OutlineNode> {
    let mut nodes: Vec<OutlineNode> = Vec::new();
    for item in items {
        match item {
            RawOutlineItem::Node {
                title,
                destination,
                children,
            } => nodes.push(OutlineNode {
                title,
                level,
                destination,
                children: normalize_level(children, level + 1),
            }),
            RawOutlineItem::List(list) => match nodes.last_mut() {
                Some(parent) => parent.children.extend(normalize_level(list, level + 1)),
                None => nodes.extend(normalize_level(list, level)),
            },
        }
    }
    nodes
}
