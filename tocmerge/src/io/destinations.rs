//! Outline and named destination lookup for `lopdf` documents.

use lopdf::{Dictionary, Document, Object, ObjectId, decode_text_string};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::{Result, TocMergeError};
use crate::outline::{
    Destination, ExplicitDestination, OutlineNode, SourceOutline, ViewPosition,
};

const MAX_OUTLINE_DEPTH: i32 = 64;
const MAX_NAME_TREE_DEPTH: usize = 32;
const MAX_REFERENCE_CHAIN: usize = 16;

/// Reads bookmarks and named destinations out of one document.
pub(crate) struct OutlineReader<'a> {
    doc: &'a Document,
    pages: &'a HashMap<ObjectId, usize>,
    path: &'a Path,
}

impl<'a> OutlineReader<'a> {
    pub(crate) fn new(
        doc: &'a Document,
        pages: &'a HashMap<ObjectId, usize>,
        path: &'a Path,
    ) -> Self {
        Self { doc, pages, path }
    }

    /// Walk `/Outlines` into a forest. A missing outline is an empty forest.
    ///
    /// Broken links inside the tree do not fail the read; they are counted
    /// in [`SourceOutline::truncated`].
    pub(crate) fn read(&self) -> Result<SourceOutline> {
        let catalog = self
            .doc
            .catalog()
            .map_err(|e| self.unreadable(format!("no document catalog: {e}")))?;

        let Ok(outlines) = catalog.get(b"Outlines") else {
            return Ok(SourceOutline::default());
        };
        let outlines = match self.resolve(outlines) {
            Some(Object::Dictionary(dict)) => dict,
            Some(Object::Null) | None => return Ok(SourceOutline::default()),
            Some(_) => return Err(self.unreadable("/Outlines is not a dictionary")),
        };

        let first = match outlines.get(b"First") {
            Ok(Object::Reference(id)) => *id,
            Ok(_) => return Err(self.unreadable("/Outlines /First is not a reference")),
            Err(_) => return Ok(SourceOutline::default()),
        };

        let mut walk = Walk::default();
        let nodes = self.walk(first, 1, &mut walk);
        if walk.truncated > 0 {
            log::warn!(
                "{}: {} outline branch(es) could not be followed",
                self.path.display(),
                walk.truncated
            );
        }
        Ok(SourceOutline {
            nodes,
            truncated: walk.truncated,
        })
    }

    /// Look up a named destination in the `/Names /Dests` tree, then in the
    /// legacy `/Dests` dictionary.
    pub(crate) fn resolve_named(&self, name: &str) -> Option<ExplicitDestination> {
        let catalog = self.doc.catalog().ok()?;

        if let Some(names) = self.dict_entry(catalog, b"Names")
            && let Some(tree) = self.dict_entry(names, b"Dests")
            && let Some(value) = self.lookup_name_tree(tree, name, 0)
            && let Some(dest) = self.destination_value(value)
        {
            return Some(dest);
        }

        let dests = self.dict_entry(catalog, b"Dests")?;
        let value = dests.get(name.as_bytes()).ok()?;
        self.destination_value(value)
    }

    fn walk(&self, first: ObjectId, level: i32, walk: &mut Walk) -> Vec<OutlineNode> {
        if level > MAX_OUTLINE_DEPTH {
            log::warn!(
                "{}: outline nested deeper than {MAX_OUTLINE_DEPTH} levels, ignoring the rest",
                self.path.display()
            );
            walk.truncated += 1;
            return Vec::new();
        }

        let mut nodes = Vec::new();
        let mut current = Some(first);
        while let Some(id) = current {
            if !walk.visited.insert(id) {
                log::warn!(
                    "{}: outline item {} {} R is linked twice, stopping this branch",
                    self.path.display(),
                    id.0,
                    id.1
                );
                walk.truncated += 1;
                break;
            }
            let Ok(item) = self.doc.get_dictionary(id) else {
                log::warn!(
                    "{}: outline item {} {} R is missing or not a dictionary",
                    self.path.display(),
                    id.0,
                    id.1
                );
                walk.truncated += 1;
                break;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|t| self.resolve(t))
                .and_then(|t| decode_text_string(t).ok())
                .unwrap_or_default();
            let children = match self.link(item, b"First", walk) {
                Some(child) => self.walk(child, level + 1, walk),
                None => Vec::new(),
            };

            nodes.push(OutlineNode {
                title,
                level,
                destination: self.item_destination(item),
                children,
            });

            current = self.link(item, b"Next", walk);
        }
        nodes
    }

    /// Follow a `/First` or `/Next` link. A link that is present but not a
    /// reference counts as a truncated branch.
    fn link(&self, item: &Dictionary, key: &[u8], walk: &mut Walk) -> Option<ObjectId> {
        match item.get(key) {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Null) | Err(_) => None,
            Ok(_) => {
                log::warn!(
                    "{}: outline /{} is not a reference",
                    self.path.display(),
                    String::from_utf8_lossy(key)
                );
                walk.truncated += 1;
                None
            }
        }
    }

    /// Destination of an outline item, from `/Dest` or a GoTo action.
    fn item_destination(&self, item: &'a Dictionary) -> Option<Destination> {
        if let Ok(dest) = item.get(b"Dest") {
            return self.parse_destination(dest, 0);
        }

        let action = self.dict_entry(item, b"A")?;
        match action.get(b"S") {
            Ok(Object::Name(kind)) if kind == b"GoTo" => {
                self.parse_destination(action.get(b"D").ok()?, 0)
            }
            _ => None,
        }
    }

    fn parse_destination(&self, obj: &'a Object, depth: usize) -> Option<Destination> {
        if depth > MAX_REFERENCE_CHAIN {
            return None;
        }
        match self.resolve(obj)? {
            Object::Array(items) => self.explicit_from_array(items).map(Destination::Explicit),
            Object::Name(name) => Some(Destination::Named(
                String::from_utf8_lossy(name).into_owned(),
            )),
            named @ Object::String(..) => decode_text_string(named).ok().map(Destination::Named),
            Object::Dictionary(dict) => self.parse_destination(dict.get(b"D").ok()?, depth + 1),
            _ => None,
        }
    }

    /// Value stored for a named destination: an array or a dictionary
    /// whose `/D` is an array.
    fn destination_value(&self, value: &'a Object) -> Option<ExplicitDestination> {
        match self.resolve(value)? {
            Object::Array(items) => self.explicit_from_array(items),
            Object::Dictionary(dict) => match self.resolve(dict.get(b"D").ok()?)? {
                Object::Array(items) => self.explicit_from_array(items),
                _ => None,
            },
            _ => None,
        }
    }

    fn explicit_from_array(&self, items: &[Object]) -> Option<ExplicitDestination> {
        let (target, view) = items.split_first()?;
        let page = match target {
            Object::Reference(id) => *self.pages.get(id)? as i64,
            // Remote-style destinations carry a page index
            Object::Integer(index) => *index,
            _ => return None,
        };
        let (view, zoom) = parse_view(view);
        Some(ExplicitDestination { page, view, zoom })
    }

    fn lookup_name_tree(
        &self,
        node: &'a Dictionary,
        name: &str,
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_NAME_TREE_DEPTH {
            return None;
        }

        if let Some(Object::Array(pairs)) = node.get(b"Names").ok().and_then(|n| self.resolve(n)) {
            for pair in pairs.chunks(2) {
                if let [key, value] = pair
                    && let Some(key) = self.resolve(key)
                    && decode_text_string(key).is_ok_and(|key| key == name)
                {
                    return Some(value);
                }
            }
        }

        let Some(Object::Array(kids)) = node.get(b"Kids").ok().and_then(|k| self.resolve(k)) else {
            return None;
        };
        kids.iter()
            .filter_map(|kid| match self.resolve(kid) {
                Some(Object::Dictionary(dict)) => Some(dict),
                _ => None,
            })
            .find_map(|kid| self.lookup_name_tree(kid, name, depth + 1))
    }

    fn dict_entry(&self, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
        match self.resolve(dict.get(key).ok()?)? {
            Object::Dictionary(inner) => Some(inner),
            _ => None,
        }
    }

    /// Follow references until a direct object is reached.
    fn resolve(&self, obj: &'a Object) -> Option<&'a Object> {
        let mut current = obj;
        for _ in 0..MAX_REFERENCE_CHAIN {
            match current {
                Object::Reference(id) => current = self.doc.get_object(*id).ok()?,
                direct => return Some(direct),
            }
        }
        None
    }

    fn unreadable(&self, reason: impl Into<String>) -> TocMergeError {
        TocMergeError::outline_unreadable(self.path.to_path_buf(), reason)
    }
}

/// Traversal state shared across one outline read.
#[derive(Default)]
struct Walk {
    visited: HashSet<ObjectId>,
    truncated: usize,
}

/// Parse the view part of a destination array (everything after the page).
fn parse_view(params: &[Object]) -> (ViewPosition, Option<f32>) {
    let Some(Object::Name(kind)) = params.first() else {
        return (ViewPosition::Fit, None);
    };
    let num = |index: usize| params.get(index).and_then(number);

    match kind.as_slice() {
        b"XYZ" => (
            ViewPosition::Xyz {
                left: num(1),
                top: num(2),
            },
            num(3).filter(|zoom| *zoom > 0.0),
        ),
        b"FitH" => (ViewPosition::FitH { top: num(1) }, None),
        b"FitV" => (ViewPosition::FitV { left: num(1) }, None),
        b"FitR" => (
            ViewPosition::FitR {
                left: num(1),
                bottom: num(2),
                right: num(3),
                top: num(4),
            },
            None,
        ),
        b"FitB" => (ViewPosition::FitB, None),
        b"FitBH" => (ViewPosition::FitBH { top: num(1) }, None),
        b"FitBV" => (ViewPosition::FitBV { left: num(1) }, None),
        _ => (ViewPosition::Fit, None),
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
