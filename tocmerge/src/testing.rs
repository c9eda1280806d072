//! Builders for small PDFs used by unit tests.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::path::Path;

use crate::error::Result;

pub(crate) enum TestTarget {
    Page(usize),
    Index(i64),
    Named(String),
    Nothing,
}

pub(crate) struct TestBookmark {
    title: String,
    target: TestTarget,
    children: Vec<TestBookmark>,
}

impl TestBookmark {
    pub(crate) fn page(title: &str, page: usize) -> Self {
        Self::new(title, TestTarget::Page(page))
    }

    pub(crate) fn index(title: &str, index: i64) -> Self {
        Self::new(title, TestTarget::Index(index))
    }

    pub(crate) fn named(title: &str, name: &str) -> Self {
        Self::new(title, TestTarget::Named(name.to_string()))
    }

    pub(crate) fn untargeted(title: &str) -> Self {
        Self::new(title, TestTarget::Nothing)
    }

    pub(crate) fn child(mut self, child: TestBookmark) -> Self {
        self.children.push(child);
        self
    }

    fn new(title: &str, target: TestTarget) -> Self {
        Self {
            title: title.to_string(),
            target,
            children: Vec::new(),
        }
    }
}

/// A PDF with `pages` blank-ish pages, an optional outline and optional
/// named destinations. Page size and resources live on the page tree root
/// so they have to be inherited.
pub(crate) struct TestPdf {
    pages: usize,
    bookmarks: Vec<TestBookmark>,
    named: Vec<(String, usize)>,
    legacy_dests: bool,
}

impl TestPdf {
    pub(crate) fn new(pages: usize) -> Self {
        Self {
            pages,
            bookmarks: Vec::new(),
            named: Vec::new(),
            legacy_dests: false,
        }
    }

    pub(crate) fn bookmark(mut self, bookmark: TestBookmark) -> Self {
        self.bookmarks.push(bookmark);
        self
    }

    pub(crate) fn named_destination(mut self, name: &str, page: usize) -> Self {
        self.named.push((name.to_string(), page));
        self
    }

    /// Store named destinations in the catalog `/Dests` dictionary instead
    /// of the `/Names` tree.
    pub(crate) fn legacy_dests(mut self) -> Self {
        self.legacy_dests = true;
        self
    }

    pub(crate) fn build(&self) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut page_ids = Vec::with_capacity(self.pages);
        for index in 0..self.pages {
            let content = format!("BT /F1 24 Tf 72 720 Td (Page {}) Tj ET", index + 1);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => page_ids.iter().map(|&id| Object::Reference(id)).collect::<Vec<_>>(),
                "Count" => self.pages as i64,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ],
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };

        if !self.bookmarks.is_empty() {
            let outlines_id = doc.new_object_id();
            if let Some((first, last)) =
                add_bookmarks(&mut doc, &self.bookmarks, outlines_id, &page_ids)
            {
                doc.objects.insert(
                    outlines_id,
                    Object::Dictionary(dictionary! {
                        "Type" => "Outlines",
                        "First" => first,
                        "Last" => last,
                        "Count" => self.bookmarks.len() as i64,
                    }),
                );
                catalog.set("Outlines", outlines_id);
            }
        }

        if !self.named.is_empty() {
            let mut named = self.named.clone();
            named.sort();
            if self.legacy_dests {
                let mut dests = Dictionary::new();
                for (name, page) in &named {
                    dests.set(name.as_str(), xyz_destination(page_ids[*page]));
                }
                catalog.set("Dests", dests);
            } else {
                let mut pairs = Vec::new();
                for (name, page) in &named {
                    pairs.push(Object::string_literal(name.as_str()));
                    pairs.push(xyz_destination(page_ids[*page]));
                }
                catalog.set(
                    "Names",
                    dictionary! { "Dests" => dictionary! { "Names" => pairs } },
                );
            }
        }

        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);
        doc
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let mut doc = self.build();
        doc.save(path)?;
        Ok(())
    }
}

fn xyz_destination(page_id: ObjectId) -> Object {
    Object::Array(vec![
        Object::Reference(page_id),
        "XYZ".into(),
        Object::Integer(0),
        Object::Integer(792),
        Object::Null,
    ])
}

fn add_bookmarks(
    doc: &mut Document,
    items: &[TestBookmark],
    parent: ObjectId,
    page_ids: &[ObjectId],
) -> Option<(ObjectId, ObjectId)> {
    let ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

    for (index, item) in items.iter().enumerate() {
        let mut dict = dictionary! {
            "Title" => lopdf::text_string(&item.title),
            "Parent" => parent,
        };
        if index > 0 {
            dict.set("Prev", ids[index - 1]);
        }
        if let Some(next) = ids.get(index + 1) {
            dict.set("Next", *next);
        }
        match &item.target {
            TestTarget::Page(page) => {
                dict.set("Dest", vec![Object::Reference(page_ids[*page]), "Fit".into()])
            }
            TestTarget::Index(page) => {
                dict.set("Dest", vec![Object::Integer(*page), "Fit".into()])
            }
            TestTarget::Named(name) => dict.set("Dest", Object::string_literal(name.as_str())),
            TestTarget::Nothing => {}
        }
        if let Some((first, last)) = add_bookmarks(doc, &item.children, ids[index], page_ids) {
            dict.set("First", first);
            dict.set("Last", last);
            dict.set("Count", item.children.len() as i64);
        }
        doc.objects.insert(ids[index], Object::Dictionary(dict));
    }

    Some((*ids.first()?, *ids.last()?))
}
