// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Small PDFs built in memory for tests.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

pub(crate) struct FixturePage {
    media_box: Option<[i64; 4]>,
    operations: Vec<Operation>,
}

impl FixturePage {
    pub(crate) fn sized(width: i64, height: i64, operations: Vec<Operation>) -> Self {
        Self {
            media_box: Some([0, 0, width, height]),
            operations,
        }
    }

    /// A page without its own `/MediaBox`.
    pub(crate) fn inheriting(operations: Vec<Operation>) -> Self {
        Self {
            media_box: None,
            operations,
        }
    }
}

/// `r g b rg x y w h re f`
pub(crate) fn fill_rect(colour: [f32; 3], rect: [i64; 4]) -> Vec<Operation> {
    vec![
        Operation::new("rg", colour.iter().map(|c| Object::Real(*c)).collect()),
        Operation::new("re", rect.iter().map(|v| Object::Integer(*v)).collect()),
        Operation::new("f", vec![]),
    ]
}

fn rectangle(corners: [i64; 4]) -> Object {
    Object::Array(corners.iter().map(|v| Object::Integer(*v)).collect())
}

/// Serialise a document with `pages`, optionally giving the page tree root a
/// `/MediaBox` for pages to inherit.
pub(crate) fn build_pdf(pages: Vec<FixturePage>, tree_media_box: Option<[i64; 4]>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page.operations,
        };
        let encoded = content.encode().expect("fixture content encodes");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        };
        if let Some(corners) = page.media_box {
            page_dict.set("MediaBox", rectangle(corners));
        }
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let count = kids.len() as i64;
    let mut tree = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => count,
    };
    if let Some(corners) = tree_media_box {
        tree.set("MediaBox", rectangle(corners));
    }
    doc.objects.insert(pages_id, Object::Dictionary(tree));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF serialises");
    bytes
}
