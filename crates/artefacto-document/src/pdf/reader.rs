// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open existing PDF documents with `lopdf` and inspect their
// pages: count, geometry and decoded content streams.

use std::collections::BTreeMap;

use artefacto_core::error::{LoadError, RenderError};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, instrument, warn};

use crate::pdf::content::{self, PaintOp};

/// Page tree nodes deeper than this are treated as a broken tree.
const MAX_TREE_DEPTH: usize = 32;

/// Visible area of a page in PDF user space (points).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    pub x0: f32,
    pub y0: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// US Letter, the PDF default when no `/MediaBox` is found.
    pub const LETTER: PageBox = PageBox {
        x0: 0.0,
        y0: 0.0,
        width: 612.0,
        height: 792.0,
    };

    /// Normalise a `[llx lly urx ury]` rectangle. Empty boxes are rejected.
    pub fn from_corners(corners: [f32; 4]) -> Option<Self> {
        let [ax, ay, bx, by] = corners;
        let width = (bx - ax).abs();
        let height = (by - ay).abs();
        if !(width > 0.0 && height > 0.0) {
            return None;
        }
        Some(Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            width,
            height,
        })
    }
}

/// Reads an existing PDF file for display.
///
/// Wraps `lopdf::Document` together with its resolved page map. A reader is
/// only ever built for a document with at least one page.
pub struct PdfReader {
    document: Document,
    /// 1-based page number to page object.
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Parse raw PDF bytes already in memory. `file_ref` only labels errors.
    #[instrument(skip(data), fields(bytes_len = data.len()))]
    pub fn from_bytes(file_ref: &str, data: &[u8]) -> Result<Self, LoadError> {
        let document = Document::load_mem(data).map_err(|err| LoadError::Malformed {
            file_ref: file_ref.to_string(),
            reason: err.to_string(),
        })?;

        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(LoadError::NoPages(file_ref.to_string()));
        }

        debug!(pages = pages.len(), "pdf loaded");

        Ok(Self {
            document,
            pages,
        })
    }

    // -- Inspection -----------------------------------------------------------

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Geometry of page `number` (1-based).
    ///
    /// Uses the nearest `/MediaBox` up the page tree, or [`PageBox::LETTER`]
    /// when there is none or it is unusable.
    pub fn page_box(&self, number: u32) -> Result<PageBox, RenderError> {
        let page_id = self.page_id(number)?;
        match self.inherited(page_id, b"MediaBox") {
            Some(object) => Ok(self.parse_box(object).unwrap_or_else(|| {
                warn!(page = number, "unusable /MediaBox, assuming US Letter");
                PageBox::LETTER
            })),
            None => Ok(PageBox::LETTER),
        }
    }

    /// Decode page `number`'s content streams into paint operations.
    #[instrument(skip(self))]
    pub fn page_operations(&self, number: u32) -> Result<Vec<PaintOp>, RenderError> {
        let page_id = self.page_id(number)?;
        let content = self
            .document
            .get_and_decode_page_content(page_id)
            .map_err(|err| RenderError::PageUnavailable {
                page: number,
                reason: format!("cannot decode content stream: {err}"),
            })?;

        let ops = content::translate(&content.operations);
        debug!(
            operators = content.operations.len(),
            paint_ops = ops.len(),
            "page content decoded"
        );
        Ok(ops)
    }

    // -- Helpers --------------------------------------------------------------

    fn page_id(&self, number: u32) -> Result<ObjectId, RenderError> {
        self.pages
            .get(&number)
            .copied()
            .ok_or(RenderError::PageOutOfRange {
                page: number,
                page_count: self.page_count(),
            })
    }

    /// Look `key` up on the page, then on each `/Parent` in turn.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node: &Dictionary = self.document.get_dictionary(page_id).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(value);
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.document.get_dictionary(parent).ok()?;
        }
        warn!(?page_id, "page tree too deep, giving up on inherited attribute");
        None
    }

    fn parse_box(&self, object: &Object) -> Option<PageBox> {
        let items = self.resolve(object).as_array().ok()?;
        if items.len() != 4 {
            return None;
        }
        let mut corners = [0.0_f32; 4];
        for (slot, item) in corners.iter_mut().zip(items) {
            *slot = self.resolve(item).as_float().ok()?;
        }
        PageBox::from_corners(corners)
    }

    fn resolve<'a>(&'a self, object: &'a Object) -> &'a Object {
        match object {
            Object::Reference(id) => self.document.get_object(*id).unwrap_or(object),
            other => other,
        }
    }
}
