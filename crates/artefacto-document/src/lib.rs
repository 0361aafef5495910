// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// artefacto-document — lopdf-backed documents for the Artefacto viewer.
//
// Provides the PDF reader (page tree, media boxes, content streams), a small
// path painter that rasterises pages into RGBA images, and the shared raster
// surface the viewer draws on.

pub mod backend;
pub mod pdf;
pub mod render;

#[cfg(test)]
pub(crate) mod fixtures;

pub use backend::{LopdfBackend, LopdfDocument, LopdfPage};
pub use pdf::content::PaintOp;
pub use pdf::reader::{PageBox, PdfReader};
pub use render::painter::paint_page;
pub use render::surface::RasterSurface;
