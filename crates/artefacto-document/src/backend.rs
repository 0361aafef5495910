// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// lopdf document backend.
//
// Documents are read with tokio's async file API, then parsed and translated
// in full on the blocking pool. What crosses back to the viewer task is plain
// page data: geometry plus paint operations. Painting also runs on the
// blocking pool and is committed to the surface once finished.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use artefacto_core::error::{LoadError, RenderError};
use artefacto_core::{
    DocumentBackend, DocumentHandle, PageHandle, SiteConfig, Viewport,
};
use tracing::{debug, info, instrument, warn};

use crate::pdf::content::PaintOp;
use crate::pdf::reader::{PageBox, PdfReader};
use crate::render::painter::paint_page;
use crate::render::surface::RasterSurface;

/// Opens PDFs stored under a site's document root.
#[derive(Debug, Clone)]
pub struct LopdfBackend {
    root: PathBuf,
}

impl LopdfBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(config.document_root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a catalog file reference to a path under the root. References
    /// that are absolute or step outside the root are not found.
    pub fn resolve(&self, file_ref: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(file_ref);
        let confined = !file_ref.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !confined {
            warn!(file_ref, "document reference outside the document root");
            return Err(LoadError::NotFound(file_ref.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl DocumentBackend<RasterSurface> for LopdfBackend {
    type Document = LopdfDocument;

    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn open(&self, file_ref: &str) -> Result<LopdfDocument, LoadError> {
        let path = self.resolve(file_ref)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => LoadError::NotFound(file_ref.to_string()),
                _ => LoadError::Io {
                    file_ref: file_ref.to_string(),
                    source,
                },
            })?;
        debug!(bytes = data.len(), "document read");

        let name = file_ref.to_string();
        let pages = tokio::task::spawn_blocking(move || parse_pages(&name, &data))
            .await
            .map_err(|err| LoadError::Backend(format!("parser task failed: {err}")))??;

        info!(pages = pages.len(), "document opened");
        Ok(LopdfDocument {
            file_ref: file_ref.to_string(),
            pages: pages.into(),
        })
    }
}

#[derive(Debug)]
struct LoadedPage {
    page_box: PageBox,
    /// A page whose content cannot be decoded stays unavailable; the rest
    /// of the document is still viewable.
    content: Result<Arc<[PaintOp]>, RenderError>,
}

fn parse_pages(file_ref: &str, data: &[u8]) -> Result<Vec<LoadedPage>, LoadError> {
    let reader = PdfReader::from_bytes(file_ref, data)?;
    (1..=reader.page_count())
        .map(|number| {
            let page_box = reader.page_box(number).map_err(|err| LoadError::Malformed {
                file_ref: file_ref.to_string(),
                reason: err.to_string(),
            })?;
            let content = reader.page_operations(number).map(Arc::from);
            if let Err(err) = &content {
                warn!(page = number, %err, "page content unavailable");
            }
            Ok(LoadedPage { page_box, content })
        })
        .collect()
}

/// A parsed PDF. Pages share their operation lists with this handle.
#[derive(Debug)]
pub struct LopdfDocument {
    file_ref: String,
    pages: Arc<[LoadedPage]>,
}

impl LopdfDocument {
    pub fn file_ref(&self) -> &str {
        &self.file_ref
    }
}

impl Drop for LopdfDocument {
    fn drop(&mut self) {
        debug!(file_ref = %self.file_ref, "document released");
    }
}

impl DocumentHandle<RasterSurface> for LopdfDocument {
    type Page = LopdfPage;

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    async fn get_page(&self, number: u32) -> Result<LopdfPage, RenderError> {
        let loaded = number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .ok_or(RenderError::PageOutOfRange {
                page: number,
                page_count: self.page_count(),
            })?;
        let ops = loaded.content.clone()?;
        Ok(LopdfPage {
            number,
            page_box: loaded.page_box,
            ops,
        })
    }
}

/// One page ready to paint.
#[derive(Debug, Clone)]
pub struct LopdfPage {
    number: u32,
    page_box: PageBox,
    ops: Arc<[PaintOp]>,
}

impl PageHandle<RasterSurface> for LopdfPage {
    fn viewport(&self, scale: f32) -> Viewport {
        Viewport::from_points(self.page_box.width, self.page_box.height, scale)
    }

    #[instrument(skip(self, surface), fields(page = self.number))]
    async fn render_to(&self, surface: &mut RasterSurface, scale: f32) -> Result<(), RenderError> {
        self.viewport(scale).check_drawable(self.number)?;

        let ops = Arc::clone(&self.ops);
        let page_box = self.page_box;
        let image = tokio::task::spawn_blocking(move || paint_page(&ops, page_box, scale))
            .await
            .map_err(|err| RenderError::Raster {
                page: self.number,
                reason: format!("paint task failed: {err}"),
            })?
            .ok_or_else(|| RenderError::Raster {
                page: self.number,
                reason: "page too large to rasterise".into(),
            })?;

        debug!(width = image.width(), height = image.height(), "page painted");
        surface.commit(image);
        Ok(())
    }
}
