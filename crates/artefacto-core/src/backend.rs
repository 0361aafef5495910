// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document backend trait definitions.
//
// The viewer only talks to documents through these traits. The lopdf backend
// in `artefacto-document` is the production implementation; tests substitute
// scripted backends.

use std::future::Future;

use crate::error::{LoadError, RenderError};

/// A 2-D drawable with mutable dimensions.
pub trait Surface: Send + 'static {
    /// Current (width, height) in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the drawable, discarding its contents.
    fn resize(&mut self, width: u32, height: u32);
}

/// Pixel dimensions of a page at a given scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Longest side a surface may be resized to.
    pub const MAX_SIDE: u32 = 16_384;

    /// Largest pixel count a surface may hold (256 MiB of RGBA).
    pub const MAX_PIXELS: u64 = 8_192 * 8_192;

    /// Scale a page size given in PDF points. Each side is at least 1 px.
    ///
    /// Sides too large for `u32` saturate; [`Viewport::check_drawable`]
    /// rejects them.
    pub fn from_points(width_pt: f32, height_pt: f32, scale: f32) -> Self {
        let px = |pt: f32| {
            let side = (f64::from(pt) * f64::from(scale)).round();
            if side.is_nan() {
                1
            } else {
                side.clamp(1.0, f64::from(u32::MAX)) as u32
            }
        };
        Self {
            width: px(width_pt),
            height: px(height_pt),
        }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether a raster of this size fits within the limits.
    pub fn is_drawable(&self) -> bool {
        self.width <= Self::MAX_SIDE
            && self.height <= Self::MAX_SIDE
            && self.pixel_count() <= Self::MAX_PIXELS
    }

    /// Refuse viewports too large to allocate a raster for. The scale
    /// itself is never capped; only what it would take to draw `page`.
    pub fn check_drawable(&self, page: u32) -> Result<(), RenderError> {
        if !self.is_drawable() {
            return Err(RenderError::Raster {
                page,
                reason: format!(
                    "viewport {}x{} exceeds the raster limit of {} px per side and {} px in total",
                    self.width,
                    self.height,
                    Self::MAX_SIDE,
                    Self::MAX_PIXELS
                ),
            });
        }
        Ok(())
    }
}

/// Opens documents by reference.
pub trait DocumentBackend<S: Surface>: Send + Sync + 'static {
    type Document: DocumentHandle<S>;

    /// Parse the document behind `file_ref`.
    fn open(&self, file_ref: &str)
    -> impl Future<Output = Result<Self::Document, LoadError>> + Send;
}

/// An opened document. Dropping it releases the backend resource.
pub trait DocumentHandle<S: Surface>: Send + Sync + 'static {
    type Page: PageHandle<S>;

    fn page_count(&self) -> u32;

    /// Fetch page `number` (1-based).
    fn get_page(&self, number: u32) -> impl Future<Output = Result<Self::Page, RenderError>> + Send;
}

/// A single page, ready to draw.
pub trait PageHandle<S: Surface>: Send + Sync + 'static {
    /// Pixel size of the page at `scale`.
    fn viewport(&self, scale: f32) -> Viewport;

    /// Draw the page onto `surface`. The caller sizes the surface to
    /// [`PageHandle::viewport`] first.
    fn render_to(
        &self,
        surface: &mut S,
        scale: f32,
    ) -> impl Future<Output = Result<(), RenderError>> + Send;
}
