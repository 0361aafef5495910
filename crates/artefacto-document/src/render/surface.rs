// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared raster surface.
//
// The viewer owns one `RasterSurface` and draws on it; the UI keeps a clone
// and reads the canvas whenever a `PageRendered` event arrives.

use std::fmt;
use std::io::Cursor;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use artefacto_core::Surface;
use artefacto_core::error::ArtefactoError;
use image::{ImageFormat, Rgba, RgbaImage};

use crate::render::painter::PAPER;

/// Cloneable handle to one RGBA canvas.
#[derive(Clone)]
pub struct RasterSurface {
    canvas: Arc<Mutex<RgbaImage>>,
}

impl RasterSurface {
    /// An empty 0×0 surface.
    pub fn new() -> Self {
        Self {
            canvas: Arc::new(Mutex::new(RgbaImage::new(0, 0))),
        }
    }

    /// Copy of the current canvas.
    pub fn snapshot(&self) -> RgbaImage {
        self.lock().clone()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.lock().get_pixel_checked(x, y).copied()
    }

    /// Encode the current canvas as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ArtefactoError> {
        let image = self.snapshot();
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| ArtefactoError::Image(format!("PNG encoding failed: {err}")))?;
        Ok(buffer)
    }

    /// Replace the canvas with a finished page in one step.
    pub(crate) fn commit(&mut self, image: RgbaImage) {
        *self.lock() = image;
    }

    // Writers replace the whole image, so a poisoned canvas is still whole.
    fn lock(&self) -> MutexGuard<'_, RgbaImage> {
        self.canvas.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.size();
        f.debug_struct("RasterSurface")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        self.lock().dimensions()
    }

    fn resize(&mut self, width: u32, height: u32) {
        *self.lock() = RgbaImage::from_pixel(width, height, PAPER);
    }
}
