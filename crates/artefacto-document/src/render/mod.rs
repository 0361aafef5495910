// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterisation of translated pages onto RGBA canvases.

pub mod painter;
pub mod surface;

pub use painter::paint_page;
pub use surface::RasterSurface;
