// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The live state of the viewer while a document is open.

use std::sync::Arc;

use artefacto_core::ViewerConfig;
use artefacto_core::error::LoadError;

use crate::coordinator::RenderCoordinator;

/// One opened document plus the reader's position in it.
///
/// Invariant: `1 <= current_page <= page_count`.
#[derive(Debug)]
pub struct ViewerSession<D> {
    document: Arc<D>,
    file_ref: String,
    title: Option<String>,
    current_page: u32,
    page_count: u32,
    scale: f32,
    render: RenderCoordinator,
}

impl<D> ViewerSession<D> {
    /// Start a session on page 1 at the configured initial scale.
    pub fn new(
        document: D,
        page_count: u32,
        file_ref: impl Into<String>,
        title: Option<String>,
        config: &ViewerConfig,
    ) -> Result<Self, LoadError> {
        let file_ref = file_ref.into();
        if page_count == 0 {
            return Err(LoadError::NoPages(file_ref));
        }
        Ok(Self {
            document: Arc::new(document),
            file_ref,
            title,
            current_page: 1,
            page_count,
            scale: config.clamp_scale(config.initial_scale),
            render: RenderCoordinator::new(),
        })
    }

    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    pub fn file_ref(&self) -> &str {
        &self.file_ref
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn render(&self) -> &RenderCoordinator {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut RenderCoordinator {
        &mut self.render
    }

    // -- Navigation -----------------------------------------------------------

    /// Advance one page. `None` at the last page.
    pub fn next_page(&mut self) -> Option<u32> {
        if self.current_page >= self.page_count {
            return None;
        }
        self.current_page += 1;
        Some(self.current_page)
    }

    /// Go back one page. `None` at page 1.
    pub fn previous_page(&mut self) -> Option<u32> {
        if self.current_page <= 1 {
            return None;
        }
        self.current_page -= 1;
        Some(self.current_page)
    }

    /// Jump to `page`, clamped into the document. `None` if that is where
    /// the reader already is.
    pub fn go_to_page(&mut self, page: u32) -> Option<u32> {
        let target = page.clamp(1, self.page_count);
        if target == self.current_page {
            return None;
        }
        self.current_page = target;
        Some(target)
    }

    // -- Zoom -----------------------------------------------------------------

    /// Set the scale, clamped to the configured bounds. Returns the stored
    /// value.
    pub fn set_scale(&mut self, scale: f32, config: &ViewerConfig) -> f32 {
        self.scale = config.clamp_scale(scale);
        self.scale
    }

    /// Zoom in one step. `None` if a ceiling stopped it.
    pub fn zoom_in(&mut self, config: &ViewerConfig) -> Option<f32> {
        self.step_scale(config.zoom_step, config)
    }

    /// Zoom out one step. `None` at the floor.
    pub fn zoom_out(&mut self, config: &ViewerConfig) -> Option<f32> {
        self.step_scale(-config.zoom_step, config)
    }

    fn step_scale(&mut self, delta: f32, config: &ViewerConfig) -> Option<f32> {
        let target = config.clamp_scale(self.scale + delta);
        if target == self.scale {
            return None;
        }
        self.scale = target;
        Some(target)
    }

    // -- Rendering ------------------------------------------------------------

    /// Route a render request through the coordinator. Returns the page to
    /// start drawing now, if any.
    pub fn request_page(&mut self, target: u32) -> Option<u32> {
        self.render.request(target)
    }

    /// Re-request the current page, e.g. after a scale change.
    pub fn request_current(&mut self) -> Option<u32> {
        self.render.request(self.current_page)
    }
}
