// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// What the UI sees of the viewer: point-in-time snapshots and events.

use artefacto_core::Viewport;
use artefacto_core::error::RenderError;

/// Lifecycle of the viewer.
///
/// `Idle → Loading → Ready ⇄ Rendering`, back to `Idle` on close or on a
/// failed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    /// No document open.
    Idle,
    /// The backend is parsing a document.
    Loading,
    /// A document is open and nothing is being drawn.
    Ready,
    /// A page render is in flight.
    Rendering,
}

/// Everything the viewer chrome needs to redraw itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSnapshot {
    pub state: ViewerState,
    pub file_ref: Option<String>,
    pub title: Option<String>,
    /// Unset while no document is open.
    pub current_page: Option<u32>,
    pub page_count: Option<u32>,
    pub scale: f32,
    /// Reader-facing message for the most recent failure.
    pub last_error: Option<String>,
}

impl ViewerSnapshot {
    pub(crate) fn idle(scale: f32) -> Self {
        Self {
            state: ViewerState::Idle,
            file_ref: None,
            title: None,
            current_page: None,
            page_count: None,
            scale,
            last_error: None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, ViewerState::Idle)
    }

    /// "Página 2 de 12"
    pub fn page_label(&self) -> Option<String> {
        match (self.current_page, self.page_count) {
            (Some(page), Some(count)) => Some(format!("Página {page} de {count}")),
            _ => None,
        }
    }

    /// "120%"
    pub fn zoom_label(&self) -> String {
        format!("{}%", (self.scale * 100.0).round() as i64)
    }

    /// Whether the "previous page" button is enabled.
    pub fn can_go_previous(&self) -> bool {
        self.current_page.is_some_and(|page| page > 1)
    }

    /// Whether the "next page" button is enabled.
    pub fn can_go_next(&self) -> bool {
        match (self.current_page, self.page_count) {
            (Some(page), Some(count)) => page < count,
            _ => false,
        }
    }
}

/// Things that happened inside the viewer, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Opened {
        file_ref: String,
        page_count: u32,
    },
    LoadFailed {
        file_ref: String,
        reason: String,
    },
    PageRendered {
        page: u32,
        scale: f32,
        viewport: Viewport,
    },
    RenderFailed {
        page: u32,
        scale: f32,
        error: RenderError,
    },
    Closed {
        file_ref: String,
    },
}
