// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page-render coordination.
//
// Rendering is asynchronous and not reentrant per surface. Rapid paging or
// zooming would otherwise stack up overlapping renders, so requests that
// arrive while a render is running collapse into a single pending slot:
// last write wins, superseded pages are dropped without ever being drawn.

use tracing::debug;

/// In-flight / pending bookkeeping for one surface.
///
/// Pure state: the caller starts the render whose page number a method
/// returns, and reports back through [`RenderCoordinator::complete`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderCoordinator {
    /// Page currently being drawn.
    in_flight: Option<u32>,
    /// Latest page requested while `in_flight` was busy.
    pending: Option<u32>,
}

impl RenderCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `target` to be drawn.
    ///
    /// Returns `Some(target)` when the caller must start rendering it now.
    /// Returns `None` when a render is already running; `target` then
    /// replaces whatever was pending.
    pub fn request(&mut self, target: u32) -> Option<u32> {
        if self.in_flight.is_none() {
            self.in_flight = Some(target);
            return Some(target);
        }

        if let Some(superseded) = self.pending.replace(target) {
            debug!(superseded, target, "pending render superseded");
        } else {
            debug!(target, "render queued behind in-flight render");
        }
        None
    }

    /// Record that the in-flight render finished (successfully or not).
    ///
    /// Returns the pending page, if any, which the caller must start
    /// rendering immediately. It becomes the new in-flight page.
    pub fn complete(&mut self) -> Option<u32> {
        self.in_flight = None;
        let next = self.pending.take()?;
        self.in_flight = Some(next);
        Some(next)
    }

    pub fn is_rendering(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<u32> {
        self.in_flight
    }

    pub fn pending(&self) -> Option<u32> {
        self.pending
    }

    /// Forget all bookkeeping. Only valid once nothing is in flight.
    pub fn reset(&mut self) {
        self.in_flight = None;
        self.pending = None;
    }
}
