// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// artefacto-viewer — The in-page document viewer.
//
// A single viewer task owns the one live `ViewerSession` and the drawable
// surface. The `RenderCoordinator` makes sure at most one render is in flight
// and at most one is queued, and that the queued one is always the latest
// request.

pub mod coordinator;
pub mod keys;
pub mod session;
pub mod snapshot;
pub mod viewer;

pub use coordinator::RenderCoordinator;
pub use keys::command_for_key;
pub use session::ViewerSession;
pub use snapshot::{ViewerEvent, ViewerSnapshot, ViewerState};
pub use viewer::{Viewer, ViewerCommand, ViewerEvents, ViewerHandle};
