// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Keyboard shortcuts active while the viewer is open.

use crate::viewer::ViewerCommand;

/// Map a DOM-style key name to a viewer command.
pub fn command_for_key(key: &str) -> Option<ViewerCommand> {
    match key {
        "ArrowLeft" => Some(ViewerCommand::PreviousPage),
        "ArrowRight" => Some(ViewerCommand::NextPage),
        "Escape" => Some(ViewerCommand::Close),
        "+" => Some(ViewerCommand::ZoomIn),
        "-" => Some(ViewerCommand::ZoomOut),
        _ => None,
    }
}
