// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page tree inspection and content-stream translation.

pub mod content;
pub mod reader;

pub use content::PaintOp;
pub use reader::{PageBox, PdfReader};
