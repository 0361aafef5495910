// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artefacto — Core types, edition catalog, errors, and the document backend
// traits shared by the viewer and the PDF backend.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use backend::{DocumentBackend, DocumentHandle, PageHandle, Surface, Viewport};
pub use catalog::Catalog;
pub use config::{SiteConfig, ViewerConfig};
pub use error::{ArtefactoError, LoadError, RenderError};
pub use types::*;
