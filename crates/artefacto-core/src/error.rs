// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Artefacto.

use thiserror::Error;

/// A document could not be opened or parsed.
///
/// Fatal to the viewing session that requested it: the viewer reports the
/// failure and stays closed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("failed to read {file_ref}: {source}")]
    Io {
        file_ref: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {file_ref}: {reason}")]
    Malformed { file_ref: String, reason: String },

    #[error("document {0} has no pages")]
    NoPages(String),

    #[error("document backend failed: {0}")]
    Backend(String),
}

/// A single page failed to render.
///
/// The session survives: navigation to other pages keeps working.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: u32, page_count: u32 },

    #[error("page {page} unavailable: {reason}")]
    PageUnavailable { page: u32, reason: String },

    #[error("failed to rasterise page {page}: {reason}")]
    Raster { page: u32, reason: String },
}

impl RenderError {
    /// The page the failure refers to.
    pub fn page(&self) -> u32 {
        match self {
            Self::PageOutOfRange { page, .. }
            | Self::PageUnavailable { page, .. }
            | Self::Raster { page, .. } => *page,
        }
    }
}

/// Top-level error type for all Artefacto operations.
#[derive(Debug, Error)]
pub enum ArtefactoError {
    // -- Viewer errors --
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("the viewer has stopped")]
    ViewerStopped,

    // -- Catalog / configuration --
    #[error("invalid edition {title:?}: {reason}")]
    InvalidEdition { title: String, reason: String },

    #[error("invalid date {0:?}: expected YYYY-MM")]
    InvalidDate(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Raster output --
    #[error("image encoding failed: {0}")]
    Image(String),

    // -- Storage / serialisation --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ArtefactoError>;
