// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Site and viewer configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArtefactoError, Result};

/// Zoom behaviour of the in-page viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Scale applied when a document is first opened (1.0 = 72 dpi).
    pub initial_scale: f32,
    /// Amount added or removed by one zoom-in / zoom-out step.
    pub zoom_step: f32,
    /// Floor below which the scale is never set.
    pub min_scale: f32,
    /// Optional ceiling. Unbounded when absent.
    pub max_scale: Option<f32>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_scale: 1.2,
            zoom_step: 0.2,
            min_scale: 0.4,
            max_scale: None,
        }
    }
}

impl ViewerConfig {
    /// Reject non-positive values and inverted bounds.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        if !positive(self.min_scale) {
            return Err(ArtefactoError::Config(format!(
                "min_scale must be positive, got {}",
                self.min_scale
            )));
        }
        if !positive(self.zoom_step) {
            return Err(ArtefactoError::Config(format!(
                "zoom_step must be positive, got {}",
                self.zoom_step
            )));
        }
        if !positive(self.initial_scale) {
            return Err(ArtefactoError::Config(format!(
                "initial_scale must be positive, got {}",
                self.initial_scale
            )));
        }
        if let Some(max) = self.max_scale
            && !(max.is_finite() && max >= self.min_scale)
        {
            return Err(ArtefactoError::Config(format!(
                "max_scale {max} is below min_scale {}",
                self.min_scale
            )));
        }
        Ok(())
    }

    /// Clamp `scale` into the configured bounds, at percent precision.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        let mut clamped = if scale.is_finite() {
            scale.max(self.min_scale)
        } else {
            self.min_scale
        };
        if let Some(max) = self.max_scale {
            clamped = clamped.min(max);
        }
        let rounded = (clamped * 100.0).round() / 100.0;
        // Rounding may dip under the floor when it is not a whole percent.
        rounded.max(self.min_scale)
    }
}

/// Where the site's documents live and how the viewer behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory that edition file references are resolved against.
    pub document_root: PathBuf,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            document_root: PathBuf::from("."),
            viewer: ViewerConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.viewer.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }
}
