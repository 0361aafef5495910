// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edition catalog — the static, hard-coded list of published issues.
//
// Editions are not discovered on disk. New issues are added to `builtin()`
// when they are published.

use crate::error::Result;
use crate::types::{Edition, YearMonth};

/// Ordered collection of editions, in the order they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    editions: Vec<Edition>,
}

impl Catalog {
    /// Build a catalog, validating every edition.
    pub fn new(editions: Vec<Edition>) -> Result<Self> {
        for edition in &editions {
            edition.validate()?;
        }
        Ok(Self { editions })
    }

    /// The editions published so far.
    pub fn builtin() -> Self {
        let first = Edition {
            title: "Junio 2025 - Vol. 1, Nº 1".into(),
            file_ref: "magazines/2025-06-vol1-n1.pdf".into(),
            description: "Primera edición de Artefacto".into(),
            date: YearMonth::known(2025, 6),
            volume: 1,
            number: 1,
            cover_ref: Some("assets/portada1.jpg".into()),
        };
        Self {
            editions: vec![first],
        }
    }

    /// Parse a catalog from its JSON form (an array of editions).
    pub fn from_json(json: &str) -> Result<Self> {
        let editions: Vec<Edition> = serde_json::from_str(json)?;
        Self::new(editions)
    }

    /// JSON form handed to the listing page.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.editions)?)
    }

    /// Editions in declaration order.
    pub fn editions(&self) -> &[Edition] {
        &self.editions
    }

    pub fn len(&self) -> usize {
        self.editions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.editions.is_empty()
    }

    /// Editions newest first. Editions sharing a date keep their declaration
    /// order.
    pub fn sorted_for_display(&self) -> Vec<&Edition> {
        let mut sorted: Vec<&Edition> = self.editions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    /// The edition the site highlights as the current issue.
    pub fn latest(&self) -> Option<&Edition> {
        self.sorted_for_display().into_iter().next()
    }

    /// Look up an edition by the path of its PDF.
    pub fn find(&self, file_ref: &str) -> Option<&Edition> {
        self.editions.iter().find(|e| e.file_ref == file_ref)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
