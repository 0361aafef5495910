// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Artefacto edition catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ArtefactoError, Result};

/// Spanish month names, as the site prints them in edition metadata.
const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// A publication month, written `YYYY-MM`.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Build a year-month, rejecting months outside 1..=12.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| Self {
                year: date.year(),
                month: date.month(),
            })
            .ok_or_else(|| ArtefactoError::InvalidDate(format!("{year:04}-{month:02}")))
    }

    /// For literal dates in the built-in catalog.
    pub(crate) const fn known(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Long Spanish form used on edition cards, e.g. `junio de 2025`.
    pub fn long_es(&self) -> String {
        let name = MONTHS_ES[(self.month - 1) as usize];
        format!("{name} de {}", self.year)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ArtefactoError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        // Reject trailing days ("2025-06-01") and other shapes chrono would
        // happily accept once padded.
        if trimmed.len() != 7 || trimmed.as_bytes()[4] != b'-' {
            return Err(ArtefactoError::InvalidDate(s.to_string()));
        }
        let date = NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map_err(|_| ArtefactoError::InvalidDate(s.to_string()))?;
        Ok(Self {
            year: date.year(),
            month: date.month(),
        })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single published issue of the magazine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edition {
    /// Display title, e.g. "Junio 2025 - Vol. 1, Nº 1".
    pub title: String,
    /// Site-relative path of the edition's PDF.
    pub file_ref: String,
    pub description: String,
    pub date: YearMonth,
    pub volume: u32,
    pub number: u32,
    /// Site-relative path of the cover image, if the edition has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_ref: Option<String>,
}

impl Edition {
    /// Check the record-level invariants: non-empty title and file
    /// reference, volume and number both at least 1.
    pub fn validate(&self) -> Result<()> {
        let reason = if self.title.trim().is_empty() {
            Some("title is empty")
        } else if self.file_ref.trim().is_empty() {
            Some("file reference is empty")
        } else if self.volume == 0 {
            Some("volume must be positive")
        } else if self.number == 0 {
            Some("number must be positive")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ArtefactoError::InvalidEdition {
                title: self.title.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// "Vol. 1, Nº 1"
    pub fn volume_label(&self) -> String {
        format!("Vol. {}, Nº {}", self.volume, self.number)
    }

    /// Heading shown above the viewer while this edition is open.
    pub fn viewer_title(&self) -> String {
        format!("Artefacto - {}", self.title)
    }
}
