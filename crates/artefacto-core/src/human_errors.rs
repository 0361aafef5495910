// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reader-facing error messages.
//
// The site is in Spanish, so every technical error is mapped to a short
// Spanish message plus a suggestion the viewer can show in its alert.

use crate::error::{ArtefactoError, LoadError, RenderError};

/// How the UI should present an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The viewer closed; the reader has to start over.
    SessionClosed,
    /// One page is affected; the rest of the document still works.
    PageOnly,
    /// The site itself is misconfigured.
    SiteProblem,
}

/// A reader-facing error: message heading plus actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

const LOAD_MESSAGE: &str = "Error al cargar el PDF. Por favor, intenta nuevamente.";

/// Convert an `ArtefactoError` into something a reader can act on.
pub fn humanize_error(err: &ArtefactoError) -> HumanError {
    match err {
        ArtefactoError::Load(load) => humanize_load_error(load),
        ArtefactoError::Render(render) => humanize_render_error(render),

        ArtefactoError::ViewerStopped => HumanError {
            message: "El visor de la revista se ha cerrado.".into(),
            suggestion: "Recarga la página para volver a abrirlo.".into(),
            severity: Severity::SessionClosed,
        },

        ArtefactoError::InvalidEdition { .. }
        | ArtefactoError::InvalidDate(_)
        | ArtefactoError::Config(_)
        | ArtefactoError::Image(_)
        | ArtefactoError::Io(_)
        | ArtefactoError::Serialization(_) => HumanError {
            message: "La lista de ediciones no está disponible.".into(),
            suggestion: "Escríbenos a dm.artefacto@gmail.com para avisarnos del problema.".into(),
            severity: Severity::SiteProblem,
        },
    }
}

/// Load failures all close the session; the suggestion varies by cause.
pub fn humanize_load_error(err: &LoadError) -> HumanError {
    let suggestion = match err {
        LoadError::NotFound(_) => {
            "Esta edición todavía no está disponible. Prueba a descargarla más tarde."
        }
        LoadError::Malformed { .. } | LoadError::NoPages(_) => {
            "El archivo parece estar dañado. Prueba a descargarlo y abrirlo en tu equipo."
        }
        LoadError::Io { .. } | LoadError::Backend(_) => {
            "Comprueba tu conexión y vuelve a abrir la revista."
        }
    };

    HumanError {
        message: LOAD_MESSAGE.into(),
        suggestion: suggestion.into(),
        severity: Severity::SessionClosed,
    }
}

pub fn humanize_render_error(err: &RenderError) -> HumanError {
    HumanError {
        message: format!("No se pudo mostrar la página {}.", err.page()),
        suggestion: "Puedes seguir navegando por las demás páginas.".into(),
        severity: Severity::PageOnly,
    }
}
