//! Error types for the ficha2contrato library.
//!
//! Only *terminal* failures live here. The extraction pipeline degrades
//! field-by-field (an unmatched or invalid field becomes an absent value)
//! and the locale formatters degrade to passthrough or sentinel strings;
//! neither is an error and neither can abort a request. What does abort:
//!
//! * Reference data that does not exist — a contract cannot be rendered
//!   without its company and legal representative.
//! * A template that cannot be found or opened.
//! * A broken document archive or an internal substitution failure —
//!   partial output is never written to disk.
//!
//! Callers therefore get a clean split: `Ok` always means a complete
//! document landed at the returned path, `Err` always means nothing was
//! written.

use std::path::PathBuf;
use thiserror::Error;

/// All terminal errors returned by the ficha2contrato library.
///
/// Extraction and formatting degradation are absorbed upstream and surface
/// only as empty or sentinel placeholder text in the rendered document.
#[derive(Debug, Error)]
pub enum ContractError {
    // ── Reference data ────────────────────────────────────────────────────
    /// The referenced company id has no record in the store.
    #[error("Company {id} not found in the record store.\nCheck the id or the store fixture.")]
    CompanyNotFound { id: u32 },

    /// The referenced legal-representative id has no record in the store.
    #[error("Legal representative {id} not found in the record store.\nCheck the id or the store fixture.")]
    RepresentativeNotFound { id: u32 },

    /// The record store itself failed (unreadable fixture, backend error).
    #[error("Record store error: {detail}")]
    Store { detail: String },

    // ── Template errors ───────────────────────────────────────────────────
    /// Template file was not found at the resolved path.
    #[error("Template not found: '{path}'\nCheck the template name and the configured template directory.")]
    TemplateNotFound { path: PathBuf },

    /// Template file exists but could not be read.
    #[error("Failed to read template '{path}': {detail}")]
    TemplateRead { path: PathBuf, detail: String },

    /// The file is not a usable DOCX archive (bad zip, missing document part).
    #[error("Not a valid DOCX template: {detail}")]
    InvalidTemplate { detail: String },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// The substitution engine hit a malformed document part.
    ///
    /// Treated as terminal: a half-substituted contract must never reach
    /// the caller, so nothing is written when this is returned.
    #[error("Placeholder substitution failed in part '{part}': {detail}")]
    Substitution { part: String, detail: String },

    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The text-recognition collaborator failed on the supplied image.
    #[error("Text recognition failed: {detail}")]
    Recognition { detail: String },

    /// The document-storage collaborator rejected an upload or download.
    #[error("Document storage error: {detail}")]
    Storage { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_not_found_display() {
        let e = ContractError::CompanyNotFound { id: 7 };
        let msg = e.to_string();
        assert!(msg.contains("Company 7"), "got: {msg}");
    }

    #[test]
    fn template_not_found_display() {
        let e = ContractError::TemplateNotFound {
            path: PathBuf::from("plantillas/contrato.docx"),
        };
        assert!(e.to_string().contains("plantillas/contrato.docx"));
    }

    #[test]
    fn substitution_display_names_part() {
        let e = ContractError::Substitution {
            part: "word/header1.xml".into(),
            detail: "invalid UTF-8".into(),
        };
        assert!(e.to_string().contains("word/header1.xml"));
        assert!(e.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn output_write_carries_source() {
        use std::error::Error as _;
        let e = ContractError::OutputWrite {
            path: PathBuf::from("out.docx"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
    }
}
